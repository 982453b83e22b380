//! Session, streaming, and goal-ledger logic for Creo.
//!
//! This crate defines the "ports" (the persistence backend and the remote
//! streaming exchange) that the infrastructure layer implements, plus the
//! subsystems built on top of them: the streaming transcript controller,
//! the durable session store, the goal coach with proposal extraction, and
//! the goal ledger. It depends only on `creo-types` -- never on
//! `creo-infra` or any HTTP/filesystem crate.

pub mod chat;
pub mod coach;
pub mod goal;
pub mod prompts;
pub mod storage;
