//! Shared domain types for Creo.
//!
//! This crate contains the core domain types used across the Creo toolkit:
//! chat messages and session records, goals and proposals, and their
//! associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod error;
pub mod goal;
