//! Chat subsystem: the streaming transcript controller, the durable
//! session store, and the service that coordinates the two.

pub mod exchange;
pub mod service;
pub mod store;
pub mod title;
pub mod transcript;
