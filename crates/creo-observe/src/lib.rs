//! Observability setup for Creo.

pub mod tracing_setup;
