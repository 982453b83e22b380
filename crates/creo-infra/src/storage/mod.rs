//! Storage backend implementations.

pub mod json_file;

pub use json_file::{JsonFileStorage, default_data_dir};
