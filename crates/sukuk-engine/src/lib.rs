//! sukuk_engine - Formula-grid generator for the sukuk leverage model.

pub mod engine;
pub mod error;
pub mod model;

pub use error::{BuildError, Result};
