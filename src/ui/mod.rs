//! Terminal output helpers

pub mod logger;

pub use logger::*;
