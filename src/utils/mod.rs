//! Utility modules

pub mod memory_archive;
pub mod validation;

pub use memory_archive::*;
pub use validation::*;
