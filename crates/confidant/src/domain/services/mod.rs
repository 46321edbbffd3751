//! Domain Services
//!
//! Pure functions over domain entities.

mod prompt;

pub use prompt::*;
