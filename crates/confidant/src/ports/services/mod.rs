//! Service Ports
//!
//! Abstract interfaces for external services.

mod inference;

pub use inference::*;
