//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - Persona: Named character configuration a conversation is held with
//! - Message: One turn of a persona's transcript

mod message;
mod persona;

pub use message::*;
pub use persona::*;
