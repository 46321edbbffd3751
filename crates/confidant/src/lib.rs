//! Confidant Domain Library
//!
//! Core domain types and interfaces for the Confidant persona chat system.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain/`): Pure business entities and logic
//!   - `entities/`: Core domain models (Persona, Message)
//!   - `value_objects/`: Immutable value types (MessageRole)
//!   - `services/`: Pure domain functions (prompt building)
//!   - `errors/`: Domain-specific error types
//!
//! - **Ports** (`ports/`): Abstract interfaces (traits)
//!   - `repositories/`: Persona and transcript persistence
//!   - `services/`: Inference endpoint access
//!
//! # Usage
//!
//! ```rust,ignore
//! use confidant::domain::{Persona, Message};
//! use confidant::ports::{PersonaRepository, InferenceClient};
//! ```

pub mod domain;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    build_prompt, build_prompt_with_window, persona_system_prompt, DomainError, Message,
    MessageRole, NewPersona, Persona, PersonaId, CONTEXT_WINDOW, DEFAULT_PERSONALITY,
};
pub use ports::{
    fallback_models, ChatMessage, InferenceClient, PersonaRepository, TranscriptMap,
    TranscriptRepository, FALLBACK_MODELS,
};
