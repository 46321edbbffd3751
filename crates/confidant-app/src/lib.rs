//! Confidant Application Library
//!
//! Wires the domain crate to concrete storage and inference adapters.
//!
//! - `adapters/`: JSON file and in-memory repositories, Ollama client
//! - `application/`: PersonaRegistry, TranscriptLog, SessionController
//! - `config`: settings file and environment overrides
//! - `state`: composition root ([`AppState`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use confidant::NewPersona;
//! use confidant_app::{init_tracing, AppState, Config};
//!
//! init_tracing();
//! let app = AppState::bootstrap(Config::load()?).await?;
//! let ava = app.personas.create(NewPersona::new("Ava", "llama3.2")).await?;
//! app.session.select(ava.id).await?;
//! let reply = app.session.send("hi").await?;
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod state;
pub mod telemetry;

pub use application::{
    PersonaRegistry, SessionController, SessionState, TranscriptLog, FALLBACK_REPLY,
};
pub use config::Config;
pub use state::AppState;
pub use telemetry::init_tracing;
