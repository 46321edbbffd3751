//! Persona - Character Identity
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Personality used when the user leaves the field blank
pub const DEFAULT_PERSONALITY: &str = "A friendly and helpful AI companion";

/// Persona identifier
pub type PersonaId = Uuid;

/// Persona - a named character with a target model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: PersonaId,
    pub name: String,
    pub personality: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a Persona
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPersona {
    pub name: String,
    pub personality: Option<String>,
    pub model: String,
}

impl NewPersona {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            personality: None,
            model: model.into(),
        }
    }

    /// Set the personality description
    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }
}

impl Persona {
    /// Create a new Persona with generated ID and timestamp.
    ///
    /// Name and personality are trimmed; a blank personality falls back to
    /// [`DEFAULT_PERSONALITY`]. Fails if the name or model is empty.
    pub fn new(input: NewPersona) -> Result<Self, DomainError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        let model = input.model.trim();
        if model.is_empty() {
            return Err(DomainError::validation("model is required"));
        }

        let personality = input
            .personality
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PERSONALITY);

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            personality: personality.to_string(),
            model: model.to_string(),
            created_at: Utc::now(),
        })
    }

    /// Check the invariants a persisted Persona must hold
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "persona {} has an empty name",
                self.id
            )));
        }
        if self.model.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "persona {} has an empty model",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_applies_default_personality() {
        let persona = Persona::new(NewPersona::new("Ava", "llama3.2")).unwrap();
        assert_eq!(persona.name, "Ava");
        assert_eq!(persona.model, "llama3.2");
        assert_eq!(persona.personality, DEFAULT_PERSONALITY);
    }

    #[test]
    fn test_new_trims_fields() {
        let input = NewPersona::new("  Ava ", "llama3.2").with_personality("   ");
        let persona = Persona::new(input).unwrap();
        assert_eq!(persona.name, "Ava");
        assert_eq!(persona.personality, DEFAULT_PERSONALITY);

        let input = NewPersona::new("Bo", "phi3").with_personality("  Grumpy pirate\n");
        let persona = Persona::new(input).unwrap();
        assert_eq!(persona.personality, "Grumpy pirate");
    }

    #[test]
    fn test_new_rejects_missing_fields() {
        assert!(matches!(
            Persona::new(NewPersona::new("", "llama3.2")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Persona::new(NewPersona::new("   ", "llama3.2")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            Persona::new(NewPersona::new("Ava", "")),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Persona::new(NewPersona::new("A", "m")).unwrap();
        let b = Persona::new(NewPersona::new("A", "m")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serializes_camel_case() {
        let persona = Persona::new(NewPersona::new("Ava", "llama3.2")).unwrap();
        let json = serde_json::to_value(&persona).unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["personality"], DEFAULT_PERSONALITY);
    }

    #[test]
    fn test_validate_flags_empty_model() {
        let mut persona = Persona::new(NewPersona::new("Ava", "llama3.2")).unwrap();
        assert!(persona.validate().is_ok());
        persona.model = String::new();
        assert!(persona.validate().is_err());
    }
}
