//! JSON file implementation of PersonaRepository

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use confidant::{DomainError, Persona, PersonaRepository};

use super::{decode_entry, read_json, write_json_atomic, PERSONAS_FILE};

/// Persona collection stored as a JSON array
#[derive(Debug, Clone)]
pub struct JsonPersonaRepository {
    path: PathBuf,
}

impl JsonPersonaRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Repository at `<dir>/personas.json`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(PERSONAS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl PersonaRepository for JsonPersonaRepository {
    async fn load_all(&self) -> Result<Vec<Persona>, DomainError> {
        let stored: Vec<serde_json::Value> = read_json(&self.path).await?.unwrap_or_default();

        let mut seen = HashSet::with_capacity(stored.len());
        let mut personas = Vec::with_capacity(stored.len());
        for value in stored {
            let Some(persona) = decode_entry::<Persona>(value, "persona") else {
                continue;
            };
            if let Err(e) = persona.validate() {
                tracing::warn!("Skipping stored persona: {}", e);
                continue;
            }
            if !seen.insert(persona.id) {
                tracing::warn!("Skipping duplicate stored persona id {}", persona.id);
                continue;
            }
            personas.push(persona);
        }

        tracing::debug!(
            "Loaded {} personas from {}",
            personas.len(),
            self.path.display()
        );
        Ok(personas)
    }

    async fn save_all(&self, personas: &[Persona]) -> Result<(), DomainError> {
        write_json_atomic(&self.path, personas).await
    }
}
