//! Engine configuration.
//!
//! Defaults reproduce the reference behavior: 7-character identifiers, no
//! collision check, and stale markers of abandoned groups left in place.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::error::{CorefError, CorefResult, ValidationError};

/// Configuration for [`crate::CorefEngine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorefConfig {
    /// Connector atom of coreference link edges.
    pub coref_connector: String,
    /// Connector atom of canonical marker edges.
    pub main_coref_connector: String,
    /// Attribute key holding the group identifier.
    pub coref_id_key: String,
    /// Length of generated group identifiers.
    pub id_length: usize,
    /// Reject generated identifiers that already own a canonical marker.
    pub check_id_collisions: bool,
    /// Generation attempts before giving up when collisions are checked.
    pub max_id_attempts: u32,
    /// Remove the marker of a group id once a merge abandons it.
    pub prune_orphan_markers: bool,
}

impl Default for CorefConfig {
    fn default() -> Self {
        Self {
            coref_connector: "coref/J/.".to_string(),
            main_coref_connector: "main-coref/J/.".to_string(),
            coref_id_key: "coref_id".to_string(),
            id_length: 7,
            check_id_collisions: false,
            max_id_attempts: 16,
            prune_orphan_markers: false,
        }
    }
}

impl CorefConfig {
    /// Parses and validates a JSON document. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns a validation error for malformed JSON or invalid values.
    pub fn from_json_str(json: &str) -> CorefResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            CorefError::Validation(ValidationError::InvalidConfig {
                reason: e.to_string(),
            })
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    /// Returns a validation error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> CorefResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CorefError::Validation(ValidationError::InvalidConfig {
                reason: format!("cannot read {}: {e}", path.display()),
            })
        })?;
        Self::from_json_str(&json)
    }

    /// Checks value ranges and that both connectors are single atoms.
    ///
    /// # Errors
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id_length == 0 {
            return Err(ValidationError::ZeroValue {
                field: "id_length".to_string(),
            });
        }
        if self.max_id_attempts == 0 {
            return Err(ValidationError::ZeroValue {
                field: "max_id_attempts".to_string(),
            });
        }
        if self.coref_id_key.trim().is_empty() {
            return Err(ValidationError::EmptyField {
                field: "coref_id_key".to_string(),
            });
        }
        ensure_atom("coref_connector", &self.coref_connector)?;
        ensure_atom("main_coref_connector", &self.main_coref_connector)?;
        if self.coref_connector == self.main_coref_connector {
            return Err(ValidationError::InvalidConfig {
                reason: "coref_connector and main_coref_connector must differ".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn coref_connector_edge(&self) -> Edge {
        Edge::atom(self.coref_connector.clone())
    }

    pub(crate) fn main_coref_connector_edge(&self) -> Edge {
        Edge::atom(self.main_coref_connector.clone())
    }
}

fn ensure_atom(field: &str, value: &str) -> Result<(), ValidationError> {
    match Edge::parse(value) {
        Ok(edge) if edge.is_atom() => Ok(()),
        _ => Err(ValidationError::NotAnAtom {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}
