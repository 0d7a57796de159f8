//! Saved defaults: the last template / current CV a user chose to keep across sessions.
//!
//! One slot per artifact kind per user, overwritten on save, removed on delete, never expired.
//! Stored data that fails to parse (or breaks the payload invariant) reads as absent.

pub mod memory;
pub mod redis_store;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::models::{CurrentCvPayload, TemplatePayload};

pub use memory::InMemoryDefaultStore;
pub use redis_store::RedisDefaultStore;

const KEY_PREFIX: &str = "cv-matcher";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Nothing to save: {0}")]
    EmptyPayload(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Template,
    CurrentCv,
}

impl ArtifactKind {
    /// Fixed slot name for this kind.
    pub fn slot(self) -> &'static str {
        match self {
            ArtifactKind::Template => "savedCvTemplate",
            ArtifactKind::CurrentCv => "savedCurrentCv",
        }
    }

    pub fn storage_key(self, user_id: &str) -> String {
        format!("{KEY_PREFIX}:{user_id}:{}", self.slot())
    }
}

/// A persisted default, in the same shape as the step payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedDefault {
    Template(TemplatePayload),
    CurrentCv(CurrentCvPayload),
}

impl SavedDefault {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            SavedDefault::Template(_) => ArtifactKind::Template,
            SavedDefault::CurrentCv(_) => ArtifactKind::CurrentCv,
        }
    }

    /// Save precondition: at least one non-empty content field.
    pub fn validate(&self) -> Result<(), StoreError> {
        let ok = match self {
            SavedDefault::Template(t) => t.is_well_formed(),
            SavedDefault::CurrentCv(cv) => cv.has_content(),
        };
        if ok {
            Ok(())
        } else {
            Err(StoreError::EmptyPayload(self.kind().slot()))
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        let json = match self {
            SavedDefault::Template(t) => serde_json::to_string(t)?,
            SavedDefault::CurrentCv(cv) => serde_json::to_string(cv)?,
        };
        Ok(json)
    }

    /// Decodes a stored value. Malformed data is logged and treated as absent.
    pub fn from_json(kind: ArtifactKind, raw: &str) -> Option<Self> {
        let decoded = match kind {
            ArtifactKind::Template => serde_json::from_str::<TemplatePayload>(raw)
                .map(SavedDefault::Template),
            ArtifactKind::CurrentCv => serde_json::from_str::<CurrentCvPayload>(raw)
                .map(SavedDefault::CurrentCv),
        };
        match decoded {
            Ok(saved) if saved.validate().is_ok() => Some(saved),
            Ok(_) => {
                warn!("Discarding stored {} without content", kind.slot());
                None
            }
            Err(e) => {
                warn!("Discarding malformed stored {}: {e}", kind.slot());
                None
            }
        }
    }
}

/// Key/value persistence for saved defaults. Each call is atomic on its own.
#[async_trait]
pub trait DefaultStore: Send + Sync {
    async fn save(&self, user_id: &str, saved: &SavedDefault) -> Result<(), StoreError>;

    async fn load(
        &self,
        user_id: &str,
        kind: ArtifactKind,
    ) -> Result<Option<SavedDefault>, StoreError>;

    async fn remove(&self, user_id: &str, kind: ArtifactKind) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_keys_are_fixed_per_kind() {
        assert_eq!(
            ArtifactKind::Template.storage_key("u1"),
            "cv-matcher:u1:savedCvTemplate"
        );
        assert_eq!(
            ArtifactKind::CurrentCv.storage_key("u1"),
            "cv-matcher:u1:savedCurrentCv"
        );
    }

    #[test]
    fn test_kind_path_names() {
        let kind: ArtifactKind = serde_json::from_str("\"current-cv\"").unwrap();
        assert_eq!(kind, ArtifactKind::CurrentCv);
    }

    #[test]
    fn test_malformed_json_reads_as_absent() {
        assert!(SavedDefault::from_json(ArtifactKind::Template, "{not json").is_none());
        assert!(SavedDefault::from_json(ArtifactKind::CurrentCv, "42").is_none());
    }

    #[test]
    fn test_invariant_violation_reads_as_absent() {
        let both = r#"{"text":"a","binaryData":"b","mimeType":"text/html","name":null}"#;
        assert!(SavedDefault::from_json(ArtifactKind::Template, both).is_none());
        let blank_cv = r#"{"text":"  ","binaryData":null,"name":"x"}"#;
        assert!(SavedDefault::from_json(ArtifactKind::CurrentCv, blank_cv).is_none());
    }

    #[test]
    fn test_json_round_trip_preserves_payload() {
        let saved = SavedDefault::CurrentCv(CurrentCvPayload::text(
            "Jane Doe, Rust engineer".into(),
            Some("Pasted Text CV".into()),
        ));
        let raw = saved.to_json().unwrap();
        assert_eq!(
            SavedDefault::from_json(ArtifactKind::CurrentCv, &raw),
            Some(saved)
        );
    }

    #[test]
    fn test_validate_rejects_empty_cv() {
        let empty = SavedDefault::CurrentCv(CurrentCvPayload::text(String::new(), None));
        assert!(matches!(empty.validate(), Err(StoreError::EmptyPayload(_))));
    }
}
