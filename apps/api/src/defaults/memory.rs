use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::defaults::{ArtifactKind, DefaultStore, SavedDefault, StoreError};

/// Process-local store. Used when no Redis is configured, and in tests.
///
/// Values are kept as serialized JSON so reads go through the same decoding path as Redis.
#[derive(Default)]
pub struct InMemoryDefaultStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryDefaultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw value into a slot, bypassing validation.
    #[cfg(test)]
    pub async fn put_raw(&self, user_id: &str, kind: ArtifactKind, raw: &str) {
        self.entries
            .write()
            .await
            .insert(kind.storage_key(user_id), raw.to_string());
    }
}

#[async_trait]
impl DefaultStore for InMemoryDefaultStore {
    async fn save(&self, user_id: &str, saved: &SavedDefault) -> Result<(), StoreError> {
        saved.validate()?;
        let raw = saved.to_json()?;
        self.entries
            .write()
            .await
            .insert(saved.kind().storage_key(user_id), raw);
        Ok(())
    }

    async fn load(
        &self,
        user_id: &str,
        kind: ArtifactKind,
    ) -> Result<Option<SavedDefault>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&kind.storage_key(user_id))
            .and_then(|raw| SavedDefault::from_json(kind, raw)))
    }

    async fn remove(&self, user_id: &str, kind: ArtifactKind) -> Result<(), StoreError> {
        self.entries.write().await.remove(&kind.storage_key(user_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TemplatePayload;

    fn template(name: &str) -> SavedDefault {
        SavedDefault::Template(TemplatePayload::text(
            format!("<html>{name}</html>"),
            "text/html",
            Some(name.to_string()),
        ))
    }

    #[tokio::test]
    async fn test_save_overwrites_and_load_returns_latest() {
        let store = InMemoryDefaultStore::new();
        store.save("u1", &template("first")).await.unwrap();
        store.save("u1", &template("second")).await.unwrap();

        let loaded = store.load("u1", ArtifactKind::Template).await.unwrap();
        assert_eq!(loaded, Some(template("second")));
    }

    #[tokio::test]
    async fn test_slots_are_isolated_per_user_and_kind() {
        let store = InMemoryDefaultStore::new();
        store.save("u1", &template("mine")).await.unwrap();

        assert!(store.load("u2", ArtifactKind::Template).await.unwrap().is_none());
        assert!(store.load("u1", ArtifactKind::CurrentCv).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_is_unconditional() {
        let store = InMemoryDefaultStore::new();
        store.remove("u1", ArtifactKind::Template).await.unwrap();
        store.save("u1", &template("t")).await.unwrap();
        store.remove("u1", ArtifactKind::Template).await.unwrap();
        assert!(store.load("u1", ArtifactKind::Template).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_slot_loads_as_none() {
        let store = InMemoryDefaultStore::new();
        store.put_raw("u1", ArtifactKind::Template, "{{{").await;
        assert!(store.load("u1", ArtifactKind::Template).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_rejects_payload_without_content() {
        let store = InMemoryDefaultStore::new();
        let empty = SavedDefault::Template(TemplatePayload::text(String::new(), "text/html", None));
        assert!(store.save("u1", &empty).await.is_err());
    }
}
