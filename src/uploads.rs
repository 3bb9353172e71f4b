//! Ephemeral object URLs for uploaded images.
//!
//! Nothing here touches disk. A reference stays valid until it is revoked or
//! the process exits.

use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;

const URL_PREFIX: &str = "blob:folio/";

#[derive(Debug, Error, PartialEq)]
pub enum UploadError {
    #[error("Upload is empty")]
    Empty,

    #[error("Upload exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Not an image: {0}")]
    NotImage(String),
}

#[derive(Debug, Clone)]
pub struct Blob {
    pub content_type: String,
    pub data: Bytes,
}

#[derive(Debug, Default)]
pub struct ObjectUrlRegistry {
    blobs: HashMap<String, Blob>,
    max_bytes: usize,
}

impl ObjectUrlRegistry {
    pub fn new(max_bytes: usize) -> Self {
        Self {
            blobs: HashMap::new(),
            max_bytes,
        }
    }

    /// Register `data` and return its reference, `blob:folio/<id>`.
    pub fn create(&mut self, content_type: &str, data: Bytes) -> Result<String, UploadError> {
        if data.is_empty() {
            return Err(UploadError::Empty);
        }
        if data.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotImage(content_type.to_string()));
        }

        let id = uuid::Uuid::now_v7().to_string();
        self.blobs.insert(
            id.clone(),
            Blob {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(format!("{}{}", URL_PREFIX, id))
    }

    /// Look up by the id part of a reference.
    pub fn get(&self, id: &str) -> Option<&Blob> {
        self.blobs.get(id)
    }

    #[cfg(test)]
    fn resolve(&self, url: &str) -> Option<&Blob> {
        url.strip_prefix(URL_PREFIX).and_then(|id| self.get(id))
    }

    /// Release a reference. Returns false if it was unknown or already gone.
    pub fn revoke(&mut self, url: &str) -> bool {
        match url.strip_prefix(URL_PREFIX) {
            Some(id) => self.blobs.remove(id).is_some(),
            None => false,
        }
    }

    /// Number of live references.
    pub(crate) fn len(&self) -> usize {
        self.blobs.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// Path the HTTP layer serves a reference from.
pub fn serve_path(url: &str) -> Option<String> {
    url.strip_prefix(URL_PREFIX).map(|id| format!("/uploads/{}", id))
}

/// Holds the single in-progress preview. A new preview revokes the one it
/// replaces; discarding the slot revokes whatever it holds.
#[derive(Debug, Default)]
pub struct PreviewSlot {
    current: Option<String>,
}

impl PreviewSlot {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn replace(
        &mut self,
        registry: &mut ObjectUrlRegistry,
        content_type: &str,
        data: Bytes,
    ) -> Result<&str, UploadError> {
        let url = registry.create(content_type, data)?;
        if let Some(old) = self.current.replace(url) {
            registry.revoke(&old);
            tracing::debug!(url = %old, "Revoked superseded preview");
        }
        Ok(self.current.as_deref().unwrap_or_default())
    }

    /// Drop the preview, e.g. when the compose view is abandoned.
    pub fn discard(&mut self, registry: &mut ObjectUrlRegistry) -> bool {
        match self.current.take() {
            Some(url) => registry.revoke(&url),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png() -> Bytes {
        Bytes::from_static(b"\x89PNG\r\n\x1a\nfake")
    }

    #[test]
    fn create_and_resolve() {
        let mut reg = ObjectUrlRegistry::new(1024);
        let url = reg.create("image/png", png()).unwrap();
        assert!(url.starts_with("blob:folio/"));
        let blob = reg.resolve(&url).unwrap();
        assert_eq!(blob.content_type, "image/png");
        assert_eq!(blob.data, png());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn create_rejects_bad_uploads() {
        let mut reg = ObjectUrlRegistry::new(4);
        assert_eq!(reg.create("image/png", Bytes::new()), Err(UploadError::Empty));
        assert_eq!(
            reg.create("image/png", png()),
            Err(UploadError::TooLarge { limit: 4 })
        );
        assert_eq!(
            reg.create("text/plain", Bytes::from_static(b"hi")),
            Err(UploadError::NotImage("text/plain".into()))
        );
        assert!(reg.is_empty());
    }

    #[test]
    fn revoke_is_one_shot() {
        let mut reg = ObjectUrlRegistry::new(1024);
        let url = reg.create("image/jpeg", png()).unwrap();
        assert!(reg.revoke(&url));
        assert!(!reg.revoke(&url));
        assert!(reg.resolve(&url).is_none());
        assert!(!reg.revoke("https://example.com/a.png"));
    }

    #[test]
    fn preview_replacement_revokes_previous() {
        let mut reg = ObjectUrlRegistry::new(1024);
        let mut slot = PreviewSlot::default();

        let first = slot.replace(&mut reg, "image/png", png()).unwrap().to_string();
        let second = slot.replace(&mut reg, "image/png", png()).unwrap().to_string();

        assert_ne!(first, second);
        assert!(reg.resolve(&first).is_none());
        assert!(reg.resolve(&second).is_some());
        assert_eq!(slot.current(), Some(second.as_str()));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn failed_replacement_keeps_current_preview() {
        let mut reg = ObjectUrlRegistry::new(1024);
        let mut slot = PreviewSlot::default();
        let first = slot.replace(&mut reg, "image/png", png()).unwrap().to_string();

        assert!(slot.replace(&mut reg, "image/png", Bytes::new()).is_err());
        assert_eq!(slot.current(), Some(first.as_str()));
        assert!(reg.resolve(&first).is_some());
    }

    #[test]
    fn discard_revokes_current() {
        let mut reg = ObjectUrlRegistry::new(1024);
        let mut slot = PreviewSlot::default();
        let url = slot.replace(&mut reg, "image/png", png()).unwrap().to_string();

        assert!(slot.discard(&mut reg));
        assert!(slot.current().is_none());
        assert!(reg.resolve(&url).is_none());
        assert!(!slot.discard(&mut reg));
    }

    #[test]
    fn serve_path_maps_blob_refs_only() {
        assert_eq!(serve_path("blob:folio/abc").as_deref(), Some("/uploads/abc"));
        assert_eq!(serve_path("https://picsum.photos/x"), None);
    }
}
