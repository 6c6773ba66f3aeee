//! Decoded images keyed by element id.
//!
//! Loading happens outside the core. When a load finishes the host calls
//! [`ImageCache::insert`]; the renderer draws nothing for an image element
//! until its entry exists.

use crate::elements::ElementId;
use kurbo::Size;
use std::collections::HashMap;
use std::sync::Arc;

/// A decoded bitmap ready for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    /// Natural size in pixels.
    pub size: Size,
    /// Pixel or encoded data, owned by the host's decoder format.
    pub data: Arc<[u8]>,
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    images: HashMap<ElementId, LoadedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a finished load.
    ///
    /// `still_present` is false when the element was deleted while the load
    /// was in flight; the result is dropped.
    pub fn insert(&mut self, id: ElementId, image: LoadedImage, still_present: bool) -> bool {
        if !still_present {
            log::debug!("dropping image for deleted element {id}");
            return false;
        }
        self.images.insert(id, image);
        true
    }

    /// Record a failed load. The element keeps existing without a picture.
    pub fn fail(&mut self, id: ElementId, reason: &str) {
        log::warn!("image for element {id} failed to load: {reason}");
        self.images.remove(&id);
    }

    pub fn get(&self, id: ElementId) -> Option<&LoadedImage> {
        self.images.get(&id)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<LoadedImage> {
        self.images.remove(&id)
    }

    /// Drop entries whose element is gone.
    pub fn retain(&mut self, mut keep: impl FnMut(ElementId) -> bool) {
        self.images.retain(|id, _| keep(*id));
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn image() -> LoadedImage {
        LoadedImage {
            size: Size::new(2.0, 2.0),
            data: Arc::from(vec![0u8; 16]),
        }
    }

    #[test]
    fn test_late_load_is_dropped() {
        let mut cache = ImageCache::new();
        let id = Uuid::new_v4();
        assert!(!cache.insert(id, image(), false));
        assert!(cache.get(id).is_none());
    }

    #[test]
    fn test_insert_and_fail() {
        let mut cache = ImageCache::new();
        let id = Uuid::new_v4();
        assert!(cache.insert(id, image(), true));
        assert_eq!(cache.get(id).map(|i| i.size), Some(Size::new(2.0, 2.0)));
        cache.fail(id, "corrupt");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_retain_drops_unlisted() {
        let mut cache = ImageCache::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        cache.insert(a, image(), true);
        cache.insert(b, image(), true);
        cache.retain(|id| id == a);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(a).is_some());
    }
}
