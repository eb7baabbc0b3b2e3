//! Remote ids created during one saga run.

use crate::remote::RemoteContainerRef;

/// Ids created so far by one saga invocation; on failure this is the orphan report.
///
/// Only the saga mutates it, in protocol order: children, then the carousel,
/// then the published media id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishAttemptState {
    child_container_ids: Vec<RemoteContainerRef>,
    carousel_container_id: Option<RemoteContainerRef>,
    published_media_id: Option<String>,
}

impl PublishAttemptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child_container_ids(&self) -> &[RemoteContainerRef] {
        &self.child_container_ids
    }

    pub fn carousel_container_id(&self) -> Option<&RemoteContainerRef> {
        self.carousel_container_id.as_ref()
    }

    pub fn published_media_id(&self) -> Option<&str> {
        self.published_media_id.as_deref()
    }

    pub(crate) fn record_child(&mut self, container: RemoteContainerRef) {
        debug_assert!(self.carousel_container_id.is_none());
        self.child_container_ids.push(container);
    }

    /// Requires every item to have its child container.
    pub(crate) fn record_carousel(&mut self, container: RemoteContainerRef, item_count: usize) {
        debug_assert_eq!(self.child_container_ids.len(), item_count);
        self.carousel_container_id = Some(container);
    }

    /// Requires the carousel container.
    pub(crate) fn record_published(&mut self, media_id: String) {
        debug_assert!(self.carousel_container_id.is_some());
        self.published_media_id = Some(media_id);
    }

    /// Created-but-unpublished ids: children first, then the carousel.
    /// Empty once the carousel is published.
    pub fn orphan_ids(&self) -> Vec<&str> {
        if self.published_media_id.is_some() {
            return Vec::new();
        }
        self.child_container_ids
            .iter()
            .chain(self.carousel_container_id.iter())
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.child_container_ids.is_empty() && self.carousel_container_id.is_none()
    }
}
