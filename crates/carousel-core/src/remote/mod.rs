//! Remote publishing API interface.
//!
//! The saga only depends on the [`RemotePublisher`] trait and does not know
//! about HTTP, URLs or response envelopes. [`graph::GraphPublisher`] is the
//! production implementation; tests substitute scripted fakes.

pub mod graph;

use async_trait::async_trait;
use std::fmt;

use crate::retry::RemoteError;

pub use graph::GraphPublisher;

/// Bearer token supplied by the auth provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for building requests only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Account a carousel is published to.
#[derive(Debug, Clone)]
pub struct Account {
    /// Platform account (business user) id.
    pub id: String,
    pub token: AccessToken,
}

impl Account {
    pub fn new(id: impl Into<String>, token: AccessToken) -> Self {
        Self {
            id: id.into(),
            token,
        }
    }
}

/// Provider-side staged resource created by a container call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RemoteContainerRef {
    pub id: String,
}

impl RemoteContainerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl fmt::Display for RemoteContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Parameters of a single media container call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerRequest {
    pub media_url: String,
    pub is_video: bool,
    /// Child of a carousel (no caption of its own).
    pub is_carousel_item: bool,
    pub caption: Option<String>,
}

/// Result of a publish call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMedia {
    pub id: String,
    /// Present only if the publish response already carried it.
    pub permalink: Option<String>,
}

/// The four logical operations of the container/assemble/publish protocol.
#[async_trait]
pub trait RemotePublisher: Send + Sync {
    /// Stage one piece of media.
    async fn create_container(
        &self,
        account: &Account,
        request: &ContainerRequest,
    ) -> Result<RemoteContainerRef, RemoteError>;

    /// Stage a carousel referencing previously created children.
    async fn create_carousel_container(
        &self,
        account: &Account,
        children: &[RemoteContainerRef],
        caption: Option<&str>,
    ) -> Result<RemoteContainerRef, RemoteError>;

    /// Publish a staged container.
    async fn publish(
        &self,
        account: &Account,
        container: &RemoteContainerRef,
    ) -> Result<PublishedMedia, RemoteError>;

    /// Look up the public permalink of published media.
    async fn get_permalink(
        &self,
        media_id: &str,
        token: &AccessToken,
    ) -> Result<Option<String>, RemoteError>;
}
