//! HTTP implementation of [`RemotePublisher`] for the Graph-style publishing API.
//!
//! Uses the curl crate (libcurl) in `spawn_blocking`:
//! - `POST /{version}/{account}/media` stages a child or carousel container
//! - `POST /{version}/{account}/media_publish` publishes a container
//! - `GET /{version}/{media}?fields=permalink` resolves the permalink
//!
//! The access token travels as the `access_token` parameter and is never
//! logged; only operation names and account ids are.

mod http;
mod parse;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::{
    AccessToken, Account, ContainerRequest, PublishedMedia, RemoteContainerRef, RemotePublisher,
};
use crate::config::ApiConfig;
use crate::retry::RemoteError;
use http::Timeouts;

/// Publishing API client.
#[derive(Debug, Clone)]
pub struct GraphPublisher {
    base: Url,
    version: String,
    timeouts: Timeouts,
}

impl GraphPublisher {
    /// Build a client from the `[api]` config section.
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let base = Url::parse(&api.base_url)
            .with_context(|| format!("invalid API base URL: {}", api.base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry a path: {}", api.base_url);
        }
        if api.version.trim().is_empty() {
            anyhow::bail!("API version must not be empty");
        }
        Ok(Self {
            base,
            version: api.version.trim().to_string(),
            timeouts: Timeouts {
                connect: Duration::from_secs(api.connect_timeout_secs.max(1)),
                request: Duration::from_secs(api.request_timeout_secs.max(1)),
            },
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RemoteError::Request("API base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(&self.version)
            .extend(segments);
        Ok(url)
    }

    async fn post_form(
        &self,
        op: &'static str,
        url: Url,
        params: Vec<(&'static str, String)>,
    ) -> Result<Value, RemoteError> {
        let form = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        self.call(op, url, Some(form)).await
    }

    async fn call(
        &self,
        op: &'static str,
        url: Url,
        form: Option<String>,
    ) -> Result<Value, RemoteError> {
        tracing::debug!(op, path = url.path(), "publishing API request");
        let timeouts = self.timeouts;
        let target = url.to_string();
        let resp = tokio::task::spawn_blocking(move || {
            http::exchange(&target, form.as_deref(), timeouts)
        })
        .await
        .map_err(|e| RemoteError::Network {
            message: format!("request task failed: {}", e),
            timed_out: false,
        })??;
        tracing::debug!(op, status = resp.status, "publishing API response");
        parse::parse_response(&resp)
    }
}

#[async_trait]
impl RemotePublisher for GraphPublisher {
    async fn create_container(
        &self,
        account: &Account,
        request: &ContainerRequest,
    ) -> Result<RemoteContainerRef, RemoteError> {
        let url = self.endpoint(&[account.id.as_str(), "media"])?;
        let mut params: Vec<(&'static str, String)> = Vec::new();
        if request.is_video {
            params.push(("media_type", "VIDEO".to_string()));
            params.push(("video_url", request.media_url.clone()));
        } else {
            params.push(("image_url", request.media_url.clone()));
        }
        if request.is_carousel_item {
            params.push(("is_carousel_item", "true".to_string()));
        }
        if let Some(caption) = &request.caption {
            params.push(("caption", caption.clone()));
        }
        params.push(("access_token", account.token.expose().to_string()));

        let body = self.post_form("create_container", url, params).await?;
        Ok(RemoteContainerRef::new(parse::id_from(&body)?))
    }

    async fn create_carousel_container(
        &self,
        account: &Account,
        children: &[RemoteContainerRef],
        caption: Option<&str>,
    ) -> Result<RemoteContainerRef, RemoteError> {
        let url = self.endpoint(&[account.id.as_str(), "media"])?;
        let child_ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
        let mut params: Vec<(&'static str, String)> = vec![
            ("media_type", "CAROUSEL".to_string()),
            ("children", child_ids.join(",")),
        ];
        if let Some(caption) = caption {
            params.push(("caption", caption.to_string()));
        }
        params.push(("access_token", account.token.expose().to_string()));

        let body = self.post_form("create_carousel_container", url, params).await?;
        Ok(RemoteContainerRef::new(parse::id_from(&body)?))
    }

    async fn publish(
        &self,
        account: &Account,
        container: &RemoteContainerRef,
    ) -> Result<PublishedMedia, RemoteError> {
        let url = self.endpoint(&[account.id.as_str(), "media_publish"])?;
        let params = vec![
            ("creation_id", container.id.clone()),
            ("access_token", account.token.expose().to_string()),
        ];
        let body = self.post_form("publish", url, params).await?;
        Ok(PublishedMedia {
            id: parse::id_from(&body)?,
            permalink: parse::permalink_from(&body),
        })
    }

    async fn get_permalink(
        &self,
        media_id: &str,
        token: &AccessToken,
    ) -> Result<Option<String>, RemoteError> {
        let mut url = self.endpoint(&[media_id])?;
        url.query_pairs_mut()
            .append_pair("fields", "permalink")
            .append_pair("access_token", token.expose());
        let body = self.call("get_permalink", url, None).await?;
        Ok(parse::permalink_from(&body))
    }
}
