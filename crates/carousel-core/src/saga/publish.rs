//! Processing wait, publish call and permalink lookup.

use crate::config::ProcessingWaitConfig;
use crate::remote::{Account, PublishedMedia, RemoteContainerRef, RemotePublisher};
use crate::retry::{run_with_retry, BackoffConfig, ClassifiedError, RetryContext};

pub struct PublishExecutor<'a> {
    publisher: &'a dyn RemotePublisher,
    retry: &'a RetryContext,
    backoff: &'a BackoffConfig,
    processing_wait: ProcessingWaitConfig,
}

impl<'a> PublishExecutor<'a> {
    pub fn new(
        publisher: &'a dyn RemotePublisher,
        retry: &'a RetryContext,
        backoff: &'a BackoffConfig,
        processing_wait: ProcessingWaitConfig,
    ) -> Self {
        Self {
            publisher,
            retry,
            backoff,
            processing_wait,
        }
    }

    /// Give the platform time to process the media before publishing.
    pub async fn wait_for_processing(&self, item_count: usize) {
        let delay = self.processing_wait.delay_for(item_count);
        tracing::debug!(
            items = item_count,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "waiting for media processing"
        );
        self.retry.sleep(delay).await;
    }

    /// Publish the carousel container with the publish profile.
    pub async fn publish(
        &self,
        account: &Account,
        carousel: &RemoteContainerRef,
    ) -> Result<PublishedMedia, ClassifiedError> {
        let publisher = self.publisher;
        run_with_retry(self.retry, self.backoff, "publish", move || {
            publisher.publish(account, carousel)
        })
        .await
    }

    /// Permalink of the published media: the one from the publish response if
    /// present, otherwise a single lookup by media id. Failures yield `None`.
    pub async fn resolve_permalink(
        &self,
        account: &Account,
        media: &PublishedMedia,
    ) -> Option<String> {
        if let Some(permalink) = &media.permalink {
            return Some(permalink.clone());
        }
        match self.publisher.get_permalink(&media.id, &account.token).await {
            Ok(permalink) => permalink,
            Err(e) => {
                tracing::warn!(media_id = %media.id, error = %e, "permalink lookup failed");
                None
            }
        }
    }
}
