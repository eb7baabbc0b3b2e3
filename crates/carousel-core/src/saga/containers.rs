//! Child container creation, one item at a time.

use crate::config::PacingConfig;
use crate::remote::{Account, ContainerRequest, RemoteContainerRef, RemotePublisher};
use crate::retry::{run_with_retry, BackoffConfig, ClassifiedError, RetryContext};

use super::state::PublishAttemptState;
use super::CarouselItem;

/// Container creation that failed after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// 1-based position of the failing item.
    pub item: usize,
    pub error: ClassifiedError,
}

/// Creates carousel child containers sequentially with pacing between calls.
pub struct ContainerFactory<'a> {
    publisher: &'a dyn RemotePublisher,
    retry: &'a RetryContext,
    backoff: &'a BackoffConfig,
    pacing: PacingConfig,
}

impl<'a> ContainerFactory<'a> {
    pub fn new(
        publisher: &'a dyn RemotePublisher,
        retry: &'a RetryContext,
        backoff: &'a BackoffConfig,
        pacing: PacingConfig,
    ) -> Self {
        Self {
            publisher,
            retry,
            backoff,
            pacing,
        }
    }

    /// One child container, retried with the container profile.
    pub async fn create_item_container(
        &self,
        account: &Account,
        item: &CarouselItem,
    ) -> Result<RemoteContainerRef, ClassifiedError> {
        let request = ContainerRequest {
            media_url: item.image_url.clone(),
            is_video: item.is_video,
            is_carousel_item: true,
            caption: None,
        };
        let publisher = self.publisher;
        let request = &request;
        run_with_retry(self.retry, self.backoff, "create_container", move || {
            publisher.create_container(account, request)
        })
        .await
    }

    /// Create every child in input order, recording each id in `state` as
    /// soon as it exists. Stops at the first item that fails.
    ///
    /// Items after the first wait `pacing.delay_for(index)` before their call.
    pub async fn create_all(
        &self,
        account: &Account,
        items: &[CarouselItem],
        state: &mut PublishAttemptState,
    ) -> Result<(), ItemFailure> {
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                self.retry.sleep(self.pacing.delay_for(index)).await;
            }
            match self.create_item_container(account, item).await {
                Ok(container) => {
                    tracing::debug!(
                        account = %account.id,
                        item = index + 1,
                        container = %container,
                        "child container created"
                    );
                    state.record_child(container);
                }
                Err(error) => {
                    return Err(ItemFailure {
                        item: index + 1,
                        error,
                    })
                }
            }
        }
        Ok(())
    }
}
