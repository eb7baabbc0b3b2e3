use crate::remote::{Account, RemoteContainerRef, RemotePublisher};
use crate::retry::{run_with_retry, BackoffConfig, ClassifiedError, RetryContext};

/// Creates the parent carousel container from the children.
pub struct CarouselAssembler<'a> {
    publisher: &'a dyn RemotePublisher,
    retry: &'a RetryContext,
    backoff: &'a BackoffConfig,
}

impl<'a> CarouselAssembler<'a> {
    pub fn new(
        publisher: &'a dyn RemotePublisher,
        retry: &'a RetryContext,
        backoff: &'a BackoffConfig,
    ) -> Self {
        Self {
            publisher,
            retry,
            backoff,
        }
    }

    /// Children are passed in item order; the caption belongs to the carousel.
    pub async fn assemble_carousel(
        &self,
        account: &Account,
        children: &[RemoteContainerRef],
        caption: Option<&str>,
    ) -> Result<RemoteContainerRef, ClassifiedError> {
        let publisher = self.publisher;
        run_with_retry(self.retry, self.backoff, "create_carousel_container", move || {
            publisher.create_carousel_container(account, children, caption)
        })
        .await
    }
}
