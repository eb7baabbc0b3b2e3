//! Saga orchestrator.

use std::sync::Arc;

use thiserror::Error;

use crate::account_gate::AccountGate;
use crate::config::SagaSettings;
use crate::remote::{Account, RemotePublisher};
use crate::retry::{ClassifiedError, RetryContext};

use super::assemble::CarouselAssembler;
use super::containers::ContainerFactory;
use super::publish::PublishExecutor;
use super::state::PublishAttemptState;
use super::validate::validate_carousel;
use super::{CarouselItem, PublishOutcome, SagaStage};

/// Terminal saga failure: what went wrong, where, and what was left behind.
#[derive(Debug, Clone, Error)]
#[error("carousel publish failed while {stage}: {error}")]
pub struct SagaFailure {
    pub stage: SagaStage,
    pub error: ClassifiedError,
    /// Ids created before the failure. Unpublished containers expire remotely.
    pub state: PublishAttemptState,
    /// 1-based item whose container could not be created.
    pub failed_item: Option<usize>,
}

impl SagaFailure {
    fn new(stage: SagaStage, error: ClassifiedError, state: PublishAttemptState) -> Self {
        Self {
            stage,
            error,
            state,
            failed_item: None,
        }
    }

    pub fn remediation(&self) -> &'static str {
        self.error.remediation()
    }

    pub fn orphan_ids(&self) -> Vec<&str> {
        self.state.orphan_ids()
    }
}

/// Publishes carousels through a [`RemotePublisher`].
///
/// One value can run many sagas; each [`PublishSaga::publish`] call owns its
/// own [`PublishAttemptState`]. Sagas for the same account are serialized
/// through the injected [`AccountGate`].
pub struct PublishSaga {
    publisher: Arc<dyn RemotePublisher>,
    settings: SagaSettings,
    retry: RetryContext,
    gate: Arc<AccountGate>,
}

impl PublishSaga {
    pub fn new(
        publisher: Arc<dyn RemotePublisher>,
        settings: SagaSettings,
        retry: RetryContext,
        gate: Arc<AccountGate>,
    ) -> Self {
        Self {
            publisher,
            settings,
            retry,
            gate,
        }
    }

    pub fn settings(&self) -> &SagaSettings {
        &self.settings
    }

    pub fn gate(&self) -> &Arc<AccountGate> {
        &self.gate
    }

    /// Run the full protocol for one carousel.
    ///
    /// Either the carousel is published (`Ok`, permalink best effort) or the
    /// first unrecoverable step failure is returned with the ids created so
    /// far. Validation runs before the account permit is taken and before any
    /// remote call.
    pub async fn publish(
        &self,
        account: &Account,
        items: &[CarouselItem],
        caption: Option<&str>,
    ) -> Result<PublishOutcome, SagaFailure> {
        let mut state = PublishAttemptState::new();

        enter(account, SagaStage::Validating);
        validate_carousel(items, caption)
            .map_err(|e| SagaFailure::new(SagaStage::Validating, e, PublishAttemptState::new()))?;

        let _permit = self.gate.acquire(&account.id).await.map_err(|e| {
            SagaFailure::new(
                SagaStage::Validating,
                ClassifiedError::Transient(format!("account gate closed: {}", e)),
                PublishAttemptState::new(),
            )
        })?;

        let result = self.drive(account, items, caption, &mut state).await;
        match &result {
            Ok(outcome) => {
                self.gate.record_success(&account.id);
                tracing::info!(
                    account = %account.id,
                    media_id = %outcome.media_id,
                    permalink = outcome.permalink.as_deref().unwrap_or("-"),
                    "carousel published"
                );
            }
            Err(failure) => self.report_failure(account, failure),
        }
        result
    }

    async fn drive(
        &self,
        account: &Account,
        items: &[CarouselItem],
        caption: Option<&str>,
        state: &mut PublishAttemptState,
    ) -> Result<PublishOutcome, SagaFailure> {
        let publisher = self.publisher.as_ref();
        let settings = &self.settings;

        enter(account, SagaStage::CreatingContainers);
        let factory = ContainerFactory::new(
            publisher,
            &self.retry,
            &settings.container_backoff,
            settings.pacing,
        );
        if let Err(failure) = factory.create_all(account, items, state).await {
            return Err(SagaFailure {
                stage: SagaStage::CreatingContainers,
                error: failure.error,
                state: state.clone(),
                failed_item: Some(failure.item),
            });
        }

        enter(account, SagaStage::AssemblingCarousel);
        let assembler = CarouselAssembler::new(publisher, &self.retry, &settings.assembly_backoff);
        let carousel = assembler
            .assemble_carousel(account, state.child_container_ids(), caption)
            .await
            .map_err(|e| SagaFailure::new(SagaStage::AssemblingCarousel, e, state.clone()))?;
        state.record_carousel(carousel.clone(), items.len());

        let executor = PublishExecutor::new(
            publisher,
            &self.retry,
            &settings.publish_backoff,
            settings.processing_wait,
        );

        enter(account, SagaStage::WaitingForProcessing);
        executor.wait_for_processing(items.len()).await;

        enter(account, SagaStage::Publishing);
        let media = executor
            .publish(account, &carousel)
            .await
            .map_err(|e| SagaFailure::new(SagaStage::Publishing, e, state.clone()))?;
        state.record_published(media.id.clone());

        enter(account, SagaStage::ResolvingPermalink);
        let permalink = executor.resolve_permalink(account, &media).await;

        enter(account, SagaStage::Done);
        Ok(PublishOutcome {
            media_id: media.id,
            permalink,
            carousel_container_id: carousel.id,
            child_container_ids: state
                .child_container_ids()
                .iter()
                .map(|c| c.id.clone())
                .collect(),
        })
    }

    fn report_failure(&self, account: &Account, failure: &SagaFailure) {
        match failure.error {
            ClassifiedError::RateLimited { .. } => self.gate.record_throttled(&account.id),
            _ => self.gate.record_error(&account.id),
        }
        let orphans = failure.orphan_ids();
        if orphans.is_empty() {
            tracing::info!(
                account = %account.id,
                stage = %failure.stage,
                error = %failure.error,
                "carousel publish failed"
            );
        } else {
            tracing::warn!(
                account = %account.id,
                stage = %failure.stage,
                failed_item = ?failure.failed_item,
                error = %failure.error,
                orphans = ?orphans,
                "carousel publish failed, containers left to expire"
            );
        }
    }
}

fn enter(account: &Account, stage: SagaStage) {
    tracing::info!(account = %account.id, %stage, "saga stage");
}
