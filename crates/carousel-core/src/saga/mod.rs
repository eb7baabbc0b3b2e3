//! Carousel publish saga.
//!
//! Drives the container → assemble → publish protocol for one carousel:
//!
//! `Validating → CreatingContainers → AssemblingCarousel → WaitingForProcessing
//! → Publishing → ResolvingPermalink → Done`
//!
//! Every remote call goes through [`crate::retry::run_with_retry`] with the
//! step's backoff profile. The first unrecoverable failure stops the saga and
//! is returned as a [`SagaFailure`] carrying the ids created so far (the
//! orphan report). Orphans are logged, never deleted: unpublished containers
//! expire on the platform side after 24 hours.

mod assemble;
mod containers;
mod publish;
mod run;
mod state;
mod validate;

use std::fmt;

pub use assemble::CarouselAssembler;
pub use containers::{ContainerFactory, ItemFailure};
pub use publish::PublishExecutor;
pub use run::{PublishSaga, SagaFailure};
pub use state::PublishAttemptState;
pub use validate::{validate_carousel, MAX_CAPTION_CHARS, MAX_HASHTAGS, MAX_ITEMS, MIN_ITEMS};

const VIDEO_EXTENSIONS: [&str; 3] = [".mp4", ".mov", ".m4v"];

/// One media element of a carousel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselItem {
    pub image_url: String,
    pub is_video: bool,
}

impl CarouselItem {
    pub fn image(url: impl Into<String>) -> Self {
        Self {
            image_url: url.into(),
            is_video: false,
        }
    }

    pub fn video(url: impl Into<String>) -> Self {
        Self {
            image_url: url.into(),
            is_video: true,
        }
    }

    /// Image or video depending on the extension of the URL path.
    pub fn from_url(url: &str) -> Self {
        let is_video = url::Url::parse(url)
            .map(|u| {
                let path = u.path().to_ascii_lowercase();
                VIDEO_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
            })
            .unwrap_or(false);
        Self {
            image_url: url.to_string(),
            is_video,
        }
    }
}

/// Position of a saga in its state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaStage {
    Validating,
    CreatingContainers,
    AssemblingCarousel,
    WaitingForProcessing,
    Publishing,
    ResolvingPermalink,
    Done,
}

impl fmt::Display for SagaStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SagaStage::Validating => "validating",
            SagaStage::CreatingContainers => "creating containers",
            SagaStage::AssemblingCarousel => "assembling carousel",
            SagaStage::WaitingForProcessing => "waiting for processing",
            SagaStage::Publishing => "publishing",
            SagaStage::ResolvingPermalink => "resolving permalink",
            SagaStage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Successful saga result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub media_id: String,
    /// Best effort; `None` when resolution failed after a successful publish.
    pub permalink: Option<String>,
    pub carousel_container_id: String,
    pub child_container_ids: Vec<String>,
}
