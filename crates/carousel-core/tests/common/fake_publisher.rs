//! Scripted in-memory publisher and a sleeper that only records durations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use carousel_core::remote::{
    AccessToken, Account, ContainerRequest, PublishedMedia, RemoteContainerRef, RemotePublisher,
};
use carousel_core::retry::{ApiError, FixedJitter, RemoteError, RetryContext, Sleeper};

/// A remote call as the fake saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Container { media_url: String, is_video: bool },
    Carousel { children: Vec<String>, caption: Option<String> },
    Publish { container: String },
    Permalink { media_id: String },
}

/// Each operation pops its next scripted step; an empty script means success.
/// `Ok(())` forces a success. Successful ids are generated: children `c1`,
/// `c2`, ...; carousels `car-1`, ...; media `media-1`, ...
#[derive(Default)]
pub struct FakePublisher {
    calls: Mutex<Vec<Call>>,
    containers: Mutex<VecDeque<Result<(), RemoteError>>>,
    carousels: Mutex<VecDeque<Result<(), RemoteError>>>,
    publishes: Mutex<VecDeque<Result<(), RemoteError>>>,
    permalinks: Mutex<VecDeque<Result<(), RemoteError>>>,
    counters: Mutex<[usize; 3]>,
    inline_permalink: bool,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish responses carry the permalink themselves.
    pub fn with_inline_permalink(mut self) -> Self {
        self.inline_permalink = true;
        self
    }

    pub fn script_containers(self, steps: Vec<Result<(), RemoteError>>) -> Self {
        self.containers.lock().unwrap().extend(steps);
        self
    }

    pub fn script_carousel(self, steps: Vec<Result<(), RemoteError>>) -> Self {
        self.carousels.lock().unwrap().extend(steps);
        self
    }

    pub fn script_publish(self, steps: Vec<Result<(), RemoteError>>) -> Self {
        self.publishes.lock().unwrap().extend(steps);
        self
    }

    pub fn script_permalink(self, steps: Vec<Result<(), RemoteError>>) -> Self {
        self.permalinks.lock().unwrap().extend(steps);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    fn step(
        &self,
        call: Call,
        script: &Mutex<VecDeque<Result<(), RemoteError>>>,
    ) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        script.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    fn next_id(&self, slot: usize) -> usize {
        let mut counters = self.counters.lock().unwrap();
        counters[slot] += 1;
        counters[slot]
    }
}

#[async_trait]
impl RemotePublisher for FakePublisher {
    async fn create_container(
        &self,
        _account: &Account,
        request: &ContainerRequest,
    ) -> Result<RemoteContainerRef, RemoteError> {
        assert!(request.is_carousel_item);
        self.step(
            Call::Container {
                media_url: request.media_url.clone(),
                is_video: request.is_video,
            },
            &self.containers,
        )?;
        Ok(RemoteContainerRef::new(format!("c{}", self.next_id(0))))
    }

    async fn create_carousel_container(
        &self,
        _account: &Account,
        children: &[RemoteContainerRef],
        caption: Option<&str>,
    ) -> Result<RemoteContainerRef, RemoteError> {
        self.step(
            Call::Carousel {
                children: children.iter().map(|c| c.id.clone()).collect(),
                caption: caption.map(str::to_string),
            },
            &self.carousels,
        )?;
        Ok(RemoteContainerRef::new(format!("car-{}", self.next_id(1))))
    }

    async fn publish(
        &self,
        _account: &Account,
        container: &RemoteContainerRef,
    ) -> Result<PublishedMedia, RemoteError> {
        self.step(
            Call::Publish {
                container: container.id.clone(),
            },
            &self.publishes,
        )?;
        let id = format!("media-{}", self.next_id(2));
        let permalink = self
            .inline_permalink
            .then(|| format!("https://www.instagram.com/p/inline-{}/", id));
        Ok(PublishedMedia { id, permalink })
    }

    async fn get_permalink(
        &self,
        media_id: &str,
        _token: &AccessToken,
    ) -> Result<Option<String>, RemoteError> {
        self.step(
            Call::Permalink {
                media_id: media_id.to_string(),
            },
            &self.permalinks,
        )?;
        Ok(Some(format!("https://www.instagram.com/p/{}/", media_id)))
    }
}

#[derive(Default)]
pub struct RecordingSleeper(Mutex<Vec<Duration>>);

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.0.lock().unwrap().push(duration);
    }
}

/// Retry context with recorded sleeps and zero jitter.
pub fn recording_context() -> (RetryContext, Arc<RecordingSleeper>) {
    let sleeper = Arc::new(RecordingSleeper::default());
    let ctx = RetryContext::new(sleeper.clone(), Arc::new(FixedJitter(0.0)));
    (ctx, sleeper)
}

pub fn account() -> Account {
    Account::new("17841400000000001", AccessToken::new("test-token"))
}

pub fn api_error(status: u32, code: Option<i64>, retry_after_secs: Option<u64>) -> RemoteError {
    RemoteError::Api(ApiError {
        status,
        code,
        subcode: None,
        message: "scripted failure".to_string(),
        retry_after_secs,
        raw: format!(r#"{{"error":{{"code":{}}}}}"#, code.unwrap_or(0)),
    })
}

pub fn network_error() -> RemoteError {
    RemoteError::Network {
        message: "connection reset by peer".to_string(),
        timed_out: false,
    }
}
