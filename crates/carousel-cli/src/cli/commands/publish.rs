//! `carousel publish` – run the publish saga against the live API.

use std::sync::Arc;

use anyhow::{Context, Result};
use carousel_core::account_gate::AccountGate;
use carousel_core::config::CarouselConfig;
use carousel_core::remote::{AccessToken, Account, GraphPublisher};
use carousel_core::retry::RetryContext;
use carousel_core::saga::PublishSaga;

use super::items_from_urls;

pub struct PublishArgs<'a> {
    pub account_id: &'a str,
    pub token: &'a str,
    pub caption: Option<&'a str>,
    pub urls: &'a [String],
}

pub async fn run_publish(cfg: &CarouselConfig, args: PublishArgs<'_>) -> Result<()> {
    let publisher = GraphPublisher::new(&cfg.api).context("configuring API client")?;
    let saga = PublishSaga::new(
        Arc::new(publisher),
        cfg.saga_settings(),
        RetryContext::tokio(),
        Arc::new(AccountGate::new(cfg.max_concurrent_per_account)),
    );
    let account = Account::new(args.account_id, AccessToken::new(args.token));
    let items = items_from_urls(args.urls);

    match saga.publish(&account, &items, args.caption).await {
        Ok(outcome) => {
            println!("published {}", outcome.media_id);
            match outcome.permalink {
                Some(link) => println!("permalink {}", link),
                None => println!("permalink unavailable"),
            }
            Ok(())
        }
        Err(failure) => {
            eprintln!("{}", failure.remediation());
            if let Some(item) = failure.failed_item {
                let url = args.urls.get(item - 1).map(String::as_str).unwrap_or("?");
                eprintln!("failing item: {} ({})", item, url);
            }
            let orphans = failure.orphan_ids();
            if !orphans.is_empty() {
                eprintln!(
                    "unpublished containers (expire within 24h): {}",
                    orphans.join(", ")
                );
            }
            Err(failure.into())
        }
    }
}
