//! CLI command handlers, one file per command.

mod completions;
mod config;
mod publish;
mod validate;

use carousel_core::saga::CarouselItem;

pub use completions::run_completions;
pub use config::run_config;
pub use publish::{run_publish, PublishArgs};
pub use validate::run_validate;

/// Items in command-line order, video detected from the URL path.
pub(crate) fn items_from_urls(urls: &[String]) -> Vec<CarouselItem> {
    urls.iter().map(|u| CarouselItem::from_url(u)).collect()
}
