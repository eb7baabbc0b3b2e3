//! Input checks run once, before any remote call.

use super::CarouselItem;
use crate::retry::ClassifiedError;

pub const MIN_ITEMS: usize = 2;
pub const MAX_ITEMS: usize = 10;
pub const MAX_CAPTION_CHARS: usize = 2_200;
pub const MAX_HASHTAGS: usize = 30;

/// Reject carousels the platform would refuse: item count outside
/// `[MIN_ITEMS, MAX_ITEMS]`, media URLs that are not absolute http(s), and
/// captions over the length or hashtag limit. Item numbers in messages are 1-based.
pub fn validate_carousel(
    items: &[CarouselItem],
    caption: Option<&str>,
) -> Result<(), ClassifiedError> {
    if items.len() < MIN_ITEMS || items.len() > MAX_ITEMS {
        return Err(ClassifiedError::Validation(format!(
            "a carousel needs between {} and {} items, got {}",
            MIN_ITEMS,
            MAX_ITEMS,
            items.len()
        )));
    }

    for (index, item) in items.iter().enumerate() {
        validate_media_url(&item.image_url).map_err(|reason| {
            ClassifiedError::Validation(format!("item {}: {}", index + 1, reason))
        })?;
    }

    if let Some(caption) = caption {
        let chars = caption.chars().count();
        if chars > MAX_CAPTION_CHARS {
            return Err(ClassifiedError::Validation(format!(
                "caption is {} characters, limit is {}",
                chars, MAX_CAPTION_CHARS
            )));
        }
        let hashtags = count_hashtags(caption);
        if hashtags > MAX_HASHTAGS {
            return Err(ClassifiedError::Validation(format!(
                "caption has {} hashtags, limit is {}",
                hashtags, MAX_HASHTAGS
            )));
        }
    }

    Ok(())
}

fn validate_media_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid media URL {:?}: {}", raw, e))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("media URL must be http(s), got {}", other)),
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(format!("media URL has no host: {}", raw));
    }
    Ok(())
}

fn count_hashtags(caption: &str) -> usize {
    caption
        .split_whitespace()
        .filter(|word| word.starts_with('#') && word.chars().nth(1).map_or(false, |c| c != '#'))
        .count()
}
