//! `carousel validate` – offline checks only.

use anyhow::Result;
use carousel_core::saga::validate_carousel;

use super::items_from_urls;

pub fn run_validate(caption: Option<&str>, urls: &[String]) -> Result<()> {
    let items = items_from_urls(urls);
    validate_carousel(&items, caption)?;
    let videos = items.iter().filter(|i| i.is_video).count();
    println!(
        "ok: {} items ({} image, {} video)",
        items.len(),
        items.len() - videos,
        videos
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_valid_carousel() {
        let list = urls(&["https://cdn.example.com/1.jpg", "https://cdn.example.com/2.mp4"]);
        assert!(run_validate(Some("hello"), &list).is_ok());
    }

    #[test]
    fn rejects_single_item() {
        let err = run_validate(None, &urls(&["https://cdn.example.com/1.jpg"])).unwrap_err();
        assert!(err.to_string().contains("between 2 and 10"));
    }
}
