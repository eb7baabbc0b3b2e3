//! `carousel config` – show where configuration lives and what is in effect.

use anyhow::{Context, Result};
use carousel_core::config::CarouselConfig;
use std::path::Path;

pub fn run_config(cfg: &CarouselConfig, path: &Path) -> Result<()> {
    let rendered = toml::to_string_pretty(cfg).context("rendering config")?;
    println!("# {}", path.display());
    print!("{}", rendered);
    Ok(())
}
