//! CLI command implementations

mod inspect;
mod pack;
mod repack;
mod validate;

pub use inspect::inspect;
pub use pack::pack;
pub use repack::repack;
pub use validate::validate;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use novelpack_core::{ExtractOptions, StrategyKind};
use std::time::Duration;

/// Build extraction options from command-line overrides
pub fn extract_options(max_size: Option<u64>, strategies: Vec<StrategyKind>) -> ExtractOptions {
    let mut options = ExtractOptions::default();
    if let Some(limit) = max_size {
        options = options.with_max_decompressed_bytes(limit);
    }
    if !strategies.is_empty() {
        options = options.with_strategies(strategies);
    }
    options
}

/// Read a whole archive into memory
fn read_archive(input: &str) -> Result<Vec<u8>> {
    std::fs::read(input).with_context(|| format!("Failed to open input file: {}", input))
}

/// Spinner shown while a single file is processed
fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}
