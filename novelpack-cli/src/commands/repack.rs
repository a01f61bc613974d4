//! Repack command implementation

use anyhow::{Context, Result};
use novelpack_core::decoder::{repack as repack_tree, ExtractOptions, Extractor};
use novelpack_core::encoder::write_atomically;
use std::io::Write;

/// Rewrite an archive with its entries in EPUB order
pub fn repack(input: &str, output: &str, options: ExtractOptions) -> Result<()> {
    let pb = super::spinner()?;

    pb.set_message("Extracting...");
    let bytes = super::read_archive(input)?;
    let extraction = Extractor::new(&options)
        .extract_reporting(&bytes)
        .with_context(|| format!("Failed to extract {}", input))?;

    pb.set_message("Repacking...");
    let mut entries = 0usize;
    let repacked = repack_tree(&extraction.tree, |_, content| {
        entries += 1;
        content
    })?;
    write_atomically(output, |file| file.write_all(&repacked))
        .with_context(|| format!("Failed to create output file: {}", output))?;

    tracing::info!(
        "Repacked {} entries from {} (read with '{}')",
        entries,
        input,
        extraction.strategy
    );
    pb.finish_with_message(format!("Repacked {} -> {}", input, output));

    Ok(())
}
