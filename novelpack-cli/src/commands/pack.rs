//! Pack command implementation

use anyhow::{Context, Result};
use novelpack_core::encoder::write_atomically;
use novelpack_core::{Book, CompositionMode, Encoder, EpubEncoder};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Package a JSON book model as an archive
pub fn pack(
    input: &str,
    output: Option<&str>,
    mode: CompositionMode,
    stylesheet: Option<&str>,
) -> Result<()> {
    let pb = super::spinner()?;

    pb.set_message("Reading book model...");
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to open input file: {}", input))?;
    let book = Book::from_json(&json).with_context(|| format!("Failed to parse {}", input))?;

    let mut encoder = EpubEncoder::new(mode);
    if let Some(path) = stylesheet {
        let css = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stylesheet: {}", path))?;
        encoder = encoder.with_stylesheet(css);
    }

    let output = match output {
        Some(path) => path.to_string(),
        None => Path::new(input)
            .with_extension(encoder.file_extension())
            .to_string_lossy()
            .into_owned(),
    };

    pb.set_message(format!("Packaging as {} ({})...", encoder.format_name(), mode));
    write_atomically(&output, |file| -> Result<()> {
        let mut writer = BufWriter::new(file);
        encoder.encode(&book, &mut writer)?;
        writer.flush()?;
        Ok(())
    })
    .with_context(|| format!("Failed to write {}", output))?;

    tracing::info!(
        "Packed {} episodes of '{}'",
        book.episode_count(),
        book.metadata.title.original
    );
    pb.finish_with_message(format!("Packed '{}' -> {}", book.metadata.title.original, output));

    Ok(())
}
