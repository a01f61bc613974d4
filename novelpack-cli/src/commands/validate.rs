//! Validate command implementation

use anyhow::{bail, Context, Result};
use novelpack_core::decoder::{validate_archive, ExtractOptions};

/// Check an archive against the EPUB layout rules
pub fn validate(input: &str, json: bool, options: ExtractOptions) -> Result<()> {
    let bytes = super::read_archive(input)?;
    let report = validate_archive(&bytes, &options)
        .with_context(|| format!("Failed to extract {}", input))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Strategy:  {}", report.strategy);
        println!("Files:     {}", report.file_count);
        println!("Documents: {}", report.content_documents);
        for entry in &report.leading_entries {
            println!(
                "  @{:<8} {} ({})",
                entry.offset,
                entry.name,
                if entry.is_stored() { "stored" } else { "compressed" }
            );
        }
    }

    let issues = report.issues();
    if issues.is_empty() {
        println!("Valid EPUB archive");
        return Ok(());
    }

    for issue in &issues {
        eprintln!("  - {}", issue);
    }
    bail!("Validation failed for {} ({} issues)", input, issues.len());
}
