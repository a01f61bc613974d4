//! Inspect command implementation

use anyhow::{bail, Context, Result};
use novelpack_core::decoder::{read_documents, resolve_manifest, ExtractOptions, Extractor};
use rayon::prelude::*;
use serde::Serialize;

/// Archive summary output
#[derive(Serialize)]
struct ArchiveInfo {
    path: String,
    strategy: String,
    failed_strategies: Vec<String>,
    files: usize,
    decompressed_bytes: u64,
    package: String,
    documents: Vec<DocumentInfo>,
}

#[derive(Serialize)]
struct DocumentInfo {
    path: String,
    title: Option<String>,
    paragraphs: usize,
}

/// Display the structure of one or more archives
pub fn inspect(inputs: &[String], json: bool, options: ExtractOptions) -> Result<()> {
    let extractor = Extractor::new(&options);

    // One extraction per archive; results keep input order
    let results: Vec<Result<ArchiveInfo>> = inputs
        .par_iter()
        .map(|input| inspect_one(&extractor, input))
        .collect();

    let mut infos = Vec::new();
    let mut errors = 0;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(info) => infos.push(info),
            Err(e) => {
                errors += 1;
                eprintln!("{}: {:#}", input, e);
            }
        }
    }

    if json {
        if let [info] = infos.as_slice() {
            println!("{}", serde_json::to_string_pretty(info)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
    } else {
        for info in &infos {
            print_info(info);
        }
    }

    if errors > 0 {
        bail!("Failed to inspect {} of {} archives", errors, inputs.len());
    }

    Ok(())
}

fn inspect_one(extractor: &Extractor, input: &str) -> Result<ArchiveInfo> {
    let bytes = super::read_archive(input)?;
    let extraction = extractor
        .extract_reporting(&bytes)
        .with_context(|| format!("Failed to extract {}", input))?;
    let tree = &extraction.tree;

    let manifest = resolve_manifest(tree).with_context(|| format!("Failed to resolve {}", input))?;
    let documents = read_documents(tree)?
        .into_iter()
        .map(|doc| DocumentInfo {
            path: doc.path,
            title: doc.title,
            paragraphs: doc.paragraphs.len(),
        })
        .collect();

    tracing::debug!("Inspected {} with strategy '{}'", input, extraction.strategy);

    Ok(ArchiveInfo {
        path: input.to_string(),
        strategy: extraction.strategy.clone(),
        failed_strategies: extraction
            .failures
            .iter()
            .map(|f| f.strategy.clone())
            .collect(),
        files: tree.file_count(),
        decompressed_bytes: tree.total_bytes(),
        package: manifest.package_path,
        documents,
    })
}

fn print_info(info: &ArchiveInfo) {
    println!("Archive:     {}", info.path);
    println!("Strategy:    {}", info.strategy);
    if !info.failed_strategies.is_empty() {
        println!("Fell back:   {}", info.failed_strategies.join(", "));
    }
    println!("Files:       {}", info.files);
    println!("Size:        {} bytes", info.decompressed_bytes);
    println!("Package:     {}", info.package);
    println!("Documents:   {}", info.documents.len());
    for doc in &info.documents {
        match &doc.title {
            Some(title) => println!("  {} ({}, {} paragraphs)", doc.path, title, doc.paragraphs),
            None => println!("  {} ({} paragraphs)", doc.path, doc.paragraphs),
        }
    }
}
