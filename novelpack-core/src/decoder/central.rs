//! Strict extraction through the ZIP central directory

use super::{BombGuard, DocumentTree, ExtractStrategy};
use crate::error::ArchiveError;
use std::io::Cursor;

/// Reads entries as listed by the central directory.
///
/// Fails on anything the `zip` crate rejects: missing end-of-central-directory
/// record, bad offsets, CRC mismatches.
#[derive(Debug, Clone, Copy, Default)]
pub struct CentralDirectoryStrategy;

impl ExtractStrategy for CentralDirectoryStrategy {
    fn name(&self) -> &str {
        "central-directory"
    }

    fn extract(&self, bytes: &[u8], guard: &mut BombGuard) -> Result<DocumentTree, ArchiveError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut tree = DocumentTree::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            if file.is_dir() {
                tree.insert_dir(&name)?;
                continue;
            }

            let content = guard.copy_guarded(&mut file)?;
            tree.insert_file(&name, content)?;
        }

        Ok(tree)
    }
}
