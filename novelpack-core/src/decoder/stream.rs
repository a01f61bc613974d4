//! Lenient extraction by walking local file headers

use super::{BombGuard, DocumentTree, ExtractStrategy};
use crate::error::ArchiveError;
use std::io::Cursor;
use zip::result::ZipError;

const LOCAL_HEADER_SIGNATURE: &[u8; 4] = b"PK\x03\x04";

/// Whether another local header starts after the one at `offset`
fn header_follows(bytes: &[u8], offset: usize) -> bool {
    bytes
        .get(offset.saturating_add(1)..)
        .is_some_and(|rest| rest.windows(4).any(|w| w == LOCAL_HEADER_SIGNATURE))
}

/// Streams entries front to back from their local headers.
///
/// Never looks at the central directory, so archives with a damaged or
/// missing directory still decode. Once at least one entry has been read, a
/// truncated tail or junk where the next header should be ends the walk
/// instead of failing it, but only if no further local header follows.
/// A damaged header in the middle of the archive fails the attempt.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHeaderStrategy;

impl ExtractStrategy for LocalHeaderStrategy {
    fn name(&self) -> &str {
        "local-headers"
    }

    fn extract(&self, bytes: &[u8], guard: &mut BombGuard) -> Result<DocumentTree, ArchiveError> {
        let mut reader = Cursor::new(bytes);
        let mut tree = DocumentTree::new();
        let mut entries = 0usize;

        loop {
            let offset = reader.position() as usize;
            let mut file = match zip::read::read_zipfile_from_stream(&mut reader) {
                Ok(Some(file)) => file,
                Ok(None) => break,
                Err(err @ (ZipError::Io(_) | ZipError::InvalidArchive(_)))
                    if entries > 0 && !header_follows(bytes, offset) =>
                {
                    tracing::warn!(
                        "Stopping after {} entries at damaged archive tail: {}",
                        entries,
                        err
                    );
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            entries += 1;

            let name = file.name().to_string();
            if file.is_dir() {
                tree.insert_dir(&name)?;
                continue;
            }

            let content = guard.copy_guarded(&mut file)?;
            tree.insert_file(&name, content)?;
        }

        if entries == 0 {
            return Err(ArchiveError::Entry(
                "no local file headers found".to_string(),
            ));
        }

        Ok(tree)
    }
}
