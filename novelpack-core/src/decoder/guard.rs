//! Decompression bomb guard
//!
//! Tracks the cumulative number of decompressed bytes produced during one
//! extraction attempt and fails once a ceiling is crossed. Entry sizes
//! declared by the archive are never trusted: data is copied in fixed-size
//! chunks and every chunk is counted before it is stored.

use crate::error::ArchiveError;
use std::io::{ErrorKind, Read};

/// Default ceiling for decompressed output (50 MiB)
pub const DEFAULT_MAX_DECOMPRESSED_BYTES: u64 = 50 * 1024 * 1024;

/// Chunk size used when copying entry data
pub const GUARD_CHUNK_SIZE: usize = 4096;

/// Running-total limiter for one extraction attempt
#[derive(Debug)]
pub struct BombGuard {
    limit: u64,
    total: u64,
}

impl BombGuard {
    /// Create a guard with the given ceiling
    pub fn new(limit: u64) -> Self {
        Self { limit, total: 0 }
    }

    /// Record `n` freshly decompressed bytes
    pub fn accumulate(&mut self, n: u64) -> Result<(), ArchiveError> {
        let attempted = self.total.saturating_add(n);
        if attempted > self.limit {
            return Err(ArchiveError::LimitExceeded {
                limit: self.limit,
                attempted,
            });
        }
        self.total = attempted;
        Ok(())
    }

    /// Bytes accounted for so far
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Configured ceiling
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Read `reader` to the end, counting every chunk.
    ///
    /// The chunk that crosses the ceiling is rejected before it is appended.
    /// Growth is capped by the remaining budget, so the buffer's capacity
    /// never exceeds `limit`.
    pub fn copy_guarded<R: Read + ?Sized>(&mut self, reader: &mut R) -> Result<Vec<u8>, ArchiveError> {
        let mut content: Vec<u8> = Vec::new();
        let mut buffer = [0u8; GUARD_CHUNK_SIZE];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(ArchiveError::Entry(e.to_string())),
            };
            self.accumulate(read as u64)?;
            if content.capacity() - content.len() < read {
                let remaining = usize::try_from(self.limit - self.total).unwrap_or(usize::MAX);
                content.reserve_exact(read + content.len().min(remaining));
            }
            content.extend_from_slice(&buffer[..read]);
        }
        Ok(content)
    }
}

impl Default for BombGuard {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DECOMPRESSED_BYTES)
    }
}
