//! In-memory document tree populated by one extraction attempt

use crate::error::ArchiveError;
use std::collections::{BTreeMap, BTreeSet};

/// Extracted archive content: absolute path -> bytes.
///
/// Paths always start with `/` and use `/` as separator. Directories are
/// created implicitly for every file, so entries may arrive in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTree {
    files: BTreeMap<String, Vec<u8>>,
    directories: BTreeSet<String>,
}

impl DocumentTree {
    /// Create an empty tree holding only the root directory
    pub fn new() -> Self {
        let mut directories = BTreeSet::new();
        directories.insert("/".to_string());
        Self {
            files: BTreeMap::new(),
            directories,
        }
    }

    /// Store a file, creating its parent directories
    pub fn insert_file(&mut self, path: &str, content: Vec<u8>) -> Result<(), ArchiveError> {
        let path = normalize_entry_name(path)?;
        if path == "/" {
            return Err(ArchiveError::Entry("file entry without a name".to_string()));
        }
        self.create_parents(&path);
        self.files.insert(path, content);
        Ok(())
    }

    /// Record a directory and its parents
    pub fn insert_dir(&mut self, path: &str) -> Result<(), ArchiveError> {
        let path = normalize_entry_name(path)?;
        self.create_parents(&path);
        self.directories.insert(path);
        Ok(())
    }

    fn create_parents(&mut self, path: &str) {
        let mut end = 0;
        while let Some(offset) = path[end + 1..].find('/') {
            end += offset + 1;
            self.directories.insert(path[..end].to_string());
        }
    }

    /// File bytes by path (leading `/` optional)
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        let key = absolute(path);
        self.files.get(key.as_str()).map(Vec::as_slice)
    }

    /// File content as UTF-8 text (lossy)
    pub fn read_to_string(&self, path: &str) -> Option<String> {
        self.get(path)
            .map(|bytes| String::from_utf8_lossy(strip_bom(bytes)).into_owned())
    }

    /// Whether a file exists at `path`
    pub fn contains_file(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Whether a directory exists at `path`
    pub fn contains_dir(&self, path: &str) -> bool {
        let key = absolute(path);
        self.directories.contains(key.trim_end_matches('/'))
            || (key == "/" && self.directories.contains("/"))
    }

    /// File paths in lexicographic order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Files in lexicographic path order
    pub fn files(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files
            .iter()
            .map(|(path, content)| (path.as_str(), content.as_slice()))
    }

    /// Consume the tree, yielding owned files
    pub fn into_files(self) -> impl Iterator<Item = (String, Vec<u8>)> {
        self.files.into_iter()
    }

    /// Number of files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Sum of all file sizes
    pub fn total_bytes(&self) -> u64 {
        self.files.values().map(|c| c.len() as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn absolute(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes)
}

/// Normalize a raw archive entry name into an absolute tree path.
///
/// Backslashes become `/`, empty and `.` segments are dropped. A `..`
/// segment is rejected because it would escape the archive root.
pub fn normalize_entry_name(name: &str) -> Result<String, ArchiveError> {
    let mut segments = Vec::new();
    for segment in name.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(ArchiveError::Entry(format!(
                    "entry escapes archive root: {}",
                    name
                )))
            }
            s => segments.push(s),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}
