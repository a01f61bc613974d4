//! Named output resources destined for an archive

use std::collections::BTreeMap;

/// A single file to be written into an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputResource {
    /// Archive entry name, relative (e.g. "OEBPS/content.opf")
    pub name: String,

    /// File content
    pub bytes: Vec<u8>,
}

impl OutputResource {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Flat, name-keyed set of output resources.
///
/// Iteration order carries no meaning; the archive writer imposes the
/// entry order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    resources: BTreeMap<String, Vec<u8>>,
}

impl ResourceSet {
    /// Create an empty resource set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, replacing any earlier one with the same name
    pub fn insert(&mut self, resource: OutputResource) {
        self.resources.insert(resource.name, resource.bytes);
    }

    /// Get resource bytes by name
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.resources.get(name).map(Vec::as_slice)
    }

    /// Whether a resource exists
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Iterate over all resources
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.resources
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
    }

    /// Number of resources in the set
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl FromIterator<OutputResource> for ResourceSet {
    fn from_iter<I: IntoIterator<Item = OutputResource>>(iter: I) -> Self {
        let mut set = ResourceSet::new();
        for resource in iter {
            set.insert(resource);
        }
        set
    }
}

impl IntoIterator for ResourceSet {
    type Item = OutputResource;
    type IntoIter = std::iter::Map<
        std::collections::btree_map::IntoIter<String, Vec<u8>>,
        fn((String, Vec<u8>)) -> OutputResource,
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.resources
            .into_iter()
            .map(entry_to_resource as fn((String, Vec<u8>)) -> OutputResource)
    }
}

fn entry_to_resource((name, bytes): (String, Vec<u8>)) -> OutputResource {
    OutputResource { name, bytes }
}
