//! Shared types for refdoc
//!
//! This crate provides the bibliographic record types that documents cite,
//! together with the read-only lookup interface the core resolves citations
//! against.

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A single author of a reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub full_name: String,
}

impl Author {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
}

/// Bibliographic record owned by the reference library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Library identifier, the key citation references point at
    pub id: String,

    /// Key emitted in exported citations (`@key`) and BibTeX stanzas
    pub citation_key: String,

    pub title: String,

    #[serde(default)]
    pub authors: Vec<Author>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<NaiveDate>,
}

impl Reference {
    pub fn new(
        id: impl Into<String>,
        citation_key: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            citation_key: citation_key.into(),
            title: title.into(),
            authors: Vec::new(),
            published_date: None,
        }
    }

    pub fn with_author(mut self, full_name: impl Into<String>) -> Self {
        self.authors.push(Author::new(full_name));
        self
    }

    pub fn with_published_date(mut self, date: NaiveDate) -> Self {
        self.published_date = Some(date);
        self
    }
}

/// Read-only lookup of references by id.
///
/// Resolution failure is an expected outcome: callers render a sentinel
/// instead of failing.
pub trait ReferenceStore {
    fn get(&self, id: &str) -> Option<&Reference>;
}

impl ReferenceStore for HashMap<String, Reference> {
    fn get(&self, id: &str) -> Option<&Reference> {
        HashMap::get(self, id)
    }
}

impl<T: ReferenceStore + ?Sized> ReferenceStore for &T {
    fn get(&self, id: &str) -> Option<&Reference> {
        (**self).get(id)
    }
}

impl<T: ReferenceStore + ?Sized> ReferenceStore for Arc<T> {
    fn get(&self, id: &str) -> Option<&Reference> {
        (**self).get(id)
    }
}

/// In-memory reference library preserving insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Reference>", into = "Vec<Reference>")]
pub struct ReferenceLibrary {
    entries: Vec<Reference>,
    index: HashMap<String, usize>,
}

impl ReferenceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a reference, replacing any existing entry with the same id
    /// in place. Returns the replaced entry.
    pub fn insert(&mut self, reference: Reference) -> Option<Reference> {
        match self.index.get(&reference.id) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], reference)),
            None => {
                self.index.insert(reference.id.clone(), self.entries.len());
                self.entries.push(reference);
                None
            }
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<Reference> {
        let pos = self.index.remove(id)?;
        let removed = self.entries.remove(pos);
        for slot in self.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn extend(&mut self, other: ReferenceLibrary) {
        for reference in other.entries {
            self.insert(reference);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reference> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ReferenceStore for ReferenceLibrary {
    fn get(&self, id: &str) -> Option<&Reference> {
        self.index.get(id).map(|&pos| &self.entries[pos])
    }
}

impl FromIterator<Reference> for ReferenceLibrary {
    fn from_iter<I: IntoIterator<Item = Reference>>(iter: I) -> Self {
        let mut library = ReferenceLibrary::new();
        for reference in iter {
            library.insert(reference);
        }
        library
    }
}

impl From<Vec<Reference>> for ReferenceLibrary {
    fn from(entries: Vec<Reference>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<ReferenceLibrary> for Vec<Reference> {
    fn from(library: ReferenceLibrary) -> Self {
        library.entries
    }
}

/// Library shared between the ingestion side (writer) and exporters
/// (readers).
///
/// Readers take an immutable snapshot for the duration of a call; writers
/// publish a new version without disturbing snapshots already handed out.
#[derive(Debug, Clone, Default)]
pub struct SharedReferenceLibrary(Arc<RwLock<Arc<ReferenceLibrary>>>);

impl SharedReferenceLibrary {
    pub fn new(library: ReferenceLibrary) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(library))))
    }

    /// Consistent view of the library at this instant.
    pub fn snapshot(&self) -> Arc<ReferenceLibrary> {
        Arc::clone(&self.0.read())
    }

    /// Mutate the library; clones the current version if a snapshot of it
    /// is still alive.
    pub fn update<R>(&self, f: impl FnOnce(&mut ReferenceLibrary) -> R) -> R {
        let mut guard = self.0.write();
        f(Arc::make_mut(&mut guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str) -> Reference {
        Reference::new(id, format!("{id}-key"), format!("Title {id}"))
    }

    #[test]
    fn test_library_insert_replaces_in_place() {
        let mut library: ReferenceLibrary = vec![sample("a"), sample("b")].into();
        let replaced = library.insert(Reference::new("a", "new-key", "New"));

        assert_eq!(replaced.map(|r| r.citation_key), Some("a-key".to_string()));
        let keys: Vec<_> = library.iter().map(|r| r.citation_key.as_str()).collect();
        assert_eq!(keys, vec!["new-key", "b-key"]);
    }

    #[test]
    fn test_library_remove_reindexes() {
        let mut library: ReferenceLibrary = vec![sample("a"), sample("b"), sample("c")].into();
        assert!(library.remove("a").is_some());

        assert_eq!(library.len(), 2);
        assert_eq!(library.get("c").map(|r| r.title.as_str()), Some("Title c"));
        assert!(library.get("a").is_none());
    }

    #[test]
    fn test_reference_json_shape() {
        let json = r#"[{
            "id": "r1",
            "citation_key": "doe23",
            "title": "T",
            "authors": [{"full_name": "J Doe"}],
            "published_date": "2023-08-01"
        }]"#;

        let library: ReferenceLibrary = serde_json::from_str(json).unwrap();
        let reference = library.get("r1").unwrap();
        assert_eq!(reference.citation_key, "doe23");
        assert_eq!(reference.authors, vec![Author::new("J Doe")]);
        assert_eq!(
            reference.published_date,
            NaiveDate::from_ymd_opt(2023, 8, 1)
        );
    }

    #[test]
    fn test_snapshot_isolated_from_updates() {
        let shared = SharedReferenceLibrary::new(vec![sample("a")].into());
        let before = shared.snapshot();

        shared.update(|lib| {
            lib.insert(sample("b"));
        });

        assert_eq!(before.len(), 1);
        assert_eq!(shared.snapshot().len(), 2);
    }
}
