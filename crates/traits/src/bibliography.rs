//! Bibliography store contract.

use crate::style::ResourceError;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::RwLock;

/// One citable record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibRecord {
    /// Citation key, e.g. `knuth1984`.
    pub key: String,
    pub authors: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub venue: Option<String>,
}

impl BibRecord {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            authors: Vec::new(),
            title: title.into(),
            year: None,
            venue: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }
}

/// Read access to the records a document may cite, by position.
pub trait Bibliography: Send + Sync + Debug {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<BibRecord>;

    /// Returns a human-readable name for this store (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A bibliography held in memory.
#[derive(Debug, Default)]
pub struct InMemoryBibliography {
    records: RwLock<Vec<BibRecord>>,
}

impl InMemoryBibliography {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<BibRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Appends a record and returns its index.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::Poisoned` if the internal lock is poisoned.
    pub fn add(&self, record: BibRecord) -> Result<usize, ResourceError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| ResourceError::Poisoned(record.key.clone()))?;
        records.push(record);
        Ok(records.len() - 1)
    }
}

impl Bibliography for InMemoryBibliography {
    fn len(&self) -> usize {
        self.records.read().map(|r| r.len()).unwrap_or(0)
    }

    fn get(&self, index: usize) -> Option<BibRecord> {
        self.records.read().ok()?.get(index).cloned()
    }

    fn name(&self) -> &'static str {
        "InMemoryBibliography"
    }
}
