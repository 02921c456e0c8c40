//! Append-only idea log
//!
//! The log is a JSON array of `{idea, timestamp}` records. Every append reads
//! the whole file, pushes one record and rewrites the file. There is no
//! locking; concurrent writers can lose records.

use super::{read_json, write_json, FileResult, StorageError};
use crate::models::Idea;
use std::path::{Path, PathBuf};

/// Flat-file store for submitted ideas
#[derive(Debug, Clone)]
pub struct IdeaStore {
    path: PathBuf,
}

impl IdeaStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new idea and return the stored record. The text is stored
    /// exactly as given; only all-whitespace text is rejected.
    pub fn append(&self, text: &str) -> FileResult<Idea> {
        if text.trim().is_empty() {
            return Err(StorageError::EmptyIdea);
        }

        let mut ideas = self.read_all()?;
        let idea = Idea::new(text);
        ideas.push(idea.clone());
        write_json(&self.path, &ideas)?;

        log::info!(
            "[IdeaStore] Stored idea #{} in {:?}",
            ideas.len(),
            self.path
        );
        Ok(idea)
    }

    /// Read every stored idea in insertion order. A missing log is empty.
    pub fn read_all(&self) -> FileResult<Vec<Idea>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_json(&self.path)
    }
}
