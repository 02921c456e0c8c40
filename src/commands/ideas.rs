// Idea log commands

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::file_storage::ideas::IdeaStore;
use crate::models::Idea;

/// Every stored idea, oldest first
pub fn list_ideas(config: &AppConfig) -> Result<Vec<Idea>> {
    let store = IdeaStore::new(&config.storage.ideas_file);
    store
        .read_all()
        .with_context(|| format!("Failed to read idea log {:?}", store.path()))
}
