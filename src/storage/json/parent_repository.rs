//! JSON-backed parent repository.

use anyhow::Result;
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::connection::JsonConnection;
use crate::domain::models::parent::Parent;
use crate::storage::traits::ParentStorage;

#[derive(Clone)]
pub struct ParentRepository {
    connection: Arc<JsonConnection>,
}

impl ParentRepository {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }

    fn parent_path(&self, parent_name: &str) -> Result<PathBuf> {
        Ok(self
            .connection
            .parents_directory()
            .join(format!("{}.json", JsonConnection::safe_key(parent_name)?)))
    }
}

impl ParentStorage for ParentRepository {
    fn store_parent(&self, parent: &Parent) -> Result<()> {
        debug!("Storing parent: {}", parent.name);
        self.connection
            .write_document(&self.parent_path(&parent.name)?, parent)
    }

    fn get_parent(&self, parent_name: &str) -> Result<Option<Parent>> {
        self.connection.read_document(&self.parent_path(parent_name)?)
    }

    fn list_parents(&self) -> Result<Vec<Parent>> {
        let directory = self.connection.parents_directory();
        if !directory.exists() {
            return Ok(Vec::new());
        }
        let mut parents = Vec::new();
        for dir_entry in fs::read_dir(&directory)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match self.connection.read_document::<Parent>(&path)? {
                Some(parent) => parents.push(parent),
                None => warn!("Parent document vanished while listing: {:?}", path),
            }
        }
        parents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(parents)
    }

    fn update_parent(&self, parent: &Parent) -> Result<()> {
        self.store_parent(parent)
    }

    fn delete_parent(&self, parent_name: &str) -> Result<bool> {
        debug!("Deleting parent: {}", parent_name);
        self.connection.delete_document(&self.parent_path(parent_name)?)
    }
}
