//! JSON-backed child repository.
//!
//! Each child lives in its own directory under `<base>/children/`, discovered
//! by scanning, with the child document at `child.json` and account documents
//! under `accounts/`.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use super::connection::JsonConnection;
use crate::domain::models::child::Child;
use crate::storage::traits::ChildStorage;

#[derive(Clone)]
pub struct ChildRepository {
    connection: Arc<JsonConnection>,
}

impl ChildRepository {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self { connection }
    }

    fn child_path(&self, child_name: &str) -> Result<PathBuf> {
        Ok(self.connection.child_directory(child_name)?.join("child.json"))
    }
}

impl ChildStorage for ChildRepository {
    fn store_child(&self, child: &Child) -> Result<()> {
        debug!("Storing child: {}", child.name);
        self.connection.write_document(&self.child_path(&child.name)?, child)
    }

    fn get_child(&self, child_name: &str) -> Result<Option<Child>> {
        self.connection.read_document(&self.child_path(child_name)?)
    }

    fn list_children(&self) -> Result<Vec<Child>> {
        let directory = self.connection.children_directory();
        if !directory.exists() {
            return Ok(Vec::new());
        }
        let mut children = Vec::new();
        for dir_entry in fs::read_dir(&directory)? {
            let path = dir_entry?.path().join("child.json");
            if !path.exists() {
                continue;
            }
            match self.connection.read_document::<Child>(&path)? {
                Some(child) => children.push(child),
                None => warn!("Child document vanished while listing: {:?}", path),
            }
        }
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn update_child(&self, child: &Child) -> Result<()> {
        self.store_child(child)
    }

    fn delete_child(&self, child_name: &str) -> Result<bool> {
        // child_directory rejects names that map to an empty key, so this can
        // never resolve to the children root itself.
        let directory = self.connection.child_directory(child_name)?;
        if !directory.exists() {
            return Ok(false);
        }
        // Removing the directory takes the child's accounts with it.
        fs::remove_dir_all(&directory)
            .with_context(|| format!("Failed to delete child directory {:?}", directory))?;
        info!("Deleted child directory for: {}", child_name);
        Ok(true)
    }

    fn set_child_balance(
        &self,
        child_name: &str,
        balance: i64,
        calculated_at: NaiveDateTime,
    ) -> Result<()> {
        let mut child = self
            .get_child(child_name)?
            .ok_or_else(|| anyhow::anyhow!("Child not found: {}", child_name))?;
        child.current_balance = balance;
        child.calculated_at = calculated_at;
        self.store_child(&child)
    }
}
