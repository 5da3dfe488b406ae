//! Child management service.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::commands::child::{
    CreateChildCommand, CreateChildResult, DeleteChildCommand, DeleteChildResult, GetChildCommand,
    GetChildResult, ListChildrenResult,
};
use crate::domain::models::child::Child;
use crate::storage::json::{ChildRepository, JsonConnection, ParentRepository};
use crate::storage::traits::{ChildStorage, ParentStorage};

/// Service for managing children and their place in the ownership tree.
#[derive(Clone)]
pub struct ChildService {
    child_repository: ChildRepository,
    parent_repository: ParentRepository,
    clock: Arc<dyn Clock>,
}

impl ChildService {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self::with_clock(connection, Arc::new(SystemClock))
    }

    pub fn with_clock(connection: Arc<JsonConnection>, clock: Arc<dyn Clock>) -> Self {
        Self {
            child_repository: ChildRepository::new(connection.clone()),
            parent_repository: ParentRepository::new(connection),
            clock,
        }
    }

    /// Create a child under a parent. The balance snapshot starts at zero
    /// with `calculated_at` set to creation time, so the first accrual run
    /// measures elapsed periods from here.
    pub fn create_child(&self, command: CreateChildCommand) -> Result<CreateChildResult> {
        let name = command.name.trim().to_string();
        info!("Creating child {} under parent {}", name, command.parent_name);

        if name.is_empty() {
            return Err(anyhow::anyhow!("Child name cannot be empty"));
        }
        let mut parent = self
            .parent_repository
            .get_parent(&command.parent_name)?
            .ok_or_else(|| anyhow::anyhow!("Parent not found: {}", command.parent_name))?;
        if self.child_repository.get_child(&name)?.is_some() {
            return Err(anyhow::anyhow!("Child already exists: {}", name));
        }

        let now = self.clock.now();
        let child = Child {
            name,
            accounts: Vec::new(),
            current_balance: 0,
            calculated_at: now,
            created_at: now,
        };
        self.child_repository.store_child(&child)?;

        parent.children.push(child.name.clone());
        self.parent_repository.update_parent(&parent)?;

        info!("Created child: {}", child.name);
        Ok(CreateChildResult { child })
    }

    pub fn get_child(&self, command: GetChildCommand) -> Result<GetChildResult> {
        let child = self.child_repository.get_child(&command.child_name)?;
        if child.is_none() {
            warn!("Child not found: {}", command.child_name);
        }
        Ok(GetChildResult { child })
    }

    pub fn list_children(&self) -> Result<ListChildrenResult> {
        let children = self.child_repository.list_children()?;
        info!("Found {} children", children.len());
        Ok(ListChildrenResult { children })
    }

    /// Delete a child and cascade to all owned accounts. Once deleted, no
    /// further accrual can reference the child or its accounts.
    pub fn delete_child(&self, command: DeleteChildCommand) -> Result<DeleteChildResult> {
        info!("Deleting child: {}", command.child_name);

        let child = self
            .child_repository
            .get_child(&command.child_name)?
            .ok_or_else(|| anyhow::anyhow!("Child not found: {}", command.child_name))?;

        self.child_repository.delete_child(&child.name)?;

        // Detach from whichever parent listed this child.
        for mut parent in self.parent_repository.list_parents()? {
            if parent.children.iter().any(|c| c == &child.name) {
                parent.children.retain(|c| c != &child.name);
                self.parent_repository.update_parent(&parent)?;
            }
        }

        info!("Deleted child: {}", child.name);
        Ok(DeleteChildResult {
            success_message: format!("Child '{}' deleted successfully", child.name),
        })
    }
}
