//! Parent management service.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::commands::parent::{
    CreateParentCommand, CreateParentResult, DeleteParentCommand, DeleteParentResult,
    GetParentCommand, GetParentResult, ListParentsResult,
};
use crate::domain::models::parent::Parent;
use crate::storage::json::{ChildRepository, JsonConnection, ParentRepository};
use crate::storage::traits::{ChildStorage, ParentStorage};

/// Service for managing parents, the top of the ownership tree.
#[derive(Clone)]
pub struct ParentService {
    parent_repository: ParentRepository,
    child_repository: ChildRepository,
    clock: Arc<dyn Clock>,
}

impl ParentService {
    pub fn new(connection: Arc<JsonConnection>) -> Self {
        Self::with_clock(connection, Arc::new(SystemClock))
    }

    pub fn with_clock(connection: Arc<JsonConnection>, clock: Arc<dyn Clock>) -> Self {
        Self {
            parent_repository: ParentRepository::new(connection.clone()),
            child_repository: ChildRepository::new(connection),
            clock,
        }
    }

    pub fn create_parent(&self, command: CreateParentCommand) -> Result<CreateParentResult> {
        let name = command.name.trim().to_string();
        info!("Creating parent: {}", name);

        if name.is_empty() {
            return Err(anyhow::anyhow!("Parent name cannot be empty"));
        }
        if self.parent_repository.get_parent(&name)?.is_some() {
            return Err(anyhow::anyhow!("Parent already exists: {}", name));
        }

        let parent = Parent {
            name,
            children: Vec::new(),
            created_at: self.clock.now(),
        };
        self.parent_repository.store_parent(&parent)?;

        info!("Created parent: {}", parent.name);
        Ok(CreateParentResult { parent })
    }

    pub fn get_parent(&self, command: GetParentCommand) -> Result<GetParentResult> {
        let parent = self.parent_repository.get_parent(&command.parent_name)?;
        if parent.is_none() {
            warn!("Parent not found: {}", command.parent_name);
        }
        Ok(GetParentResult { parent })
    }

    pub fn list_parents(&self) -> Result<ListParentsResult> {
        let parents = self.parent_repository.list_parents()?;
        info!("Found {} parents", parents.len());
        Ok(ListParentsResult { parents })
    }

    /// Delete a parent and cascade to all owned children (and their accounts).
    pub fn delete_parent(&self, command: DeleteParentCommand) -> Result<DeleteParentResult> {
        info!("Deleting parent: {}", command.parent_name);

        let parent = self
            .parent_repository
            .get_parent(&command.parent_name)?
            .ok_or_else(|| anyhow::anyhow!("Parent not found: {}", command.parent_name))?;

        for child_name in &parent.children {
            if !self.child_repository.delete_child(child_name)? {
                warn!("Child listed on parent but missing in storage: {}", child_name);
            }
        }
        self.parent_repository.delete_parent(&parent.name)?;

        info!(
            "Deleted parent {} and {} children",
            parent.name,
            parent.children.len()
        );
        Ok(DeleteParentResult {
            success_message: format!("Parent '{}' deleted successfully", parent.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn setup_test() -> (TempDir, ParentService) {
        let temp_dir = tempdir().unwrap();
        let connection = Arc::new(JsonConnection::new(temp_dir.path()).unwrap());
        (temp_dir, ParentService::new(connection))
    }

    #[test]
    fn test_create_and_get_parent() {
        let (_dir, service) = setup_test();

        let result = service
            .create_parent(CreateParentCommand {
                name: "Sam".to_string(),
            })
            .expect("Failed to create parent");
        assert_eq!(result.parent.name, "Sam");
        assert!(result.parent.children.is_empty());

        let fetched = service
            .get_parent(GetParentCommand {
                parent_name: "Sam".to_string(),
            })
            .unwrap();
        assert_eq!(fetched.parent.unwrap().name, "Sam");
    }

    #[test]
    fn test_create_duplicate_parent_rejected() {
        let (_dir, service) = setup_test();
        service
            .create_parent(CreateParentCommand {
                name: "Sam".to_string(),
            })
            .unwrap();
        let result = service.create_parent(CreateParentCommand {
            name: "Sam".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let (_dir, service) = setup_test();
        let result = service.create_parent(CreateParentCommand {
            name: "   ".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_list_parents_sorted() {
        let (_dir, service) = setup_test();
        for name in ["Robin", "Alex"] {
            service
                .create_parent(CreateParentCommand {
                    name: name.to_string(),
                })
                .unwrap();
        }
        let names: Vec<String> = service
            .list_parents()
            .unwrap()
            .parents
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Alex".to_string(), "Robin".to_string()]);
    }

    #[test]
    fn test_delete_missing_parent_is_error() {
        let (_dir, service) = setup_test();
        let result = service.delete_parent(DeleteParentCommand {
            parent_name: "Nobody".to_string(),
        });
        assert!(result.is_err());
    }
}
