//! Commands and results for parent operations.

use crate::domain::models::parent::Parent;

#[derive(Debug, Clone)]
pub struct CreateParentCommand {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CreateParentResult {
    pub parent: Parent,
}

#[derive(Debug, Clone)]
pub struct GetParentCommand {
    pub parent_name: String,
}

#[derive(Debug, Clone)]
pub struct GetParentResult {
    pub parent: Option<Parent>,
}

#[derive(Debug, Clone)]
pub struct ListParentsResult {
    pub parents: Vec<Parent>,
}

#[derive(Debug, Clone)]
pub struct DeleteParentCommand {
    pub parent_name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteParentResult {
    pub success_message: String,
}
