//! Commands and results for child operations.

use crate::domain::models::child::Child;

#[derive(Debug, Clone)]
pub struct CreateChildCommand {
    pub parent_name: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct CreateChildResult {
    pub child: Child,
}

#[derive(Debug, Clone)]
pub struct GetChildCommand {
    pub child_name: String,
}

#[derive(Debug, Clone)]
pub struct GetChildResult {
    pub child: Option<Child>,
}

#[derive(Debug, Clone)]
pub struct ListChildrenResult {
    pub children: Vec<Child>,
}

#[derive(Debug, Clone)]
pub struct DeleteChildCommand {
    pub child_name: String,
}

#[derive(Debug, Clone)]
pub struct DeleteChildResult {
    pub success_message: String,
}
