use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// A permission role assignable to users.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Role {
    pub id: String,
    pub name: String,
    /// RGB display color.
    pub color: i32,
    /// Permission bitmask.
    pub permissions: i64,
    /// Ordering within the role list; higher outranks lower.
    pub position: i32,
}

impl Role {
    /// Placeholder for a role id that resolves to nothing; carries no
    /// permissions.
    pub fn unknown_placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: "*UnknownRole".to_string(),
            color: 0,
            permissions: 0,
            position: 0,
        }
    }
}
