/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Permission tiers granted to API-key principals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
    Delete,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Delete => "delete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            "delete" => Some(Permission::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations exposed by the database gateway
/// Each one declares the permission a principal must hold to run it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayOperation {
    Query,
    Count,
    Insert,
    Update,
    Delete,
    Aggregate,
    ListCollections,
    Stats,
}

impl GatewayOperation {
    pub fn required_permission(&self) -> Permission {
        match self {
            GatewayOperation::Query
            | GatewayOperation::Count
            | GatewayOperation::Aggregate
            | GatewayOperation::ListCollections
            | GatewayOperation::Stats => Permission::Read,
            GatewayOperation::Insert | GatewayOperation::Update => Permission::Write,
            GatewayOperation::Delete => Permission::Delete,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GatewayOperation::Query => "query",
            GatewayOperation::Count => "count",
            GatewayOperation::Insert => "insert",
            GatewayOperation::Update => "update",
            GatewayOperation::Delete => "delete",
            GatewayOperation::Aggregate => "aggregate",
            GatewayOperation::ListCollections => "collections",
            GatewayOperation::Stats => "stats",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_operations_need_read() {
        for op in [
            GatewayOperation::Query,
            GatewayOperation::Count,
            GatewayOperation::Aggregate,
            GatewayOperation::ListCollections,
            GatewayOperation::Stats,
        ] {
            assert_eq!(op.required_permission(), Permission::Read, "{}", op.name());
        }
    }

    #[test]
    fn write_and_delete_tiers() {
        assert_eq!(GatewayOperation::Insert.required_permission(), Permission::Write);
        assert_eq!(GatewayOperation::Update.required_permission(), Permission::Write);
        assert_eq!(GatewayOperation::Delete.required_permission(), Permission::Delete);
    }

    #[test]
    fn parses_permission_names() {
        assert_eq!(Permission::parse("READ"), Some(Permission::Read));
        assert_eq!(Permission::parse(" delete "), Some(Permission::Delete));
        assert_eq!(Permission::parse("admin"), None);
    }
}
