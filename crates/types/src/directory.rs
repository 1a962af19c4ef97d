//! Organizational directory records.
//!
//! The org → group → team topology lives in an external system; these are
//! the read-only shapes the [`crate::TeamDirectory`] trait hands back.

use serde::{Deserialize, Serialize};

/// A team: the unit of tenancy. Team ids double as tenant ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub group_id: String,
}

/// A group of teams with a single managing owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub organization_id: String,
    /// Username of the group manager; matched against
    /// `CallerIdentity::username` during scope elevation.
    pub owner: String,
}

/// An organization of groups with a single managing owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    pub owner: String,
}
