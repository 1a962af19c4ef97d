//! Caller identity and tenant-scope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The caller's role within their team, as asserted by the (external)
/// authentication layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    Member,
    Lead,
    GroupManager,
    /// Organization-wide manager; the identity provider spells this "MMM".
    #[serde(alias = "mmm", alias = "MMM")]
    OrgManager,
}

impl fmt::Display for TeamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member => write!(f, "member"),
            Self::Lead => write!(f, "lead"),
            Self::GroupManager => write!(f, "group_manager"),
            Self::OrgManager => write!(f, "org_manager"),
        }
    }
}

impl std::str::FromStr for TeamRole {
    type Err = String;

    /// Parse a role name or well-known alias into a [`TeamRole`].
    ///
    /// # Errors
    ///
    /// Returns a descriptive message if the string does not match any known
    /// role name or alias.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "lead" => Ok(Self::Lead),
            "group_manager" | "group-manager" => Ok(Self::GroupManager),
            "org_manager" | "org-manager" | "organization_manager" | "mmm" | "MMM" => {
                Ok(Self::OrgManager)
            }
            other => Err(format!("unknown team role: {other}")),
        }
    }
}

/// A caller identity as delivered by the authentication boundary.
///
/// Read-only inside the gateway: scope resolution consumes it, nothing
/// mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub username: String,
    pub email: String,
    /// The caller's home team, when one is assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub team_role: TeamRole,
    /// Free-form tags from the identity provider; extra tenant grants may
    /// hide here as a string or an array of strings.
    #[serde(default)]
    pub free_form_tags: Value,
}

impl CallerIdentity {
    /// A member identity with no team and no tags.
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            team_id: None,
            team_role: TeamRole::Member,
            free_form_tags: Value::Null,
        }
    }

    /// Assign a home team and role.
    #[must_use]
    pub fn with_team(mut self, team_id: impl Into<String>, role: TeamRole) -> Self {
        self.team_id = Some(team_id.into());
        self.team_role = role;
        self
    }

    /// Attach free-form tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Value) -> Self {
        self.free_form_tags = tags;
        self
    }

    /// Tenant identifiers carried in the free-form tags.
    ///
    /// Accepts a single string, an array of strings, or a mixed array (in
    /// which non-string entries are skipped). Empty strings are ignored.
    #[must_use]
    pub fn tag_tenants(&self) -> Vec<String> {
        match &self.free_form_tags {
            Value::String(s) if !s.is_empty() => vec![s.clone()],
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// An ordered, deduplicated list of tenant identifiers.
///
/// Computed fresh per request; insertion order is preserved and the first
/// occurrence of a tenant wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantScope(Vec<String>);

impl TenantScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tenant unless it is already present.
    pub fn push(&mut self, tenant: impl Into<String>) {
        let tenant = tenant.into();
        if !self.0.contains(&tenant) {
            self.0.push(tenant);
        }
    }

    #[must_use]
    pub fn contains(&self, tenant: &str) -> bool {
        self.0.iter().any(|t| t == tenant)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for TenantScope {
    /// Deduplicates while preserving first-seen order.
    fn from(tenants: Vec<String>) -> Self {
        let mut scope = Self::new();
        for t in tenants {
            scope.push(t);
        }
        scope
    }
}

impl<'a> IntoIterator for &'a TenantScope {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
