//! In-memory directory backed by plain `HashMap`s.
//!
//! The directory is read-only once built, so no locking is involved. All
//! listing methods return entries sorted by id, which keeps scope resolution
//! deterministic.

use async_trait::async_trait;
use llmux_types::{Group, Organization, Result, Team, TeamDirectory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Serde shape for a directory file: organizations containing groups
/// containing team ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub organizations: Vec<OrganizationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationSpec {
    pub id: String,
    pub owner: String,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    pub id: String,
    pub owner: String,
    #[serde(default)]
    pub teams: Vec<String>,
}

/// An in-memory [`TeamDirectory`] implementation for tests, the CLI, and
/// embedding.
#[derive(Default)]
pub struct InMemoryDirectory {
    teams: HashMap<String, Team>,
    groups: HashMap<String, Group>,
    organizations: HashMap<String, Organization>,
}

impl InMemoryDirectory {
    /// Creates a new empty in-memory directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a directory from a parsed [`Topology`].
    #[must_use]
    pub fn from_topology(topology: Topology) -> Self {
        let mut dir = Self::new();
        for org in topology.organizations {
            dir.insert_organization(Organization {
                id: org.id.clone(),
                owner: org.owner,
            });
            for group in org.groups {
                dir.insert_group(Group {
                    id: group.id.clone(),
                    organization_id: org.id.clone(),
                    owner: group.owner,
                });
                for team_id in group.teams {
                    dir.insert_team(Team {
                        id: team_id,
                        group_id: group.id.clone(),
                    });
                }
            }
        }
        dir
    }

    /// Parses a YAML topology string into a directory.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the YAML is invalid.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Yaml},
        };
        let topology: Topology = Figment::from(Yaml::string(yaml)).extract()?;
        Ok(Self::from_topology(topology))
    }

    /// Loads a YAML topology file into a directory.
    ///
    /// # Errors
    ///
    /// Returns a [`figment::Error`] if the file cannot be read or parsed.
    #[allow(clippy::result_large_err)]
    pub fn from_yaml_file(path: &Path) -> std::result::Result<Self, figment::Error> {
        use figment::{
            Figment,
            providers::{Format as _, Yaml},
        };
        let topology: Topology = Figment::from(Yaml::file(path)).extract()?;
        Ok(Self::from_topology(topology))
    }

    pub fn insert_team(&mut self, team: Team) {
        self.teams.insert(team.id.clone(), team);
    }

    pub fn insert_group(&mut self, group: Group) {
        self.groups.insert(group.id.clone(), group);
    }

    pub fn insert_organization(&mut self, organization: Organization) {
        self.organizations.insert(organization.id.clone(), organization);
    }
}

#[async_trait]
impl TeamDirectory for InMemoryDirectory {
    async fn team(&self, id: &str) -> Result<Option<Team>> {
        Ok(self.teams.get(id).cloned())
    }

    async fn group(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.groups.get(id).cloned())
    }

    async fn organization(&self, id: &str) -> Result<Option<Organization>> {
        Ok(self.organizations.get(id).cloned())
    }

    async fn teams_in_group(&self, group_id: &str) -> Result<Vec<Team>> {
        let mut teams: Vec<Team> = self
            .teams
            .values()
            .filter(|t| t.group_id == group_id)
            .cloned()
            .collect();
        teams.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(teams)
    }

    async fn groups_in_organization(&self, organization_id: &str) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .values()
            .filter(|g| g.organization_id == organization_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(groups)
    }

    async fn organizations(&self) -> Result<Vec<Organization>> {
        let mut orgs: Vec<Organization> = self.organizations.values().cloned().collect();
        orgs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(orgs)
    }
}
