//! Role- and tag-based tenant scope resolution.

use llmux_types::{
    CallerIdentity, GatewayError, Group, Organization, Result, TeamDirectory, TeamRole,
    TenantScope,
};
use std::sync::Arc;

/// Computes the set of tenants a caller may act on.
///
/// The scope is the union of two sources, role-derived first:
///
/// 1. role-derived — the caller's own team for members and leads, every team
///    in the owned group for group managers, every team in the owned
///    organization for org managers;
/// 2. tag-derived — tenant ids listed in the identity's free-form tags,
///    regardless of role.
///
/// Managers whose owned group or organization cannot be discovered (the
/// ownership record moved, or the directory is stale) degrade to the scope
/// of their own team's group or organization instead of failing outright.
pub struct ScopeResolver {
    directory: Arc<dyn TeamDirectory>,
}

impl ScopeResolver {
    #[must_use]
    pub fn new(directory: Arc<dyn TeamDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve the caller's tenant scope.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NoTenantScope`] when both sources come up
    /// empty; directory failures propagate as-is.
    pub async fn resolve(&self, identity: &CallerIdentity) -> Result<TenantScope> {
        let mut scope = TenantScope::new();

        match identity.team_role {
            TeamRole::Member | TeamRole::Lead => {
                if let Some(team_id) = &identity.team_id {
                    scope.push(team_id.clone());
                }
            }
            TeamRole::GroupManager => self.push_group_scope(identity, &mut scope).await?,
            TeamRole::OrgManager => self.push_org_scope(identity, &mut scope).await?,
        }

        for tenant in identity.tag_tenants() {
            scope.push(tenant);
        }

        if scope.is_empty() {
            return Err(GatewayError::NoTenantScope(identity.username.clone()));
        }
        tracing::debug!(
            user = %identity.username,
            role = %identity.team_role,
            tenants = scope.len(),
            "tenant scope resolved"
        );
        Ok(scope)
    }

    async fn push_group_scope(
        &self,
        identity: &CallerIdentity,
        scope: &mut TenantScope,
    ) -> Result<()> {
        let group_id = if let Some(group) = self.owned_group(identity).await? {
            Some(group.id)
        } else {
            // Ownership not discoverable; fall back to the home team's group.
            self.home_group_id(identity).await?
        };
        if let Some(group_id) = group_id {
            for team in self.directory.teams_in_group(&group_id).await? {
                scope.push(team.id);
            }
        }
        Ok(())
    }

    async fn push_org_scope(
        &self,
        identity: &CallerIdentity,
        scope: &mut TenantScope,
    ) -> Result<()> {
        let org_id = if let Some(org) = self.owned_organization(identity).await? {
            Some(org.id)
        } else {
            // Ownership not discoverable; fall back to the home team's org.
            self.home_organization_id(identity).await?
        };
        if let Some(org_id) = org_id {
            for group in self.directory.groups_in_organization(&org_id).await? {
                for team in self.directory.teams_in_group(&group.id).await? {
                    scope.push(team.id);
                }
            }
        }
        Ok(())
    }

    /// The group this identity owns: the home team's group when its owner
    /// matches, otherwise the first owner match in a scan of all groups.
    async fn owned_group(&self, identity: &CallerIdentity) -> Result<Option<Group>> {
        if let Some(group_id) = self.home_group_id(identity).await?
            && let Some(group) = self.directory.group(&group_id).await?
            && group.owner == identity.username
        {
            return Ok(Some(group));
        }
        for group in self.directory.groups().await? {
            if group.owner == identity.username {
                return Ok(Some(group));
            }
        }
        Ok(None)
    }

    /// The organization this identity owns, resolved like [`Self::owned_group`].
    async fn owned_organization(
        &self,
        identity: &CallerIdentity,
    ) -> Result<Option<Organization>> {
        if let Some(org_id) = self.home_organization_id(identity).await?
            && let Some(org) = self.directory.organization(&org_id).await?
            && org.owner == identity.username
        {
            return Ok(Some(org));
        }
        for org in self.directory.organizations().await? {
            if org.owner == identity.username {
                return Ok(Some(org));
            }
        }
        Ok(None)
    }

    async fn home_group_id(&self, identity: &CallerIdentity) -> Result<Option<String>> {
        let Some(team_id) = &identity.team_id else {
            return Ok(None);
        };
        Ok(self.directory.team(team_id).await?.map(|t| t.group_id))
    }

    async fn home_organization_id(&self, identity: &CallerIdentity) -> Result<Option<String>> {
        let Some(group_id) = self.home_group_id(identity).await? else {
            return Ok(None);
        };
        Ok(self
            .directory
            .group(&group_id)
            .await?
            .map(|g| g.organization_id))
    }
}
