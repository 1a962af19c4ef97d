//! Scope-checked inference dispatch.

use crate::Gateway;
use llmux_translate::trim_messages;
use llmux_types::{
    CallerIdentity, ChatRequest, ChatResponse, Deployment, GatewayError, Result, TenantScope,
};

impl Gateway {
    /// Run a chat inference against a deployment the caller can reach.
    ///
    /// The deployment is located by listing every tenant in the caller's
    /// scope. When it is not there, the remaining credentialed tenants are
    /// probed so the caller gets "denied" for a deployment that exists
    /// outside their scope and "not found" for one that exists nowhere.
    /// The conversation is trimmed to the target model's message budget
    /// before dispatch.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::DeploymentAccessDenied`] or
    /// [`GatewayError::DeploymentNotFound`] as above, plus whatever the
    /// protocol dispatch itself raises.
    pub async fn run_inference(
        &self,
        identity: &CallerIdentity,
        deployment_id: &str,
        mut request: ChatRequest,
    ) -> Result<ChatResponse> {
        let scope = self.resolver.resolve(identity).await?;

        let Some((tenant, deployment)) = self.locate_in_scope(&scope, deployment_id).await? else {
            if self.exists_outside_scope(&scope, deployment_id).await? {
                return Err(GatewayError::DeploymentAccessDenied(format!(
                    "deployment {deployment_id} exists but is outside the caller's scope"
                )));
            }
            return Err(GatewayError::DeploymentNotFound(deployment_id.to_string()));
        };

        let model = deployment.model_name().unwrap_or_default();
        let before = request.messages.len();
        request.messages = trim_messages(std::mem::take(&mut request.messages), &model);
        if request.messages.len() < before {
            tracing::debug!(
                dropped = before - request.messages.len(),
                model = %model,
                "trimmed conversation to model budget"
            );
        }

        tracing::info!(
            user = %identity.username,
            tenant = %tenant,
            deployment = %deployment_id,
            "running inference"
        );
        self.inference.run_inference(&tenant, &deployment, request).await
    }

    /// Find a deployment in the caller's scope via the aggregated listing.
    async fn locate_in_scope(
        &self,
        scope: &TenantScope,
        deployment_id: &str,
    ) -> Result<Option<(String, Deployment)>> {
        let listing = self.aggregator.list_all(scope).await?;
        for (tenant, deployments) in &listing.by_tenant {
            if let Some(deployment) = deployments.iter().find(|d| d.id == deployment_id) {
                return Ok(Some((tenant.clone(), deployment.clone())));
            }
        }
        Ok(None)
    }

    /// Whether any credentialed tenant outside the scope has the deployment.
    /// Probe failures are treated as misses.
    async fn exists_outside_scope(&self, scope: &TenantScope, deployment_id: &str) -> Result<bool> {
        let credentialed = self.credentials.tenant_ids().await?;
        for tenant in credentialed.iter().filter(|t| !scope.contains(t)) {
            match self.api.get_deployment(tenant, deployment_id).await {
                Ok(_) => return Ok(true),
                Err(error) => {
                    tracing::debug!(tenant = %tenant, %error, "ownership probe miss");
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{FakeDeploymentApi, FakeInference, deployment, gateway};
    use llmux_types::{CallerIdentity, ChatMessage, ChatRequest, GatewayError, TeamRole};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn member_of_team_a() -> CallerIdentity {
        CallerIdentity::new("ada", "ada@example.com").with_team("team-a", TeamRole::Member)
    }

    fn request_with(turns: usize) -> ChatRequest {
        ChatRequest {
            messages: (0..turns)
                .map(|i| ChatMessage::text("user", format!("turn {i}")))
                .collect(),
            ..ChatRequest::default()
        }
    }

    fn split_listings() -> HashMap<String, Vec<llmux_types::Deployment>> {
        HashMap::from([
            ("team-a".into(), vec![deployment("d-a", Some("gpt-4o"))]),
            ("team-b".into(), vec![deployment("d-b", Some("gpt-4o"))]),
        ])
    }

    #[tokio::test]
    async fn test_runs_against_own_team_deployment() {
        let api = Arc::new(FakeDeploymentApi::with_listings(split_listings()));
        let inference = Arc::new(FakeInference::default());
        let gw = gateway(api, inference.clone());

        let res = gw
            .run_inference(&member_of_team_a(), "d-a", request_with(2))
            .await
            .unwrap();

        assert_eq!(res.first_text(), Some("ok"));
        let seen = inference.seen.lock().unwrap();
        assert_eq!(seen.as_slice(), [("team-a".to_string(), "d-a".to_string(), 2)]);
    }

    #[tokio::test]
    async fn test_group_manager_reaches_sibling_team() {
        let api = Arc::new(FakeDeploymentApi::with_listings(split_listings()));
        let inference = Arc::new(FakeInference::default());
        let gw = gateway(api, inference.clone());

        let manager = CallerIdentity::new("gaia", "gaia@example.com")
            .with_team("team-a", TeamRole::GroupManager);
        gw.run_inference(&manager, "d-b", request_with(1)).await.unwrap();

        let seen = inference.seen.lock().unwrap();
        assert_eq!(seen[0].0, "team-b");
    }

    #[tokio::test]
    async fn test_deployment_outside_scope_is_denied() {
        // d-b belongs to team-b, which ada's member scope does not include.
        let api = Arc::new(FakeDeploymentApi::with_listings(split_listings()));
        let gw = gateway(api, Arc::new(FakeInference::default()));

        let err = gw
            .run_inference(&member_of_team_a(), "d-b", request_with(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DeploymentAccessDenied(_)));
    }

    #[tokio::test]
    async fn test_unknown_deployment_is_not_found() {
        let api = Arc::new(FakeDeploymentApi::with_listings(split_listings()));
        let gw = gateway(api, Arc::new(FakeInference::default()));

        let err = gw
            .run_inference(&member_of_team_a(), "d-zzz", request_with(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DeploymentNotFound(_)));
    }

    #[tokio::test]
    async fn test_conversation_trimmed_before_dispatch() {
        // d-a's model carries no budget entry, so the default of 20 applies.
        let api = Arc::new(FakeDeploymentApi::with_listings(HashMap::from([(
            "team-a".into(),
            vec![deployment("d-a", None)],
        )])));
        let inference = Arc::new(FakeInference::default());
        let gw = gateway(api, inference.clone());

        gw.run_inference(&member_of_team_a(), "d-a", request_with(33))
            .await
            .unwrap();

        let seen = inference.seen.lock().unwrap();
        assert_eq!(seen[0].2, 20);
    }

    #[tokio::test]
    async fn test_own_tenant_outage_reads_as_not_found() {
        // team-a's listing fails, so its deployment is unreachable; the
        // outside-scope probe (team-b) does not know it either.
        let api = Arc::new(FakeDeploymentApi {
            listings: split_listings(),
            failing: vec!["team-a".into()],
            ..FakeDeploymentApi::default()
        });
        let gw = gateway(api, Arc::new(FakeInference::default()));

        let err = gw
            .run_inference(&member_of_team_a(), "d-a", request_with(1))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::DeploymentNotFound(_)));
    }
}
