use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use llmux_config::Settings;
use llmux_gateway::Gateway;
use llmux_types::{CallerIdentity, ChatMessage, ChatRequest, TeamRole};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "llmux", about = "llmux — multi-tenant LLM inference gateway")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    identity: IdentityArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Who is calling. Scope resolution works from these fields alone.
#[derive(Args, Debug)]
struct IdentityArgs {
    /// Caller username (matched against group / organization owners).
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Caller email.
    #[arg(long, global = true, default_value = "local@localhost")]
    email: String,

    /// Home team id.
    #[arg(long, global = true)]
    team: Option<String>,

    /// Team role: member / lead / group_manager / org_manager.
    #[arg(long, global = true, default_value = "member")]
    role: String,

    /// Extra tenant grant, repeatable.
    #[arg(long = "tenant-tag", global = true, value_name = "TENANT")]
    tenant_tags: Vec<String>,
}

impl IdentityArgs {
    fn build(&self) -> Result<CallerIdentity> {
        let role = self
            .role
            .parse::<TeamRole>()
            .map_err(|e| anyhow::anyhow!(e))?;
        let mut identity = CallerIdentity::new(&self.user, &self.email);
        if let Some(team) = &self.team {
            identity = identity.with_team(team, role);
        }
        if !self.tenant_tags.is_empty() {
            identity = identity.with_tags(serde_json::json!(self.tenant_tags));
        }
        Ok(identity)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the tenants the caller can act on.
    Tenants,
    /// List deployments across every tenant in scope.
    Deployments {
        /// Print the raw JSON listing.
        #[arg(long)]
        json: bool,
    },
    /// Run a chat inference against a deployment.
    Infer {
        /// Target deployment id.
        deployment: String,
        /// User prompt.
        prompt: String,
        /// Optional system prompt.
        #[arg(long)]
        system: Option<String>,
        /// Sampling temperature.
        #[arg(long)]
        temperature: Option<f64>,
        /// Completion token cap.
        #[arg(long)]
        max_tokens: Option<u32>,
    },
    /// Show one deployment's detail record.
    Show {
        /// Tenant owning the deployment.
        tenant: String,
        /// Deployment id.
        deployment: String,
    },
    /// Create a deployment under a tenant from a JSON body.
    Create {
        /// Target tenant.
        tenant: String,
        /// Request body, as inline JSON.
        #[arg(value_name = "JSON")]
        body: String,
        /// Create a configuration instead of a deployment.
        #[arg(long)]
        configuration: bool,
    },
    /// Patch a deployment under a tenant from a JSON body.
    Modify {
        /// Tenant owning the deployment.
        tenant: String,
        /// Deployment id.
        deployment: String,
        /// Request body, as inline JSON.
        #[arg(value_name = "JSON")]
        body: String,
    },
    /// Delete a deployment under a tenant.
    Delete {
        /// Tenant owning the deployment.
        tenant: String,
        /// Deployment id.
        deployment: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("config error: {e}"))?;
    let gateway = Gateway::from_settings(&settings)?;
    let identity = cli.identity.build()?;

    match cli.command {
        Commands::Tenants => cmd_tenants(&gateway, &identity).await,
        Commands::Deployments { json } => cmd_deployments(&gateway, &identity, json).await,
        Commands::Infer {
            deployment,
            prompt,
            system,
            temperature,
            max_tokens,
        } => cmd_infer(&gateway, &identity, &deployment, prompt, system, temperature, max_tokens).await,
        Commands::Show { tenant, deployment } => {
            let record = gateway.get_deployment(&identity, &tenant, &deployment).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Commands::Create {
            tenant,
            body,
            configuration,
        } => {
            let body = parse_body(&body)?;
            let receipt = if configuration {
                gateway.create_configuration(&identity, &tenant, body).await?
            } else {
                gateway.create_deployment(&identity, &tenant, body).await?
            };
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Commands::Modify {
            tenant,
            deployment,
            body,
        } => {
            let body = parse_body(&body)?;
            let receipt = gateway
                .modify_deployment(&identity, &tenant, &deployment, body)
                .await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
        Commands::Delete { tenant, deployment } => {
            let receipt = gateway.delete_deployment(&identity, &tenant, &deployment).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
    }
}

fn parse_body(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("invalid JSON body: {e}"))
}

async fn cmd_tenants(gateway: &Gateway, identity: &CallerIdentity) -> Result<()> {
    let scope = gateway.scope_for(identity).await?;
    for tenant in &scope {
        println!("{tenant}");
    }
    Ok(())
}

async fn cmd_deployments(gateway: &Gateway, identity: &CallerIdentity, json: bool) -> Result<()> {
    let listing = gateway.list_deployments(identity).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }
    for (tenant, deployments) in &listing.by_tenant {
        println!("{tenant}:");
        for d in deployments {
            println!(
                "  {}  {}  {}  {}",
                d.id,
                d.status.as_deref().unwrap_or("-"),
                d.model_name().unwrap_or_else(|| "-".into()),
                d.deployment_url.as_deref().unwrap_or("-"),
            );
        }
    }
    eprintln!(
        "{} deployments across {} tenants",
        listing.count,
        listing.by_tenant.len()
    );
    Ok(())
}

async fn cmd_infer(
    gateway: &Gateway,
    identity: &CallerIdentity,
    deployment: &str,
    prompt: String,
    system: Option<String>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
) -> Result<()> {
    let mut messages = Vec::new();
    if let Some(system) = system {
        messages.push(ChatMessage::text("system", system));
    }
    messages.push(ChatMessage::text("user", prompt));

    let request = ChatRequest {
        messages,
        max_tokens,
        temperature,
        top_p: None,
        stream: None,
    };
    let response = gateway.run_inference(identity, deployment, request).await?;

    match response.first_text() {
        Some(text) => println!("{text}"),
        None => println!("{}", serde_json::to_string_pretty(&response)?),
    }
    if response.usage.total_tokens > 0 {
        eprintln!(
            "[{} prompt + {} completion = {} tokens]",
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        );
    }
    Ok(())
}
