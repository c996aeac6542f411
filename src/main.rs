//! auth0-reconcile command line.
//!
//! Reads provider settings from a TOML file (credentials may come from the
//! `AUTH0_*` environment variables instead) and runs one operation against
//! the management API. Results are printed as pretty JSON on stdout.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use auth0_reconcile::config::{config_from_env, load_config};
use auth0_reconcile::management::{ApiRequest, ClientGrantRequest, ClientRequest, UserRequest};
use auth0_reconcile::observability::init_logging;
use auth0_reconcile::{DesiredState, ManagementClient, Reconciler, ResourceKind};

#[derive(Parser)]
#[command(name = "auth0-reconcile")]
#[command(about = "Reconcile users, clients, APIs and client grants with Auth0", long_about = None)]
struct Cli {
    /// Provider configuration file. Without it, settings come from the environment.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a resource by id
    Get { kind: ResourceKind, id: String },
    /// Adopt an existing resource known only by its id
    Import { kind: ResourceKind, id: String },
    /// Delete a resource; already-absent resources succeed
    Delete { kind: ResourceKind, id: String },
    /// Look a client grant up by client id and audience
    Grant { client_id: String, audience: String },
    /// Create or update a resource from a desired-state file
    Apply {
        kind: ResourceKind,
        /// TOML file with the desired fields
        #[arg(short, long)]
        desired: PathBuf,
        /// Id of the resource if it already exists
        #[arg(long)]
        id: Option<String>,
        /// Send the create with an idempotency key so it may be retried
        #[arg(long)]
        idempotent: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => config_from_env()?,
    };
    init_logging(&config.observability)?;

    tracing::info!(domain = %config.domain, "auth0-reconcile v{} starting", env!("CARGO_PKG_VERSION"));

    let reconciler = Reconciler::new(ManagementClient::connect(&config).await?);

    match cli.command {
        Commands::Get { kind, id } => print_json(&reconciler.read(kind, &id, None).await?)?,
        Commands::Import { kind, id } => {
            let state = reconciler.import(kind, &id).await?;
            if state.is_none() {
                return Err(format!("{} '{}' does not exist", kind, id).into());
            }
            print_json(&state)?
        }
        Commands::Delete { kind, id } => {
            reconciler.delete(kind, &id).await?;
            print_json(&serde_json::json!({"deleted": {"kind": kind, "id": id}}))?
        }
        Commands::Grant { client_id, audience } => {
            print_json(&reconciler.client().find_grant(&client_id, &audience).await?)?
        }
        Commands::Apply {
            kind,
            desired,
            id,
            idempotent,
        } => {
            let desired = read_desired(kind, &desired)?;
            let reconciler = if idempotent {
                reconciler.with_idempotent_creates()
            } else {
                reconciler
            };
            let outcome = reconciler.reconcile(kind, id.as_deref(), Some(&desired)).await?;
            print_json(&outcome)?
        }
    }

    Ok(())
}

fn read_desired(kind: ResourceKind, path: &Path) -> Result<DesiredState, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    let desired = match kind {
        ResourceKind::User => DesiredState::User(toml::from_str::<UserRequest>(&text)?),
        ResourceKind::Client => DesiredState::Client(toml::from_str::<ClientRequest>(&text)?),
        ResourceKind::Api => DesiredState::Api(toml::from_str::<ApiRequest>(&text)?),
        ResourceKind::ClientGrant => DesiredState::ClientGrant(toml::from_str::<ClientGrantRequest>(&text)?),
    };
    Ok(desired)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
