use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use rolegate::config::{load_env, Config};
use rolegate::db::{self, SqliteStore};
use rolegate::rbac::{self, Permission, RbacStore, Role};

#[derive(Parser, Debug)]
#[command(author, version, about = "rolegate role and permission admin tool", long_about = None)]
struct Cli {
    /// Log record creation and other details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    Migrate,
    /// Sync role and permission names between code and database
    Sync,
    /// Print every role with the permissions it grants
    Catalog,
    /// Give a user its role; a user holds exactly one role
    AssignRole { user_id: Uuid, role: String },
    /// Check whether a user holds a permission
    Can { user_id: Uuid, permission: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    let cli = Cli::parse();
    rolegate::logging::init_tracing("info", cli.verbose)?;

    match cli.command {
        Commands::Catalog => print_catalog(),
        Commands::Migrate => {
            let pool = open_pool().await?;
            db::migrate(&pool).await?;
            println!("Migrations applied");
        }
        Commands::Sync => {
            let store = Arc::new(SqliteStore::new(open_pool().await?));
            rbac::sync_roles_and_permissions(store)
                .await
                .context("failed to sync roles and permissions")?;
            println!("Roles and permissions successfully synced.");
        }
        Commands::AssignRole { user_id, role } => {
            let role: Role = role.parse()?;
            let store = SqliteStore::new(open_pool().await?);
            rbac::assign_role_to_user(&store, user_id, role).await?;
            println!("Assigned role {role} to user {user_id}");
        }
        Commands::Can { user_id, permission } => {
            let permission: Permission = permission.parse()?;
            let store = SqliteStore::new(open_pool().await?);
            let allowed = store.user_has_permission(user_id, permission.name()).await?;
            println!("{}", if allowed { "allowed" } else { "denied" });
        }
    }

    Ok(())
}

async fn open_pool() -> anyhow::Result<sqlx::SqlitePool> {
    let config = Config::from_env()?;
    db::connect(&config).await
}

fn print_catalog() {
    for role in Role::ALL {
        let names: Vec<&str> = role.permissions().iter().map(|p| p.name()).collect();
        println!("{:<8} {}", role.name(), names.join(", "));
    }
}
