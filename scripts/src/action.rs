use clap::{Args, Parser, Subcommand};
use vet_clinic::{api, repo};

use crate::{config, utils};

#[derive(Args, Debug, Clone)]
pub struct RunMigrationsArgs {
    /// Template name under the migrations dir, e.g. `init.sql`
    #[arg(short, long)]
    file: String,
}

#[derive(Args, Debug, Clone)]
pub struct StandardizeRolesArgs {
    /// Only report what would change
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Action {
    RunMigrations(RunMigrationsArgs),
    /// Rewrites stored account roles to their canonical spelling
    StandardizeRoles(StandardizeRolesArgs),
}

/// Maintenance tasks for the vet clinic database
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub action: Action,
}

impl AppArgs {
    pub async fn run(&self) -> anyhow::Result<()> {
        let db_pool = utils::setup_sqlite_db_pool(config::APP_CONFIG.is_prod()).await?;

        match &self.action {
            Action::RunMigrations(RunMigrationsArgs { file }) => {
                utils::run_migrations(&db_pool, file).await
            }
            Action::StandardizeRoles(StandardizeRolesArgs { dry_run }) => {
                let app_repo: repo::ImplAppRepo = Box::new(repo::sqlite::SqlxSqliteRepo { db_pool });
                let report = api::user::standardize_roles(&app_repo, *dry_run).await?;

                for change in &report.changes {
                    println!(
                        "user {}: {:?} -> {}",
                        change.user_id, change.stored_role, change.canonical_role
                    );
                }
                println!(
                    "scanned {} users, {} {}",
                    report.scanned,
                    report.changes.len(),
                    if report.dry_run { "to change" } else { "changed" }
                );

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        let args = AppArgs::parse_from(["scripts", "standardize-roles", "--dry-run"]);
        assert!(matches!(
            args.action,
            Action::StandardizeRoles(StandardizeRolesArgs { dry_run: true })
        ));

        let args = AppArgs::parse_from(["scripts", "run-migrations", "--file", "init.sql"]);
        assert!(matches!(
            args.action,
            Action::RunMigrations(RunMigrationsArgs { ref file }) if file == "init.sql"
        ));
    }
}
