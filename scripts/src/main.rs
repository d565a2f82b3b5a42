//! Maintenance CLI for the vet clinic database.
//!
//! ```text
//! DB_HOST=sqlite:data/vet_clinic.db scripts run-migrations --file init.sql
//! DB_HOST=sqlite:data/vet_clinic.db scripts standardize-roles --dry-run
//! ```

mod action;
mod config;
mod utils;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    action::AppArgs::parse().run().await
}
