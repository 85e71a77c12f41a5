//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` from the environment (or `.env`) and accepts the
//! usual SeaORM subcommands: `up`, `down`, `fresh`, `status`.

use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info,sqlx=warn")
        .init();

    tracing::info!("Running Yatube schema migrations");
    cli::run_cli(migration::Migrator).await;
}
