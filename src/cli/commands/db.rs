use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{load_config, output_success};
use crate::cli::OutputFormat;
use crate::database;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "Connect to the configured store and ping it")]
    Ping,

    #[command(about = "List collections with document counts")]
    Collections,
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let store = database::connect(&config.database).await?;

    match cmd {
        DbCommands::Ping => {
            store.ping().await?;
            output_success(
                &output_format,
                &format!("Database '{}' is reachable", store.database_name()),
                Some(json!({ "database": store.database_name(), "backend": config.database.backend })),
            )
        }
        DbCommands::Collections => {
            let mut counts = serde_json::Map::new();
            for name in store.list_collections().await? {
                let count = store.count(&name, &database::Document::new()).await?;
                counts.insert(name, json!(count));
            }
            output_success(
                &output_format,
                &format!("{} collections in '{}'", counts.len(), store.database_name()),
                Some(serde_json::Value::Object(counts)),
            )
        }
    }
}
