use clap::Subcommand;
use serde_json::json;

use crate::auth::TokenService;
use crate::cli::utils::{load_config, output_error, output_success, value_or_stdin};
use crate::cli::OutputFormat;
use crate::database;
use crate::services::{AdminService, Credentials, ServiceError};

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Create an admin account directly in the store")]
    Create {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (read from stdin if not provided)")]
        password: Option<String>,
    },
}

pub async fn handle(cmd: AdminCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AdminCommands::Create { username, password } => {
            let password = value_or_stdin(password, "Password")?;
            let config = load_config()?;
            let store = database::connect(&config.database).await?;
            // Not subject to the HTTP creation gate
            let admins = AdminService::new(store, TokenService::from_config(&config.security), false);

            match admins.create_admin(Credentials { username: username.clone(), password }).await {
                Ok(_) => output_success(
                    &output_format,
                    &format!("Admin '{}' created", username),
                    Some(json!({ "username": username, "database": config.database.db_name })),
                ),
                Err(ServiceError::Conflict(msg)) => {
                    output_error(&output_format, &msg, Some("ADMIN_EXISTS"))?;
                    std::process::exit(1);
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
