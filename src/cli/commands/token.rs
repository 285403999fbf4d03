use clap::Subcommand;
use serde_json::json;

use crate::auth::TokenService;
use crate::cli::utils::{load_config, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Issue a session token for an admin username")]
    Issue {
        #[arg(help = "Username to embed in the token")]
        username: String,
    },

    #[command(about = "Validate a session token and show its subject")]
    Verify {
        #[arg(help = "Token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = load_config()?;
    let tokens = TokenService::from_config(&config.security);

    match cmd {
        TokenCommands::Issue { username } => {
            let token = tokens.issue(&username)?;
            output_success(
                &output_format,
                &format!("Issued token for '{}'", username),
                Some(json!({
                    "token": token,
                    "expires_in_days": tokens.lifetime().num_days()
                })),
            )
        }
        TokenCommands::Verify { token } => {
            let claims = tokens.validate(&token)?;
            let expires = chrono::DateTime::from_timestamp(claims.exp, 0)
                .map(|at| at.to_rfc3339())
                .unwrap_or_default();
            output_success(
                &output_format,
                "Token is valid",
                Some(json!({ "username": claims.sub, "expires_at": expires })),
            )
        }
    }
}
