use clap::Subcommand;
use serde_json::json;

use crate::auth::digest_passphrase;
use crate::cli::utils::{output_success, value_or_stdin};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    #[command(about = "Print the X-Api-Key value for a passphrase")]
    Digest {
        #[arg(help = "Passphrase (read from stdin if not provided)")]
        passphrase: Option<String>,
    },
}

pub async fn handle(cmd: ApiKeyCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ApiKeyCommands::Digest { passphrase } => {
            let passphrase = value_or_stdin(passphrase, "Passphrase")?;
            let key = digest_passphrase(&passphrase);
            match output_format {
                OutputFormat::Text => {
                    println!("{}", key);
                    Ok(())
                }
                OutputFormat::Json => output_success(&output_format, "API key digest", Some(json!({ "api_key": key }))),
            }
        }
    }
}
