//! Courier CLI: run the login handshake and a federated upload from a terminal.
//!
//! Reads the same environment (or `.env`) as the web server.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use courier_cli::{callback_query, init_tracing, read_upload_file, stack_report, StdoutNavigator};
use courier_core::constants::ID_TOKEN_COOKIE;
use courier_core::models::Navigation;
use courier_core::stack::{StackContext, StackOutputs};
use courier_core::ClientConfig;
use courier_services::{
    CodeExchange, CognitoCredentialProvider, Cookie, CookieStore, ExchangeOutcome,
    FederatedUpload, HttpTokenEndpoint, MemoryCookieStore, Navigator, SystemClock,
};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "courier", about = "Hosted login handshake and federated upload")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the hosted login URL
    LoginUrl,
    /// Exchange the code of a callback URL for tokens and print the identity token
    Exchange {
        /// Full callback URL copied from the browser, or just its query string
        callback_url: String,
    },
    /// Upload a local file with credentials federated from an identity token
    Upload {
        /// Key prefix; the object lands at `{prefix}/{file name}`
        #[arg(long, default_value = "")]
        prefix: String,
        /// File to upload
        file: PathBuf,
        /// Identity token from `courier exchange`
        #[arg(long, env = "COURIER_ID_TOKEN")]
        id_token: String,
    },
    /// Print the values provisioning derives from a context file
    Stack {
        /// CDK context JSON (`cdk.json` or a bare context object)
        #[arg(long)]
        context: PathBuf,
        /// Outputs file written by `cdk deploy --outputs-file`
        #[arg(long)]
        outputs: Option<PathBuf>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn require_hosted_ui(config: &ClientConfig) -> anyhow::Result<()> {
    for (name, value) in [
        ("AWS_REGION", &config.region),
        ("COGNITO_DOMAIN_NAME", &config.cognito_domain_name),
        ("COGNITO_CLIENT_ID", &config.client_id),
    ] {
        if value.is_empty() {
            anyhow::bail!("{} must be set (or provided through COURIER_STACK_OUTPUTS)", name);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let navigator = StdoutNavigator;

    match cli.command {
        Commands::LoginUrl => {
            let config = ClientConfig::from_env()?;
            require_hosted_ui(&config)?;
            navigator.navigate(&Navigation::to(config.hosted_ui().login_url()));
        }
        Commands::Exchange { callback_url } => {
            let config = ClientConfig::from_env()?;
            require_hosted_ui(&config)?;

            let hosted_ui = config.hosted_ui();
            let endpoint = HttpTokenEndpoint::new(
                hosted_ui.token_endpoint(),
                Duration::from_secs(config.http_timeout_secs),
            )?;
            let exchange = CodeExchange::new(hosted_ui, Arc::new(endpoint), config.upload_url());
            let cookies = MemoryCookieStore::new();

            match exchange.run(callback_query(&callback_url), &cookies).await {
                ExchangeOutcome::Complete(_) => {
                    let id_token = cookies
                        .get(ID_TOKEN_COOKIE)
                        .context("Token endpoint returned no identity token")?;
                    println!("{}", id_token);
                }
                ExchangeOutcome::Redirect(navigation) => {
                    eprintln!("No authorization code in the callback URL; sign in first:");
                    navigator.navigate(&navigation);
                    std::process::exit(1);
                }
                ExchangeOutcome::Failed(e) => {
                    return Err(anyhow::Error::new(e).context("Authorization code exchange failed"));
                }
            }
        }
        Commands::Upload {
            prefix,
            file,
            id_token,
        } => {
            let config = ClientConfig::from_env()?;
            config
                .validate()
                .context("Configuration validation failed")?;

            let upload_file = read_upload_file(&file).await?;

            let credentials =
                CognitoCredentialProvider::new(&config.region, config.identity_pool_id.clone())
                    .await;
            let storage = courier_storage::create_storage(&config)
                .await
                .context("Failed to initialize storage")?;
            let upload = FederatedUpload::new(
                config.hosted_ui().provider_login_key(),
                config.bucket(),
                Arc::new(credentials),
                storage,
                Arc::new(SystemClock),
            );

            let cookies = MemoryCookieStore::new();
            cookies.set(Cookie::new(ID_TOKEN_COOKIE, id_token));

            let status = upload.submit(&prefix, Some(upload_file), &cookies).await;
            println!("{}", status.message);
            if !status.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Stack { context, outputs } => {
            let context = StackContext::from_file(&context)?;
            let outputs = outputs
                .map(|path| StackOutputs::from_file(&path))
                .transpose()?;
            print_json(&stack_report(&context, outputs.as_ref()))?;
        }
    }

    Ok(())
}
