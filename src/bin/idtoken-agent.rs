use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Method, Request};
use idtoken_agent::utils::env::ProcessEnv;
use idtoken_agent::utils::logging::LogLevel;
use idtoken_agent::utils::{config_loader, http_client, logging};
use idtoken_agent::{
    id_token_source, AuthTransport, GoogleMechanisms, ProjectResolver, TokenSource, Transport,
};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "idtoken-agent.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an identity token for the audience
    Token {
        #[arg(short, long)]
        audience: String,
    },
    /// Print the active project id
    Project,
    /// GET a url with an identity token attached, print status and body
    Request {
        #[arg(short, long)]
        audience: Option<String>,
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Create request client and credential mechanisms
    // -------------------------------

    let client = http_client::build(&service_config.settings)?;
    let mechanisms = GoogleMechanisms::new(client.clone(), Arc::new(ProcessEnv), &service_config.settings);

    // -------------------------------
    // 3. Run the command
    // -------------------------------

    match args.command {
        Command::Token { audience } => {
            let source = id_token_source(&mechanisms, &audience)
                .await
                .context("failed to create token source")?;
            let token = source.token().await.context("failed to get token")?;
            info!("identity token issued for {audience}");
            println!("{}", token.access_token);
        }
        Command::Project => {
            let resolver = ProjectResolver::new(Arc::new(ProcessEnv), mechanisms.metadata().clone());
            println!("{}", resolver.project_id().await?);
        }
        Command::Request { audience, url } => {
            let url: reqwest::Url = url.parse().context("invalid url")?;
            // audience defaults to the target origin, as Cloud Run expects
            let audience = audience.unwrap_or_else(|| url.origin().ascii_serialization());
            let transport = AuthTransport::new(client, mechanisms, audience);
            let response = transport.round_trip(Request::new(Method::GET, url)).await?;
            info!("response status {}", response.status());
            println!("{}", response.status());
            println!("{}", response.text().await?);
        }
    }

    Ok(())
}
