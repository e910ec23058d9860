//! SAML2 bearer grant driver.
//!
//! Evaluates one token request against a configured client registry and an
//! authenticated session, printing the OAuth2 token response (or error
//! response) as JSON on stdout.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use zentinel_saml2_bearer::{AuthenticatedSession, GrantOutcome, GrantRequest, GranterConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "zentinel-saml2-bearer")]
#[command(about = "Exchange a federated SAML2 login for a token scoped to another OAuth2 client")]
struct Args {
    /// Path to the JSON granter configuration
    #[arg(long, env = "SAML2_BEARER_CONFIG")]
    config: PathBuf,

    /// Path to the JSON authenticated session
    #[arg(long, env = "SAML2_BEARER_SESSION")]
    session: PathBuf,

    /// Form-urlencoded token request body (read from stdin when omitted)
    #[arg(long)]
    body: Option<String>,

    /// Client id established by client authentication
    #[arg(long)]
    client_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, env = "SAML2_BEARER_VERBOSE")]
    verbose: bool,
}

const EXIT_REJECTED: u8 = 2;
const EXIT_NOT_APPLICABLE: u8 = 3;

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the response
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = GranterConfig::load(&args.config)?;
    let granter = config.build_granter()?;

    let session_data = std::fs::read_to_string(&args.session)
        .with_context(|| format!("Failed to read session: {:?}", args.session))?;
    let session: AuthenticatedSession =
        serde_json::from_str(&session_data).context("Invalid session document")?;

    let body = match args.body {
        Some(body) => body,
        None => {
            let mut body = String::new();
            std::io::stdin()
                .read_to_string(&mut body)
                .context("Failed to read request body from stdin")?;
            body
        }
    };

    let mut request = match GrantRequest::from_form(body.trim()) {
        Ok(r) => r,
        Err(e) => {
            println!("{}", serde_json::to_string(&e.to_response())?);
            return Ok(ExitCode::from(EXIT_REJECTED));
        }
    };
    if let Some(client_id) = args.client_id {
        request = request.with_resolved_client_id(client_id);
    }

    let grant_type = request.grant_type.clone();
    match granter.grant(&grant_type, &session, Some(&request)) {
        Ok(GrantOutcome::Issued(token)) => {
            let response = serde_json::to_string(&token.to_response())
                .map_err(|e| anyhow!("Failed to serialize token response: {}", e))?;
            println!("{}", response);
            info!(jti = ?token.jti(), "Token issued");
            Ok(ExitCode::SUCCESS)
        }
        Ok(GrantOutcome::NotApplicable) => {
            warn!(grant_type = %grant_type, "saml2-bearer grant not applicable to this request");
            Ok(ExitCode::from(EXIT_NOT_APPLICABLE))
        }
        Err(e) => {
            println!("{}", serde_json::to_string(&e.to_response())?);
            Ok(ExitCode::from(EXIT_REJECTED))
        }
    }
}
