use std::{path::Path, sync::Arc, time::Duration};

use {
    anyhow::{Context, Result},
    clap::{Args, ValueEnum},
    connector_crypto::CryptoService,
    connector_oauth::{
        CallbackServer, DEFAULT_PORT, DEFAULT_SERVER, authorization_url, pretty_json,
        resolve_server,
    },
    tracing::{info, warn},
};

use crate::session::{AppArgs, load_profiles, resolve_secret, resolve_session};

#[derive(Args)]
pub struct LoginArgs {
    #[command(flatten)]
    app: AppArgs,

    /// Connector auth server host.
    #[arg(long, env = "CONNECTOR_AUTH_SERVER", default_value = DEFAULT_SERVER)]
    server: String,

    /// Local port the callback listener binds.
    #[arg(long, env = "CONNECTOR_AUTH_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Give up after this many seconds without a callback.
    #[arg(long)]
    timeout: Option<u64>,

    /// Only print the authorization URL, don't open a browser.
    #[arg(long, default_value_t = false)]
    no_browser: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecryptMode {
    /// Raw `result` value as delivered to the callback listener.
    Callback,
    /// Value copied from the connector redirect, escaped or not.
    Connector,
    /// Body of a token refresh response.
    Refresh,
}

#[derive(Args)]
pub struct DecryptArgs {
    #[command(flatten)]
    app: AppArgs,

    /// Encrypted result to decode.
    result: String,

    #[arg(long, value_enum, default_value_t = DecryptMode::Callback)]
    mode: DecryptMode,
}

pub async fn login(args: LoginArgs, profiles_path: Option<&Path>) -> Result<()> {
    let profiles = load_profiles(profiles_path)?;
    let server = resolve_server(&args.server)?;
    let session = resolve_session(&args.app, profiles.as_ref(), server, args.port)?;
    print!("{}", pretty_json(&session)?);

    let crypto = Arc::new(CryptoService::from_secret(&session.secret)?);
    let url = authorization_url(&session)?;

    // Bind before handing out the URL so a fast redirect can't miss us.
    let listener = CallbackServer::bind(session.port).await?;
    println!("! Visit {url}");
    if !args.no_browser && open::that(&url).is_err() {
        println!("Could not open browser, open the URL above manually.");
    }

    let credential = listener
        .wait_for_credentials(crypto, args.timeout.map(Duration::from_secs))
        .await?;
    if credential.is_error() {
        warn!(error = %credential.error, "connector returned an error");
    } else {
        info!(provider = %credential.provider, expires_in = credential.expires_in, "received credentials");
    }
    print!("{}", pretty_json(&credential)?);
    Ok(())
}

pub fn decrypt(args: DecryptArgs, profiles_path: Option<&Path>) -> Result<()> {
    let profiles = load_profiles(profiles_path)?;
    let secret = resolve_secret(&args.app, profiles.as_ref())?;
    let crypto = CryptoService::from_secret(&secret)?;

    let result = args.result.trim();
    let credential = match args.mode {
        DecryptMode::Callback => crypto.decrypt_credentials(result),
        DecryptMode::Connector => crypto.decrypt_connector_result(result),
        DecryptMode::Refresh => crypto.decrypt_refresh_result(result),
    }
    .with_context(|| format!("failed to decrypt {:?} result", args.mode))?;

    print!("{}", pretty_json(&credential)?);
    Ok(())
}
