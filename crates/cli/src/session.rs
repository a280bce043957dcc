use std::path::Path;

use {
    anyhow::{Context, Result, bail},
    clap::Args,
    connector_config::{AppProfile, ProfilesFile},
    connector_oauth::SessionConfig,
    secrecy::Secret,
    tracing::{info, warn},
};

/// Which app to authorize: a named profile, or the app fields directly.
#[derive(Args, Debug, Default)]
pub struct AppArgs {
    /// App profile name from the profiles file.
    #[arg(long)]
    pub app: Option<String>,

    /// App id (when not using a profile).
    #[arg(long)]
    pub id: Option<String>,

    /// App secret (when not using a profile).
    #[arg(long, env = "CONNECTOR_AUTH_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Auth provider (when not using a profile).
    #[arg(long)]
    pub provider: Option<String>,

    /// Scopes, separated by spaces (when not using a profile).
    #[arg(long, default_value = "")]
    pub scopes: String,
}

/// Load the profiles file given on the command line, or discover one.
pub fn load_profiles(path: Option<&Path>) -> Result<Option<ProfilesFile>> {
    match path {
        Some(p) => Ok(Some(connector_config::load_profiles(p)?)),
        None => Ok(connector_config::discover_profiles()?.map(|(_, profiles)| profiles)),
    }
}

fn pick_profile<'a>(
    args: &AppArgs,
    profiles: Option<&'a ProfilesFile>,
) -> Result<Option<&'a AppProfile>> {
    if let Some(name) = args.app.as_deref() {
        let Some(profiles) = profiles else {
            bail!("--app {name} given but no profiles file was found");
        };
        let profile = profiles.find(name).with_context(|| {
            format!(
                "unknown app {name:?} (available: {})",
                profiles.names().join(", ")
            )
        })?;
        if args.id.is_some() || args.provider.is_some() {
            warn!("--id/--provider are ignored when --app is given");
        }
        return Ok(Some(profile));
    }

    // Without explicit fields, a single-app profiles file is unambiguous.
    if args.id.is_none()
        && let Some(profiles) = profiles
        && let [only] = profiles.apps.as_slice()
    {
        info!(app = %only.name, "using the only configured app");
        return Ok(Some(only));
    }
    Ok(None)
}

/// Resolve the full session configuration for `login`.
pub fn resolve_session(
    args: &AppArgs,
    profiles: Option<&ProfilesFile>,
    server: String,
    port: u16,
) -> Result<SessionConfig> {
    if let Some(profile) = pick_profile(args, profiles)? {
        return Ok(SessionConfig::from_profile(server, profile, port));
    }

    let (Some(id), Some(secret), Some(provider)) = (&args.id, &args.secret, &args.provider) else {
        bail!("either --app or all of --id, --secret and --provider are required");
    };
    Ok(SessionConfig {
        server,
        name: None,
        id: id.clone(),
        secret: Secret::new(secret.clone()),
        provider: provider.clone(),
        scopes: args.scopes.trim().to_string(),
        port,
    })
}

/// Resolve just the shared secret, for offline decryption.
pub fn resolve_secret(args: &AppArgs, profiles: Option<&ProfilesFile>) -> Result<Secret<String>> {
    if let Some(secret) = &args.secret
        && args.app.is_none()
    {
        return Ok(Secret::new(secret.clone()));
    }
    match pick_profile(args, profiles)? {
        Some(profile) => Ok(profile.secret.clone()),
        None => bail!("either --app or --secret is required"),
    }
}
