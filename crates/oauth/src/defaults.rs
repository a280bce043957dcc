use tracing::warn;

/// Connector hosts that serve the `/oauth2/connect` endpoint.
pub const KNOWN_SERVERS: &[&str] = &[
    "connector.myqnapcloud.com",
    "connector.alpha-myqnapcloud.com",
];

pub const DEFAULT_SERVER: &str = "connector.alpha-myqnapcloud.com";

/// Port the local callback listener binds when none is given.
pub const DEFAULT_PORT: u16 = 3000;

/// Validate an auth server host name.
///
/// Unknown hosts are allowed (staging setups) but logged.
pub fn resolve_server(server: &str) -> anyhow::Result<String> {
    let server = server.trim().trim_end_matches('/');
    if server.is_empty() {
        anyhow::bail!("auth server must not be empty");
    }
    if server.contains("://") || server.contains('/') {
        anyhow::bail!("auth server must be a bare host name, got {server:?}");
    }
    if !KNOWN_SERVERS.contains(&server) {
        warn!(server, "using an auth server outside the known list");
    }
    Ok(server.to_string())
}
