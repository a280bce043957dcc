use {
    connector_config::AppProfile,
    secrecy::{ExposeSecret, Secret},
    serde::{Serialize, Serializer},
};

/// Everything one authorization session needs, resolved up front and passed
/// to the flow and the callback listener.
#[derive(Debug, Clone, Serialize)]
pub struct SessionConfig {
    pub server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub id: String,
    #[serde(serialize_with = "serialize_redacted")]
    pub secret: Secret<String>,
    pub provider: String,
    /// Space separated.
    pub scopes: String,
    pub port: u16,
}

impl SessionConfig {
    pub fn from_profile(server: String, profile: &AppProfile, port: u16) -> Self {
        Self {
            server,
            name: Some(profile.name.clone()),
            id: profile.id.clone(),
            secret: profile.secret.clone(),
            provider: profile.provider.clone(),
            scopes: profile.scope_string(),
            port,
        }
    }

    pub fn callback_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }
}

/// Serialize a secret as a fixed marker, never its value.
pub fn serialize_redacted<S: Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    if secret.expose_secret().is_empty() {
        serializer.serialize_str("")
    } else {
        serializer.serialize_str("[REDACTED]")
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AppProfile {
        serde_json::from_str(
            r#"{"name":"photos","id":"app-1","secret":"shh","provider":"google","scopes":["a","b"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn from_profile_joins_scopes() {
        let session = SessionConfig::from_profile("connector.test".into(), &profile(), 3000);
        assert_eq!(session.name.as_deref(), Some("photos"));
        assert_eq!(session.scopes, "a b");
        assert_eq!(session.secret.expose_secret(), "shh");
        assert_eq!(session.callback_url(), "http://127.0.0.1:3000");
    }

    #[test]
    fn serialized_summary_hides_secret() {
        let session = SessionConfig::from_profile("connector.test".into(), &profile(), 4000);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["secret"], "[REDACTED]");
        assert_eq!(json["port"], 4000);
        assert_eq!(json["provider"], "google");
    }

    #[test]
    fn manual_session_omits_name() {
        let session = SessionConfig {
            server: "connector.test".into(),
            name: None,
            id: "i".into(),
            secret: Secret::new(String::new()),
            provider: "p".into(),
            scopes: String::new(),
            port: 3000,
        };
        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("name").is_none());
        assert_eq!(json["secret"], "");
    }
}
