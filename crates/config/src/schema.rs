use {secrecy::Secret, serde::Deserialize};

/// Registered connector app the user can authorize against.
#[derive(Debug, Clone, Deserialize)]
pub struct AppProfile {
    pub name: String,
    pub id: String,
    pub secret: Secret<String>,
    pub provider: String,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl AppProfile {
    /// Scopes as the connector expects them: space separated.
    pub fn scope_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Root of the profiles file.
///
/// ```yaml
/// apps:
///   - name: photos
///     id: app-123
///     secret: ${PHOTOS_SECRET}
///     provider: google
///     scopes: [drive.readonly, email]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfilesFile {
    pub apps: Vec<AppProfile>,
}

impl ProfilesFile {
    pub fn find(&self, name: &str) -> Option<&AppProfile> {
        self.apps.iter().find(|a| a.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.apps.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    const SAMPLE: &str = r#"
apps:
  - name: photos
    id: app-123
    secret: shh
    provider: google
    scopes:
      - drive.readonly
      - email
  - name: backup
    id: app-456
    secret: quiet
    provider: dropbox
"#;

    #[test]
    fn parses_apps() {
        let file: ProfilesFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(file.names(), vec!["photos", "backup"]);

        let photos = file.find("photos").unwrap();
        assert_eq!(photos.id, "app-123");
        assert_eq!(photos.secret.expose_secret(), "shh");
        assert_eq!(photos.scope_string(), "drive.readonly email");

        let backup = file.find("backup").unwrap();
        assert!(backup.scopes.is_empty());
        assert_eq!(backup.scope_string(), "");
    }

    #[test]
    fn unknown_app_is_none() {
        let file: ProfilesFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert!(file.find("nope").is_none());
    }

    #[test]
    fn empty_document_has_no_apps() {
        let file: ProfilesFile = serde_yaml::from_str("{}").unwrap();
        assert!(file.is_empty());
    }

    #[test]
    fn debug_redacts_secret() {
        let file: ProfilesFile = serde_yaml::from_str(SAMPLE).unwrap();
        let dbg = format!("{:?}", file.find("photos").unwrap());
        assert!(!dbg.contains("shh"));
    }
}
