use {tracing::debug, url::Url};

use crate::types::SessionConfig;

/// Build the connector URL the user opens to authorize the app.
///
/// `app_id`, `provider` and `scope` are form-encoded; the connector expects
/// the `cb` target appended verbatim.
pub fn authorization_url(session: &SessionConfig) -> anyhow::Result<String> {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("app_id", &session.id)
        .append_pair("provider", &session.provider)
        .append_pair("scope", &session.scopes)
        .finish();
    let url = format!(
        "https://{}/oauth2/connect?{query}&cb={}",
        session.server,
        session.callback_url()
    );

    Url::parse(&url).map_err(|e| anyhow::anyhow!("invalid authorization URL {url:?}: {e}"))?;
    debug!(server = %session.server, port = session.port, "built authorization URL");
    Ok(url)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, secrecy::Secret};

    fn session(scopes: &str) -> SessionConfig {
        SessionConfig {
            server: "connector.alpha-myqnapcloud.com".into(),
            name: None,
            id: "app-42".into(),
            secret: Secret::new("s".into()),
            provider: "google".into(),
            scopes: scopes.into(),
            port: 3000,
        }
    }

    #[test]
    fn url_has_expected_shape() {
        let url = authorization_url(&session("email profile")).unwrap();
        assert_eq!(
            url,
            "https://connector.alpha-myqnapcloud.com/oauth2/connect?app_id=app-42&provider=google&scope=email+profile&cb=http://127.0.0.1:3000"
        );
    }

    #[test]
    fn scope_is_form_encoded() {
        let url = authorization_url(&session("drive/read&write")).unwrap();
        assert!(url.contains("scope=drive%2Fread%26write&cb="));
    }

    #[test]
    fn empty_scope_is_kept() {
        let url = authorization_url(&session("")).unwrap();
        assert!(url.contains("&scope=&cb="));
    }

    #[test]
    fn parsed_query_round_trips() {
        let url = authorization_url(&session("a b")).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs, vec![
            ("app_id".into(), "app-42".into()),
            ("provider".into(), "google".into()),
            ("scope".into(), "a b".into()),
            ("cb".into(), "http://127.0.0.1:3000".into()),
        ]);
    }

    #[test]
    fn bad_server_is_rejected() {
        let mut s = session("x");
        s.server = "bad host".into();
        assert!(authorization_url(&s).is_err());
    }
}
