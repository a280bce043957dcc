//! Short-lived local listener that receives the connector redirect.
//!
//! The connector sends the browser to `http://127.0.0.1:<port>/?result=...`.
//! The first request carrying `result` is decoded, answered, and ends the
//! session.

use std::{collections::HashMap, net::SocketAddr, sync::Arc, time::Duration};

use {
    axum::{
        Router,
        extract::{Query, State},
        http::{StatusCode, header},
        response::{IntoResponse, Response},
        routing::get,
    },
    connector_crypto::{Credential, CryptoError, CryptoService},
    tokio::{
        net::TcpListener,
        sync::{mpsc, oneshot},
    },
    tracing::{debug, info, warn},
};

use crate::render::pretty_json;

/// Time in-flight requests get to finish once the session is over.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

pub type CallbackOutcome = Result<Credential, CryptoError>;

#[derive(Clone)]
struct CallbackState {
    crypto: Arc<CryptoService>,
    results: mpsc::Sender<CallbackOutcome>,
}

/// Build the callback router. Each decoded `result` is also pushed to
/// `results`; repeats after the first are dropped.
pub fn build_callback_app(
    crypto: Arc<CryptoService>,
    results: mpsc::Sender<CallbackOutcome>,
) -> Router {
    Router::new()
        .route("/", get(callback_handler))
        .with_state(CallbackState { crypto, results })
}

async fn callback_handler(
    State(state): State<CallbackState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(result) = params.get("result") else {
        debug!("callback request without a result parameter");
        return (StatusCode::BAD_REQUEST, "missing `result` parameter\n").into_response();
    };

    let outcome = state.crypto.decrypt_credentials(result);
    let response = match &outcome {
        Ok(cred) => match pretty_json(cred) {
            Ok(body) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("render error => {e}\n"),
            )
                .into_response(),
        },
        Err(e) => {
            warn!(error = %e, "failed to decode callback payload");
            // The error line is followed by the empty credential document.
            let empty = pretty_json(&Credential::default()).unwrap_or_default();
            (StatusCode::BAD_REQUEST, format!("parser error => {e}\n{empty}")).into_response()
        },
    };

    if state.results.try_send(outcome).is_err() {
        debug!("session already has a result, ignoring repeat callback");
    }
    response
}

pub struct CallbackServer {
    listener: TcpListener,
}

impl CallbackServer {
    /// Bind `127.0.0.1:<port>`. Port 0 picks a free port.
    pub async fn bind(port: u16) -> anyhow::Result<Self> {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow::anyhow!("failed to bind {addr} for the callback listener: {e}"))?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the first callback with a `result`, Ctrl-C, or `timeout`.
    pub async fn wait_for_credentials(
        self,
        crypto: Arc<CryptoService>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Credential> {
        let addr = self.local_addr()?;
        let (results_tx, mut results_rx) = mpsc::channel(1);
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let app = build_callback_app(crypto, results_tx);
        let mut server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = stop_rx.await;
                })
                .await
        });
        info!(%addr, "waiting for connector callback");

        let deadline = async {
            match timeout {
                Some(t) => tokio::time::sleep(t).await,
                None => std::future::pending::<()>().await,
            }
        };

        let ended: anyhow::Result<Credential> = tokio::select! {
            Some(outcome) = results_rx.recv() => outcome
                .map_err(|e| anyhow::Error::new(e).context("callback payload could not be decoded")),
            joined = &mut server => {
                return match joined {
                    Ok(Ok(())) => Err(anyhow::anyhow!("callback listener exited early")),
                    Ok(Err(e)) => Err(anyhow::Error::new(e).context("callback listener failed")),
                    Err(e) => Err(anyhow::Error::new(e).context("callback listener panicked")),
                };
            },
            Ok(()) = tokio::signal::ctrl_c() => Err(anyhow::anyhow!("interrupted before the callback arrived")),
            () = deadline => Err(anyhow::anyhow!(
                "timed out after {:?} waiting for the callback on {addr}",
                timeout.unwrap_or_default()
            )),
        };

        let _ = stop_tx.send(());
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
            Ok(Ok(Ok(()))) => debug!("callback listener stopped"),
            Ok(Ok(Err(e))) => warn!(error = %e, "callback listener failed during shutdown"),
            Ok(Err(e)) => warn!(error = %e, "callback listener task failed"),
            Err(_) => {
                warn!("callback listener did not drain in time, aborting");
                server.abort();
            },
        }

        ended
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        axum::{body::Body, http::Request},
        tokio::io::{AsyncReadExt, AsyncWriteExt},
        tower::ServiceExt,
    };

    fn crypto() -> Arc<CryptoService> {
        Arc::new(CryptoService::new("s3cr3t").unwrap())
    }

    fn sample() -> Credential {
        Credential {
            access_token: "abc".into(),
            expires_in: 3600,
            refresh_token: "ref".into(),
            provider: "p".into(),
            ..Default::default()
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn valid_result_renders_credential() {
        let crypto = crypto();
        let enc = crypto.encrypt_struct(&sample()).unwrap();
        let (tx, mut rx) = mpsc::channel(1);
        let app = build_callback_app(Arc::clone(&crypto), tx);

        let (status, body) = get(app, &format!("/?result={enc}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, pretty_json(&sample()).unwrap());
        assert_eq!(rx.try_recv().unwrap().unwrap(), sample());
    }

    #[tokio::test]
    async fn malformed_result_renders_parser_error() {
        let (tx, mut rx) = mpsc::channel(1);
        let app = build_callback_app(crypto(), tx);

        // `%25zz` reaches the handler as `%zz`.
        let (status, body) = get(app, "/?result=%25zz").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("parser error => query unescape failed"));
        let (_, rendered) = body.split_once('\n').unwrap();
        assert_eq!(rendered, pretty_json(&Credential::default()).unwrap());
        assert!(matches!(
            rx.try_recv().unwrap(),
            Err(CryptoError::MalformedInput(_))
        ));
    }

    #[tokio::test]
    async fn missing_result_does_not_end_session() {
        let (tx, mut rx) = mpsc::channel(1);
        let app = build_callback_app(crypto(), tx);

        let (status, _) = get(app, "/").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn other_paths_are_not_found() {
        let (tx, _rx) = mpsc::channel(1);
        let app = build_callback_app(crypto(), tx);
        let (status, _) = get(app, "/favicon.ico").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listener_returns_first_credential() {
        let crypto = crypto();
        let enc = crypto.encrypt_struct(&sample()).unwrap();

        let server = CallbackServer::bind(0).await.unwrap();
        let addr = server.local_addr().unwrap();
        let session = tokio::spawn(
            server.wait_for_credentials(Arc::clone(&crypto), Some(Duration::from_secs(10))),
        );

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request =
            format!("GET /?result={enc} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"access_token\": \"abc\""));

        let cred = session.await.unwrap().unwrap();
        assert_eq!(cred, sample());
    }

    #[tokio::test]
    async fn listener_times_out() {
        let server = CallbackServer::bind(0).await.unwrap();
        let err = server
            .wait_for_credentials(crypto(), Some(Duration::from_millis(50)))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
