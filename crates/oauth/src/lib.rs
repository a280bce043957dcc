pub mod callback_server;
pub mod defaults;
pub mod flow;
pub mod render;
pub mod types;

pub use {
    callback_server::{CallbackServer, build_callback_app},
    defaults::{DEFAULT_PORT, DEFAULT_SERVER, KNOWN_SERVERS, resolve_server},
    flow::authorization_url,
    render::pretty_json,
    types::{SessionConfig, serialize_redacted},
};
