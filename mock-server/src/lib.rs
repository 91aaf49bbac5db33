use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::{Path, RawQuery},
    http::{HeaderMap, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw of a request, returned by `GET /echo`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
}

pub const HELLO: &str = "hello";

pub fn app() -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/echo", get(echo))
        .route("/status/{code}", get(status))
        .route("/bytes/{len}", get(bytes))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `app()` on a random local port from a background thread and return
/// the bound address. The thread lives until the process exits and panics
/// with the cause if the server cannot start or stops serving.
pub fn spawn() -> std::io::Result<SocketAddr> {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    let addr = std_listener.local_addr()?;
    std_listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("mock-server: failed to build runtime");
        rt.block_on(async {
            let listener =
                TcpListener::from_std(std_listener).expect("mock-server: failed to adopt listener");
            if let Err(e) = run(listener).await {
                panic!("mock-server on {addr} stopped: {e}");
            }
        })
    });

    Ok(addr)
}

async fn hello() -> &'static str {
    HELLO
}

async fn echo(uri: Uri, RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        path: uri.path().to_string(),
        query,
        headers,
    })
}

async fn status(Path(code): Path<u16>) -> (StatusCode, String) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")),
        Err(_) => (StatusCode::BAD_REQUEST, format!("invalid status {code}")),
    }
}

async fn bytes(Path(len): Path<usize>) -> Vec<u8> {
    vec![b'x'; len]
}
