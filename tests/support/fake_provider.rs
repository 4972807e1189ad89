//! Local stand-in for the OpenWeatherMap API.
//!
//! - `/data/2.5/weather` echoes the coordinates it received
//! - `/data/2.5/forecast` always answers 429 with a JSON error body
//! - `/geo/1.0/direct` echoes `q` as a single match
//! - `/geo/1.0/reverse` answers 502 with an HTML body
//!
//! Every route answers 401 unless `appid` equals [`VALID_KEY`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const VALID_KEY: &str = "test-key-7f3a";

type Params = HashMap<String, String>;
type Seen = Arc<Mutex<Vec<Params>>>;

pub struct FakeProvider {
    addr: SocketAddr,
    seen: Seen,
    handle: JoinHandle<()>,
}

impl FakeProvider {
    pub async fn start() -> Self {
        let seen: Seen = Arc::default();

        let app = Router::new()
            .route("/data/2.5/weather", get(current))
            .route("/data/2.5/forecast", get(forecast))
            .route("/geo/1.0/direct", get(direct))
            .route("/geo/1.0/reverse", get(reverse))
            .with_state(seen.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("fake provider should bind");
        let addr = listener.local_addr().expect("bound address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake provider crashed");
        });

        Self { addr, seen, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Query parameters of every request received so far.
    pub fn requests(&self) -> Vec<Params> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for FakeProvider {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn authorize(seen: &Seen, params: &Params) -> Result<(), Response> {
    seen.lock().unwrap().push(params.clone());

    if params.get("appid").map(String::as_str) == Some(VALID_KEY) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "cod": 401,
                "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info.",
            })),
        )
            .into_response())
    }
}

async fn current(State(seen): State<Seen>, Query(params): Query<Params>) -> Response {
    if let Err(denied) = authorize(&seen, &params) {
        return denied;
    }

    Json(json!({
        "coord": { "lat": params.get("lat"), "lon": params.get("lon") },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "name": "Null Island",
        "cod": 200,
    }))
    .into_response()
}

async fn forecast(State(seen): State<Seen>, Query(params): Query<Params>) -> Response {
    if let Err(denied) = authorize(&seen, &params) {
        return denied;
    }

    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({ "cod": 429, "message": "Your account is temporary blocked" })),
    )
        .into_response()
}

async fn direct(State(seen): State<Seen>, Query(params): Query<Params>) -> Response {
    if let Err(denied) = authorize(&seen, &params) {
        return denied;
    }

    Json(json!([{ "name": params.get("q"), "lat": 48.8589, "lon": 2.32, "country": "FR" }]))
        .into_response()
}

async fn reverse(State(seen): State<Seen>, Query(params): Query<Params>) -> Response {
    if let Err(denied) = authorize(&seen, &params) {
        return denied;
    }

    (
        StatusCode::BAD_GATEWAY,
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>Bad Gateway</body></html>",
    )
        .into_response()
}
