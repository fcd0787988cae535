// crates/server/src/routes/ping.rs
//! Liveness endpoint for the API.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use atrium_core::Envelope;

use crate::state::AppState;

/// Payload for the liveness endpoint.
#[derive(Debug, Serialize)]
pub struct PingData {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_secs: u64,
}

/// GET /ping - always 200 with the fixed success envelope.
pub async fn ping(State(state): State<Arc<AppState>>) -> Json<Envelope<PingData>> {
    Json(Envelope::ok(
        "pong",
        PingData {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            uptime_secs: state.uptime_secs(),
        },
    ))
}

/// Build the ping router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/ping", get(ping))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_data_serialization() {
        let env = Envelope::ok(
            "pong",
            PingData {
                status: "ok",
                version: "0.1.0",
                uptime_secs: 7,
            },
        );
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["uptime_secs"], 7);
    }
}
