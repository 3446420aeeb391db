//! Fehlertypen des Peer-Routers

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use fernchat_chat::ChatError;
use serde_json::json;
use thiserror::Error;

/// Status-Texte der JSON-Fehlerantworten
pub mod status {
    pub const METHODE_NICHT_ERLAUBT: &str = "Method not allowed";
    pub const ROUTE_NICHT_GEFUNDEN: &str = "Route not found";
    pub const INTERNER_FEHLER: &str = "Internal error";
}

#[derive(Debug, Error)]
pub enum InboundError {
    #[error("Ungueltiger Request-Body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Verarbeitung fehlgeschlagen: {0}")]
    Chat(#[from] ChatError),
}

pub type InboundResult<T> = Result<T, InboundError>;

/// `{"status": "..."}` mit dem angegebenen HTTP-Status
pub fn status_antwort(code: StatusCode, text: &str) -> Response {
    (code, Json(json!({ "status": text }))).into_response()
}

impl IntoResponse for InboundError {
    fn into_response(self) -> Response {
        tracing::error!(fehler = %self, "Peer-Anfrage fehlgeschlagen");
        status_antwort(StatusCode::INTERNAL_SERVER_ERROR, status::INTERNER_FEHLER)
    }
}
