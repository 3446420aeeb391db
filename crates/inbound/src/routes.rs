//! Routen des Peer-Routers
//!
//! | Pfad           | Body                                   | Antwort            |
//! |----------------|----------------------------------------|--------------------|
//! | `/api/message` | `{username, message, iv, chat}`        | `OK` (text/plain)  |
//! | `/api/file`    | `{username, fileData, fileName, iv, chat}` | `OK` (text/plain) |
//! | `/api/cert`    | `{username, publicKey}`                | eigenes Zertifikat |

use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use fernchat_core::{types::pfade, Certificate, FileRequest, MessageRequest, ERFOLGS_MARKER};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, error};

use crate::empfaenger::PeerEmpfaenger;
use crate::error::{status, status_antwort, InboundResult};

/// Axum-State des Peer-Routers
#[derive(Clone)]
pub struct InboundState {
    empfaenger: Arc<dyn PeerEmpfaenger>,
}

/// Erstellt den vollstaendigen Peer-Router
pub fn peer_router(empfaenger: Arc<dyn PeerEmpfaenger>) -> Router {
    Router::new()
        .route(pfade::NACHRICHT, post(nachricht))
        .route(pfade::DATEI, post(datei))
        .route(pfade::ZERTIFIKAT, post(zertifikat))
        .fallback(route_nicht_gefunden)
        // Nach Routen und Fallback, damit die Methode zuerst geprueft wird
        .layer(middleware::from_fn(nur_post))
        .layer(CatchPanicLayer::custom(panik_antwort))
        .layer(TraceLayer::new_for_http())
        .with_state(InboundState { empfaenger })
}

async fn nur_post(req: Request, next: Next) -> Response {
    if req.method() != Method::POST {
        debug!(methode = %req.method(), pfad = %req.uri().path(), "Methode abgelehnt");
        return status_antwort(StatusCode::METHOD_NOT_ALLOWED, status::METHODE_NICHT_ERLAUBT);
    }
    next.run(req).await
}

async fn route_nicht_gefunden() -> Response {
    status_antwort(StatusCode::BAD_REQUEST, status::ROUTE_NICHT_GEFUNDEN)
}

fn panik_antwort(panik: Box<dyn Any + Send + 'static>) -> Response {
    let details = panik
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panik.downcast_ref::<&str>().copied())
        .unwrap_or("unbekannt");
    error!(details = %details, "Panic im Peer-Router");
    status_antwort(StatusCode::INTERNAL_SERVER_ERROR, status::INTERNER_FEHLER)
}

async fn nachricht(State(state): State<InboundState>, body: Bytes) -> InboundResult<&'static str> {
    let anfrage: MessageRequest = serde_json::from_slice(&body)?;
    state.empfaenger.nachricht_empfangen(anfrage).await?;
    Ok(ERFOLGS_MARKER)
}

async fn datei(State(state): State<InboundState>, body: Bytes) -> InboundResult<&'static str> {
    let anfrage: FileRequest = serde_json::from_slice(&body)?;
    state.empfaenger.datei_empfangen(anfrage).await?;
    Ok(ERFOLGS_MARKER)
}

async fn zertifikat(State(state): State<InboundState>, body: Bytes) -> InboundResult<Response> {
    let peer: Certificate = serde_json::from_slice(&body)?;
    let eigenes = state.empfaenger.zertifikat_austauschen(peer).await?;
    Ok(Json(eigenes).into_response())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
