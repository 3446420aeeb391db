//! Structured Logging Setup via tracing-subscriber
//!
//! Die Werte aus der Konfiguration koennen per Umgebungsvariable
//! ueberschrieben werden:
//! - `FC_LOG_LEVEL`: Filter-Direktive (z.B. `debug` oder `fernchat_chat=trace`)
//! - `FC_LOG_FORMAT`: `text` oder `json`

use tracing_subscriber::{fmt, EnvFilter};

pub const LEVEL_VARIABLE: &str = "FC_LOG_LEVEL";
pub const FORMAT_VARIABLE: &str = "FC_LOG_FORMAT";

/// Initialisiert das Logging-System einmalig fuer den Prozess.
///
/// Faellt auf `info` zurueck, wenn weder Umgebung noch Konfiguration einen
/// gueltigen Filter liefern.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(LEVEL_VARIABLE)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = std::env::var(FORMAT_VARIABLE).unwrap_or_else(|_| format.to_string());

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
