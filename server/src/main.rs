//! fernchat Knoten – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Knoten.

use anyhow::Result;
use fernchat_server::{
    config::ServerConfig,
    logging::{log_format_gueltig, log_level_gueltig, logging_initialisieren},
    Server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config_pfad = std::env::var("FERNCHAT_CONFIG").unwrap_or_else(|_| "fernchat.toml".into());

    let config = ServerConfig::laden(&config_pfad)?;

    logging_initialisieren(&config.logging.level, &config.logging.format);

    if !log_level_gueltig(&config.logging.level) {
        tracing::warn!(level = %config.logging.level, "Unbekanntes Log-Level in der Konfiguration");
    }
    if !log_format_gueltig(&config.logging.format) {
        tracing::warn!(format = %config.logging.format, "Unbekanntes Log-Format, verwende text");
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "fernchat Knoten wird initialisiert"
    );

    Server::neu(config).starten().await
}
