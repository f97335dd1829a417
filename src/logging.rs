//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` con salida a stderr. El filtro sale de
//! `--log-filter`/`RUST_LOG`; sin filtro se loguea `info` y superior.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Nivel por defecto cuando no hay filtro configurado
const DEFAULT_FILTER: &str = "info";

/// Instala el subscriber global
///
/// Un filtro inválido no impide arrancar: se avisa y se usa el default.
/// Llamarla dos veces no tiene efecto (el segundo intento se ignora).
pub fn init(filter: Option<&str>) {
    let (env_filter, rejected) = match filter {
        Some(directives) => match EnvFilter::try_new(directives) {
            Ok(env_filter) => (env_filter, None),
            Err(err) => (EnvFilter::new(DEFAULT_FILTER), Some(err)),
        },
        None => (EnvFilter::new(DEFAULT_FILTER), None),
    };

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .is_ok();

    if let (true, Some(err)) = (installed, rejected) {
        tracing::warn!(error = %err, "filtro de logs inválido, se usa '{}'", DEFAULT_FILTER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent_and_tolerates_bad_filters() {
        init(Some("denoise_server=[[["));
        init(Some("debug"));
        init(None);
        tracing::info!("logging listo");
    }
}
