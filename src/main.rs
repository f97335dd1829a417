//! # Denoise Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, inicializa el logging y corre el servidor
//! hasta que el proceso termina.

use clap::Parser;

use denoise_server::config::Config;
use denoise_server::logging;
use denoise_server::server::Server;

fn main() {
    let config = Config::parse();
    logging::init(config.log_filter.as_deref());

    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "configuración inválida");
        std::process::exit(1);
    }

    tracing::info!(
        address = %config.address(),
        static_dir = %config.static_dir,
        concurrency = ?config.concurrency,
        "iniciando servidor"
    );

    let server = match Server::bind(&config) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!(error = %e, "no se pudo iniciar el servidor");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!(error = %e, "error fatal");
        std::process::exit(1);
    }
}
