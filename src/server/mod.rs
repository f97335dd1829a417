//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto
//! 2. Acepta conexiones entrantes
//! 3. Lee el request y lo despacha al handler
//! 4. Cierra cada conexión de forma ordenada
//!
//! `io` tiene las primitivas de socket que usan tanto el servidor como
//! los handlers.

pub mod io;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use tcp::{handle_connection, AppContext, Server};
