//! # Denoise Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo, implementado sobre `std::net`, que recibe
//! imágenes, les aplica un filtro de mediana 3x3 y devuelve el resultado
//! como PNG. También sirve el frontend estático desde un directorio
//! sandboxeado.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Request line, `Content-Length`, bodies y responses
//! - `server`: Listener TCP, ciclo de vida de la conexión y primitivas de socket
//! - `router`: Elección del handler según método y path
//! - `jobs`: Store en memoria y handlers de `/images`
//! - `imaging`: Decode, filtro de mediana y encode PNG
//! - `static_files`: Resolución segura de paths y envío de archivos
//! - `config` / `logging`: CLI, variables de entorno y `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use denoise_server::config::Config;
//! use denoise_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el loop del servidor");
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod imaging;
pub mod jobs;
pub mod logging;
pub mod router;
pub mod server;
pub mod static_files;
