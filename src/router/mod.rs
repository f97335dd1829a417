//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Este módulo decide qué handler atiende un request a partir del método
//! y del path.
//!
//! ## Arquitectura
//!
//! ```text
//! RequestLine → Router → Route → Handler → stream
//! ```
//!
//! | Método | Path            | Ruta          |
//! |--------|-----------------|---------------|
//! | POST   | `/images`       | `Upload`      |
//! | GET    | `/images/...`   | `ImageResult` |
//! | GET    | cualquier otro  | `Static`      |
//! | otro   | -               | `NotImplemented` (501) |
//!
//! Los handlers escriben directamente en el stream (el upload responde
//! `202` antes de procesar), así que el router no construye la respuesta:
//! solo elige el destino y lo invoca.

use std::io::{Read, Write};

use crate::error::ConnectionError;
use crate::http::{Method, RequestLine, Response, StatusCode};
use crate::jobs::handlers::IMAGES_PREFIX;
use crate::jobs::{result_handler, upload_handler, JobStore};
use crate::server::io::send_response;
use crate::static_files::{static_handler, StaticRoot};

/// Path del endpoint de upload
pub const UPLOAD_PATH: &str = "/images";

/// Destino de un request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `POST /images`
    Upload,

    /// `GET /images/{id}`
    ImageResult,

    /// Cualquier otro `GET`
    Static,

    /// Método sin soporte (o `POST` fuera de `/images`)
    NotImplemented,
}

impl Route {
    /// Clasifica un request por método y path
    ///
    /// # Ejemplo
    /// ```
    /// use denoise_server::http::Method;
    /// use denoise_server::router::Route;
    ///
    /// assert_eq!(Route::for_request(&Method::POST, "/images"), Route::Upload);
    /// assert_eq!(Route::for_request(&Method::GET, "/style.css"), Route::Static);
    /// ```
    pub fn for_request(method: &Method, path: &str) -> Self {
        match method {
            Method::POST if path == UPLOAD_PATH => Route::Upload,
            Method::GET if path.starts_with(IMAGES_PREFIX) => Route::ImageResult,
            Method::GET => Route::Static,
            _ => Route::NotImplemented,
        }
    }
}

/// Recursos compartidos que necesitan los handlers
pub struct Router<'a> {
    store: &'a JobStore,
    static_root: &'a StaticRoot,
}

impl<'a> Router<'a> {
    pub fn new(store: &'a JobStore, static_root: &'a StaticRoot) -> Self {
        Self { store, static_root }
    }

    /// Ejecuta el handler que corresponde al request
    ///
    /// * `initial` - bytes del request ya leídos (el upload los necesita
    ///   para encontrar `Content-Length` y el inicio del body)
    ///
    /// Retorna el status enviado, o el error que impidió responder.
    pub fn dispatch<S: Read + Write>(
        &self,
        stream: &mut S,
        request: &RequestLine,
        initial: &[u8],
    ) -> Result<StatusCode, ConnectionError> {
        let path = request.path();

        match Route::for_request(request.method(), path) {
            Route::Upload => upload_handler(stream, initial, self.store),
            Route::ImageResult => result_handler(stream, path, self.store),
            Route::Static => static_handler(stream, path, self.static_root),
            Route::NotImplemented => {
                let response = Response::error(
                    StatusCode::NotImplemented,
                    &format!("Method not implemented: {} {}", request.method().as_str(), path),
                );
                send_response(stream, &response)?;
                Ok(StatusCode::NotImplemented)
            }
        }
    }
}
