//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.1 y convertirlas a bytes.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 202 Accepted\r\n
//! Server: denoise-server\r\n
//! Connection: close\r\n
//! Location: /images/0f8c.../\r\n
//! Content-Length: 0\r\n
//! \r\n
//! ```
//!
//! Todas las respuestas llevan `Connection: close`: el servidor atiende
//! exactamente un request por conexión.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use denoise_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body_bytes(b"hola".to_vec());
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;

/// Valor del header `Server`
pub const SERVER_NAME: &str = "denoise-server";

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP
    status: StatusCode,

    /// Headers en orden de inserción (un nombre aparece una sola vez)
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin body con los headers comunes
    pub fn new(status: StatusCode) -> Self {
        let mut response = Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        };
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
        response.add_header("Content-Length", "0");
        response
    }

    /// Agrega un header. Si ya existe (sin distinguir mayúsculas), se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de [`Response::with_header`]
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(slot) => slot.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo desde bytes y recalcula `Content-Length`
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let len = self.body.len().to_string();
        self.add_header("Content-Length", &len);
        self
    }

    /// Declara el largo de un body que se enviará aparte (streaming)
    ///
    /// El body interno queda vacío; `head_bytes` anuncia `len` bytes.
    pub fn with_content_length(mut self, len: u64) -> Self {
        self.body.clear();
        self.add_header("Content-Length", &len.to_string());
        self
    }

    /// Crea una respuesta JSON con el código indicado
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        // Serializar un `Value` no puede fallar
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_body_bytes(body)
    }

    /// Crea una respuesta de error con mensaje JSON
    ///
    /// Formato del JSON: `{"error": "mensaje"}`
    ///
    /// # Ejemplo
    /// ```
    /// use denoise_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::UnprocessableEntity, "bad \"png\"");
    /// assert_eq!(response.body(), br#"{"error":"bad \"png\""}"#);
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::json(status, &serde_json::json!({ "error": message }))
    }

    /// Status line + headers + línea vacía, sin body
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(128);

        // 1. Status line
        result.extend_from_slice(format!("HTTP/1.1 {}\r\n", self.status).as_bytes());

        // 2. Headers
        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // 3. Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");
        result
    }

    /// Convierte la respuesta completa a bytes listos para el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = self.head_bytes();
        result.extend_from_slice(&self.body);
        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Busca un header (sin distinguir mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
