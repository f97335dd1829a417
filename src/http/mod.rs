//! # Módulo HTTP
//!
//! Subconjunto de HTTP/1.1 implementado a mano sobre `std::net`:
//!
//! - Tokenizado estricto de la request line
//! - Búsqueda de `Content-Length` y del separador de headers
//! - Recepción de bodies de largo declarado
//! - Construcción de responses y status codes
//!
//! ### Formato de Request
//!
//! ```text
//! POST /images HTTP/1.1\r\n
//! Content-Length: 5120\r\n
//! \r\n
//! <bytes>
//! ```
//!
//! Una conexión lleva exactamente un request; no hay keep-alive ni
//! chunked transfer encoding.

pub mod body;      // Recepción del body de uploads
pub mod request;   // Request line y headers
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use body::{receive_body, BodyError, MAX_UPLOAD_SIZE};
pub use request::{Method, RequestLine, RequestLineError};
pub use response::Response;
pub use status::StatusCode;
