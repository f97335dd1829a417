//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! Parser mínimo y estricto. Del request solo interesan:
//!
//! 1. **Request Line**: `METHOD /path VERSION` (la versión se ignora)
//! 2. **Headers**: únicamente para ubicar `Content-Length` en uploads
//! 3. **Empty Line**: `\r\n\r\n`, separa headers del body
//!
//! ```text
//! POST /images HTTP/1.1\r\n
//! Content-Length: 5120\r\n
//! \r\n
//! <bytes de la imagen>
//! ```
//!
//! Todo trabaja sobre `&[u8]`: el buffer inicial puede traer parte de un
//! body binario, así que no se asume UTF-8 fuera de la request line.

use thiserror::Error;

/// Largo máximo del método (`PROPFIND` y similares entran; más largo es basura)
pub const MAX_METHOD_LEN: usize = 9;

/// Largo máximo del path (equivalente a `PATH_MAX` en Linux)
pub const PATH_MAX: usize = 4096;

/// Separador entre headers y body
const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP que el router distingue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// GET - Archivos estáticos y resultados de jobs
    GET,

    /// POST - Upload de imágenes
    POST,

    /// Cualquier otro token; el router responde 501
    Other(String),
}

impl Method {
    fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::GET,
            "POST" => Method::POST,
            other => Method::Other(other.to_string()),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::Other(token) => token,
        }
    }
}

/// Errores de la request line. Todos terminan en `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestLineError {
    #[error("empty request line")]
    Empty,

    #[error("request line has no path")]
    MissingPath,

    #[error("method token is {0} bytes (max {MAX_METHOD_LEN})")]
    MethodTooLong(usize),

    #[error("path token is {0} bytes (max {PATH_MAX})")]
    PathTooLong(usize),

    #[error("request line is not valid UTF-8")]
    NotUtf8,

    #[error("request line fills the {0}-byte buffer without a terminator")]
    Truncated(usize),
}

/// Primera línea de un request ya tokenizada
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    path: String,
}

impl RequestLine {
    /// Extrae método y path de la primera línea del buffer
    ///
    /// La línea termina en el primer `\n` o `\0`; el `\r` final cuenta como
    /// espacio. Tokens extra (la versión HTTP) se ignoran.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use denoise_server::http::request::{Method, RequestLine};
    ///
    /// let line = RequestLine::parse(b"POST /images HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc").unwrap();
    /// assert_eq!(line.method(), &Method::POST);
    /// assert_eq!(line.path(), "/images");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, RequestLineError> {
        Self::parse_within(buffer, usize::MAX)
    }

    /// Igual que [`RequestLine::parse`], pero sabiendo que `buffer` se leyó
    /// con un tope de `capacity` bytes
    ///
    /// Si la línea llena todo el tope sin `\n` ni `\0`, el último token
    /// quedó cortado por la lectura y el request se rechaza con
    /// [`RequestLineError::Truncated`].
    pub fn parse_within(buffer: &[u8], capacity: usize) -> Result<Self, RequestLineError> {
        let line_end = match buffer.iter().position(|&b| b == b'\n' || b == b'\0') {
            Some(pos) => pos,
            None if buffer.len() >= capacity => {
                return Err(RequestLineError::Truncated(capacity))
            }
            None => buffer.len(),
        };

        let mut tokens = buffer[..line_end]
            .split(|b| b.is_ascii_whitespace())
            .filter(|token| !token.is_empty());

        let method = tokens.next().ok_or(RequestLineError::Empty)?;
        let path = tokens.next().ok_or(RequestLineError::MissingPath)?;

        if method.len() > MAX_METHOD_LEN {
            return Err(RequestLineError::MethodTooLong(method.len()));
        }
        if path.len() > PATH_MAX {
            return Err(RequestLineError::PathTooLong(path.len()));
        }

        let method = std::str::from_utf8(method).map_err(|_| RequestLineError::NotUtf8)?;
        let path = std::str::from_utf8(path).map_err(|_| RequestLineError::NotUtf8)?;

        Ok(Self {
            method: Method::from_token(method),
            path: path.to_string(),
        })
    }

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Obtiene el path tal como vino en el request
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Valor crudo de un header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderValue<'a> {
    /// Bytes después de `:` sin los espacios iniciales
    pub value: &'a [u8],

    /// `true` si la línea terminaba en `\r\n` dentro del buffer
    pub terminated: bool,
}

/// Busca `needle` dentro de `haystack`
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Offset del primer byte del body (justo después de `\r\n\r\n`)
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    find(buffer, HEADER_TERMINATOR).map(|pos| pos + HEADER_TERMINATOR.len())
}

/// Busca un header por nombre (sin distinguir mayúsculas)
///
/// Recorre las líneas terminadas en `\r\n` que siguen a la request line y
/// se detiene en la primera línea vacía. La última línea puede venir sin
/// terminador si el buffer se cortó; eso queda reflejado en
/// [`HeaderValue::terminated`].
pub fn header_value<'a>(head: &'a [u8], name: &str) -> Option<HeaderValue<'a>> {
    // Saltar la request line
    let mut rest = &head[find(head, b"\r\n")? + 2..];

    loop {
        let (line, terminated, next) = match find(rest, b"\r\n") {
            Some(pos) => (&rest[..pos], true, &rest[pos + 2..]),
            None => (rest, false, &rest[rest.len()..]),
        };

        if line.is_empty() {
            return None;
        }

        if let Some(colon) = line.iter().position(|&b| b == b':') {
            if line[..colon].eq_ignore_ascii_case(name.as_bytes()) {
                let value = &line[colon + 1..];
                let start = value
                    .iter()
                    .position(|&b| b != b' ' && b != b'\t')
                    .unwrap_or(value.len());
                return Some(HeaderValue {
                    value: &value[start..],
                    terminated,
                });
            }
        }

        if !terminated {
            return None;
        }
        rest = next;
    }
}
