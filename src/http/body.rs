//! # Recepción del Body
//! src/http/body.rs
//!
//! Lee un body de largo declarado (`Content-Length`) hacia un buffer propio
//! de tamaño exacto. Primero copia lo que ya llegó junto con los headers,
//! después sigue leyendo del socket hasta completar el largo.
//!
//! Las validaciones ocurren antes de reservar memoria: un upload declarado
//! de 10 MiB + 1 byte se rechaza sin tocar el allocator.

use std::io::{ErrorKind, Read};

use thiserror::Error;

use super::request::{find_header_end, header_value, HeaderValue};
use super::StatusCode;

/// Tamaño máximo de un upload (10 MiB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Errores al recibir un body
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("missing Content-Length header")]
    LengthRequired,

    #[error("invalid Content-Length: {0}")]
    InvalidLength(&'static str),

    #[error("declared body of {declared} bytes exceeds the {max} byte limit")]
    TooLarge { declared: u64, max: usize },

    #[error("header/body separator not found in the initial request bytes")]
    MissingSeparator,

    #[error("could not allocate {0} bytes for the body")]
    Allocation(usize),

    #[error("peer closed the connection after {received} of {expected} bytes")]
    Disconnected { received: usize, expected: usize },

    #[error("timed out after {received} of {expected} bytes")]
    TimedOut { received: usize, expected: usize },

    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl BodyError {
    /// Código de estado a enviar, o `None` si el peer ya no está
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            BodyError::LengthRequired => Some(StatusCode::LengthRequired),
            BodyError::InvalidLength(_) | BodyError::MissingSeparator => {
                Some(StatusCode::BadRequest)
            }
            BodyError::TooLarge { .. } => Some(StatusCode::PayloadTooLarge),
            BodyError::Allocation(_) => Some(StatusCode::InternalServerError),
            BodyError::Disconnected { .. } | BodyError::TimedOut { .. } | BodyError::Io(_) => None,
        }
    }
}

/// Parsea el valor de `Content-Length`
///
/// Solo dígitos ASCII seguidos inmediatamente por el fin de línea; cero,
/// overflow o basura al final son inválidos.
pub fn parse_content_length(header: HeaderValue<'_>) -> Result<u64, BodyError> {
    if !header.terminated {
        return Err(BodyError::InvalidLength("value is not followed by CRLF"));
    }
    if header.value.is_empty() {
        return Err(BodyError::InvalidLength("empty value"));
    }

    let mut length: u64 = 0;
    for &byte in header.value {
        if !byte.is_ascii_digit() {
            return Err(BodyError::InvalidLength("value is not a decimal number"));
        }
        length = length
            .checked_mul(10)
            .and_then(|n| n.checked_add(u64::from(byte - b'0')))
            .ok_or(BodyError::InvalidLength("value overflows"))?;
    }

    if length == 0 {
        return Err(BodyError::InvalidLength("zero length"));
    }
    Ok(length)
}

/// Recibe el body completo de un upload
///
/// * `initial` - bytes ya leídos del socket (request line + headers + inicio del body)
/// * `stream` - de donde leer el resto
/// * `max_size` - límite del body en bytes
pub fn receive_body<R: Read>(
    stream: &mut R,
    initial: &[u8],
    max_size: usize,
) -> Result<Vec<u8>, BodyError> {
    let header_end = find_header_end(initial);
    let head = match header_end {
        Some(end) => &initial[..end],
        None => initial,
    };

    let declared = header_value(head, "Content-Length").ok_or(BodyError::LengthRequired)?;
    let declared = parse_content_length(declared)?;

    let expected = match usize::try_from(declared) {
        Ok(len) if len <= max_size => len,
        _ => {
            return Err(BodyError::TooLarge {
                declared,
                max: max_size,
            })
        }
    };

    let body_start = header_end.ok_or(BodyError::MissingSeparator)?;

    let mut body = Vec::new();
    body.try_reserve_exact(expected)
        .map_err(|_| BodyError::Allocation(expected))?;

    // Lo que ya llegó, recortado al largo declarado
    let buffered = &initial[body_start..];
    let buffered = &buffered[..buffered.len().min(expected)];
    body.extend_from_slice(buffered);

    // El resto directo del socket a la capacidad ya reservada
    body.resize(expected, 0);
    let mut received = buffered.len();
    while received < expected {
        match stream.read(&mut body[received..]) {
            Ok(0) => return Err(BodyError::Disconnected { received, expected }),
            Ok(n) => received += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Err(BodyError::TimedOut { received, expected })
            }
            Err(e) => return Err(BodyError::Io(e)),
        }
    }

    tracing::debug!(bytes = expected, prebuffered = buffered.len(), "body recibido");
    Ok(body)
}
