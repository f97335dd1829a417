//! # Handler de Archivos Estáticos
//! src/static_files/handler.rs

use std::fs::File;
use std::io::{ErrorKind, Read, Write};

use crate::error::ConnectionError;
use crate::http::{Response, StatusCode};
use crate::server::io::{send_all, send_response};

use super::resolver::{content_type, StaticRoot};

/// Tamaño de cada bloque leído del archivo
pub const CHUNK_SIZE: usize = 2048;

/// Handler para `GET /<path>`
///
/// Envía los headers con el tamaño del archivo y después el contenido en
/// bloques de `CHUNK_SIZE`. Un error de lectura a mitad de camino no se
/// puede reportar al cliente: la conexión se aborta.
pub fn static_handler<W: Write>(
    stream: &mut W,
    path: &str,
    root: &StaticRoot,
) -> Result<StatusCode, ConnectionError> {
    let file_path = match root.resolve(path) {
        Ok(file_path) => file_path,
        Err(err) => {
            let status = err.status();
            tracing::debug!(path, error = %err, "archivo estático rechazado");
            send_response(stream, &Response::error(status, &err.to_string()))?;
            return Ok(status);
        }
    };

    let opened = File::open(&file_path).and_then(|file| {
        let len = file.metadata()?.len();
        Ok((file, len))
    });
    let (mut file, len) = match opened {
        Ok(opened) => opened,
        Err(err) => {
            tracing::debug!(path, error = %err, "no se pudo abrir el archivo");
            let response = Response::error(StatusCode::NotFound, &format!("File not found: {}", path));
            send_response(stream, &response)?;
            return Ok(StatusCode::NotFound);
        }
    };

    let head = Response::new(StatusCode::Ok)
        .with_header("Content-Type", content_type(&file_path))
        .with_content_length(len)
        .head_bytes();
    send_all(stream, &head).map_err(ConnectionError::Write)?;

    let mut chunk = [0u8; CHUNK_SIZE];
    let mut sent: u64 = 0;
    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ConnectionError::FileRead(e)),
        };
        send_all(stream, &chunk[..n]).map_err(ConnectionError::Write)?;
        sent += n as u64;
    }

    if sent != len {
        // El archivo cambió entre `metadata` y la lectura
        return Err(ConnectionError::FileRead(std::io::Error::new(
            ErrorKind::UnexpectedEof,
            format!("sent {} of {} announced bytes", sent, len),
        )));
    }

    Ok(StatusCode::Ok)
}
