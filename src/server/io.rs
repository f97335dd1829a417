//! # I/O sobre la Conexión
//! src/server/io.rs
//!
//! Helpers de bajo nivel sobre un stream ya conectado:
//!
//! - `send_all`: escribe el buffer completo reintentando interrupciones
//! - `receive_head`: lee el bloque inicial del request (máx. 2048 bytes)
//! - `graceful_close`: half-close, drenado, half-close, close
//!
//! El cierre ordenado evita que el peer reciba un RST si todavía le
//! quedaban bytes por mandar (por ejemplo, un upload rechazado con 413).

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

use crate::error::ConnectionError;
use crate::http::request::find_header_end;
use crate::http::Response;

/// Tamaño máximo del bloque inicial de un request
pub const MAX_REQUEST_SIZE: usize = 2048;

/// Timeouts seguidos tolerados por `send_all` antes de rendirse
const MAX_SEND_STALLS: usize = 4;

/// Escribe todo `buf` en el stream
///
/// `Interrupted` se reintenta siempre; `WouldBlock`/`TimedOut` hasta
/// `MAX_SEND_STALLS` veces seguidas. Retorna la cantidad de bytes escritos.
pub fn send_all<W: Write>(stream: &mut W, buf: &[u8]) -> io::Result<usize> {
    let mut remaining = buf;
    let mut stalls = 0;

    while !remaining.is_empty() {
        match stream.write(remaining) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    "peer stopped accepting data",
                ))
            }
            Ok(n) => {
                remaining = &remaining[n..];
                stalls = 0;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e)
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
                    && stalls < MAX_SEND_STALLS =>
            {
                stalls += 1;
            }
            Err(e) => return Err(e),
        }
    }

    stream.flush()?;
    Ok(buf.len())
}

/// Envía una respuesta completa (headers + body)
pub fn send_response<W: Write>(stream: &mut W, response: &Response) -> Result<(), ConnectionError> {
    send_all(stream, &response.to_bytes())
        .map(|_| ())
        .map_err(ConnectionError::Write)
}

/// Lee el bloque inicial de un request
///
/// Sigue leyendo hasta ver `\r\n\r\n`, llenar `max_size` bytes o que el
/// peer cierre. Si vence el timeout con datos ya recibidos, se trabaja con
/// lo que llegó.
pub fn receive_head<R: Read>(stream: &mut R, max_size: usize) -> io::Result<Vec<u8>> {
    let mut buf = vec![0u8; max_size];
    let mut filled = 0;

    while filled < max_size {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                if find_header_end(&buf[..filled]).is_some() {
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e)
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
                    && filled > 0 =>
            {
                break
            }
            Err(e) => return Err(e),
        }
    }

    buf.truncate(filled);
    Ok(buf)
}

/// Cierra la conexión de forma ordenada
///
/// `NotConnected` en cualquier paso significa que el peer ya cerró y no
/// se considera un error.
pub fn graceful_close(stream: TcpStream, drain_timeout: Duration) {
    match stream.shutdown(Shutdown::Write) {
        Ok(()) => {
            drain(&stream, drain_timeout);
            if let Err(e) = stream.shutdown(Shutdown::Read) {
                if e.kind() != ErrorKind::NotConnected {
                    tracing::warn!(error = %e, "no se pudo cerrar el lado de lectura");
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotConnected => {}
        Err(e) => tracing::warn!(error = %e, "no se pudo cerrar el lado de escritura"),
    }
    // `drop` cierra el descriptor
}

/// Descarta lo que el peer siga mandando hasta EOF o hasta `timeout`
fn drain(mut stream: &TcpStream, timeout: Duration) {
    if let Err(e) = stream.set_read_timeout(Some(timeout)) {
        tracing::debug!(error = %e, "no se pudo ajustar el timeout de drenado");
    }

    let deadline = Instant::now() + timeout;
    let mut leftovers = [0u8; 1024];
    let mut discarded = 0usize;

    while Instant::now() < deadline {
        match stream.read(&mut leftovers) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock
                        | ErrorKind::TimedOut
                        | ErrorKind::ConnectionReset
                        | ErrorKind::NotConnected
                ) =>
            {
                break
            }
            Err(e) => {
                tracing::warn!(error = %e, "fallo al drenar el socket");
                break;
            }
        }
    }

    if discarded > 0 {
        tracing::debug!(bytes = discarded, "bytes descartados al cerrar");
    }
}
