//! # Sink de Codificación
//! src/imaging/sink.rs
//!
//! Buffer de solo-append que recibe los chunks que produce el encoder PNG.
//! Crece solo cuando un chunk no entra y la reserva es fallible: si no hay
//! memoria, el `write` falla y el contenido previo queda intacto.

use std::collections::TryReserveError;
use std::io::{self, Write};

/// Buffer creciente que el encoder consume como `io::Write`
#[derive(Debug, Default)]
pub struct EncodeSink {
    buffer: Vec<u8>,
}

impl EncodeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Agrega un chunk completo o nada
    pub fn append(&mut self, chunk: &[u8]) -> Result<(), TryReserveError> {
        self.append_with(chunk, Vec::<u8>::try_reserve)
    }

    /// `append` con la estrategia de reserva como parámetro
    fn append_with<F>(&mut self, chunk: &[u8], reserve: F) -> Result<(), TryReserveError>
    where
        F: FnOnce(&mut Vec<u8>, usize) -> Result<(), TryReserveError>,
    {
        if chunk.is_empty() {
            return Ok(());
        }
        // Reservar antes de copiar: si falla, `buffer` no cambió
        reserve(&mut self.buffer, chunk.len())?;
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    fn write_with<F>(&mut self, buf: &[u8], reserve: F) -> io::Result<usize>
    where
        F: FnOnce(&mut Vec<u8>, usize) -> Result<(), TryReserveError>,
    {
        self.append_with(buf, reserve)
            .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
        Ok(buf.len())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Entrega los bytes acumulados
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl Write for EncodeSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_with(buf, Vec::<u8>::try_reserve)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length_write_does_not_allocate() {
        let mut sink = EncodeSink::new();
        assert_eq!(sink.write(&[]).unwrap(), 0);
        assert!(sink.is_empty());
        assert_eq!(sink.into_bytes().capacity(), 0);
    }

    #[test]
    fn test_first_chunk_and_appends() {
        let mut sink = EncodeSink::new();
        sink.write_all(b"\x89PNG").unwrap();
        sink.write_all(b"").unwrap();
        sink.write_all(b"\r\n\x1a\n").unwrap();
        assert_eq!(sink.len(), 8);
        assert_eq!(sink.as_slice(), b"\x89PNG\r\n\x1a\n");
    }

    /// Reserva que siempre falla, como si el allocator no tuviera memoria
    fn exhausted(buffer: &mut Vec<u8>, _additional: usize) -> Result<(), TryReserveError> {
        // Un Vec no puede superar isize::MAX bytes: esta reserva falla sin abortar
        buffer.try_reserve(usize::MAX)
    }

    #[test]
    fn test_failed_append_leaves_buffer_untouched() {
        let mut sink = EncodeSink::new();
        sink.append(b"keep").unwrap();

        assert!(sink.append_with(b"more data", exhausted).is_err());
        assert_eq!(sink.as_slice(), b"keep");
        assert_eq!(sink.len(), 4);

        // Después del fallo se puede seguir escribiendo
        sink.append(b"!").unwrap();
        assert_eq!(sink.as_slice(), b"keep!");
    }

    #[test]
    fn test_failed_write_reports_out_of_memory() {
        let mut sink = EncodeSink::new();
        sink.write_all(b"IHDR").unwrap();

        let err = sink.write_with(b"IDAT", exhausted).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::OutOfMemory);
        assert_eq!(sink.as_slice(), b"IHDR");
    }

    #[test]
    fn test_zero_length_append_skips_reservation() {
        let mut sink = EncodeSink::new();
        assert!(sink.append_with(b"", exhausted).is_ok());
        assert!(sink.is_empty());
    }
}
