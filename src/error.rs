//! # Errores de Conexión
//! src/error.rs
//!
//! Los errores de protocolo (4xx) y de recursos (500) se responden en el
//! handler y no llegan hasta acá. Lo que sí sube es lo que impide
//! terminar la respuesta:
//!
//! - el peer se fue o no mandó datos a tiempo → se abandona en silencio
//! - una escritura falló con la respuesta a medias → se aborta la conexión

use std::io;

use thiserror::Error;

use crate::http::BodyError;

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to receive request: {0}")]
    Receive(#[source] io::Error),

    #[error("upload abandoned: {0}")]
    Upload(#[from] BodyError),

    #[error("failed to write response: {0}")]
    Write(#[source] io::Error),

    #[error("failed to read file after the header was sent: {0}")]
    FileRead(#[source] io::Error),
}

impl ConnectionError {
    /// `true` si la respuesta ya había empezado a enviarse
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConnectionError::Write(_) | ConnectionError::FileRead(_))
    }
}
