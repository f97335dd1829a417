//! # Pipeline de Imágenes
//! src/imaging/pipeline.rs
//!
//! decode → filtro de mediana → PNG.
//!
//! El número de canales lo decide el decoder (gris, gris+alpha, RGB, RGBA);
//! profundidades mayores a 8 bits se reducen a 8 manteniendo los canales.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use thiserror::Error;

use super::filter::{grid_len, GridError, PixelGrid};
use super::sink::EncodeSink;

/// Errores del pipeline. Cualquiera deja al job en estado `Failed`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("upload is empty")]
    Empty,

    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("unsupported channel count: {0}")]
    UnsupportedChannels(u8),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("could not encode PNG: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decodifica una imagen desde memoria a una grilla de 8 bits por canal
pub fn decode(bytes: &[u8]) -> Result<PixelGrid, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::Empty);
    }

    let image = image::load_from_memory(bytes).map_err(PipelineError::Decode)?;
    let width = image.width() as usize;
    let height = image.height() as usize;
    let channels = image.color().channel_count();

    // Validar antes de materializar el buffer de 8 bits
    grid_len(width, height, usize::from(channels))?;

    let data = match channels {
        1 => image.into_luma8().into_raw(),
        2 => image.into_luma_alpha8().into_raw(),
        3 => image.into_rgb8().into_raw(),
        4 => image.into_rgba8().into_raw(),
        other => return Err(PipelineError::UnsupportedChannels(other)),
    };

    Ok(PixelGrid::new(width, height, usize::from(channels), data)?)
}

/// Codifica la grilla como PNG en un buffer en memoria
pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>, PipelineError> {
    let color = match grid.channels() {
        1 => ExtendedColorType::L8,
        2 => ExtendedColorType::La8,
        3 => ExtendedColorType::Rgb8,
        4 => ExtendedColorType::Rgba8,
        other => return Err(PipelineError::UnsupportedChannels(other as u8)),
    };

    let overflow = || GridError::Overflow {
        width: grid.width(),
        height: grid.height(),
        channels: grid.channels(),
    };
    let width = u32::try_from(grid.width()).map_err(|_| overflow())?;
    let height = u32::try_from(grid.height()).map_err(|_| overflow())?;

    let mut sink = EncodeSink::new();
    PngEncoder::new(&mut sink)
        .write_image(grid.data(), width, height, color)
        .map_err(PipelineError::Encode)?;

    Ok(sink.into_bytes())
}

/// Pipeline completo: bytes subidos → PNG filtrado
pub fn denoise(bytes: &[u8]) -> Result<Vec<u8>, PipelineError> {
    let grid = decode(bytes)?;
    tracing::debug!(
        width = grid.width(),
        height = grid.height(),
        channels = grid.channels(),
        "imagen decodificada"
    );
    encode_png(&grid.median_filter())
}
