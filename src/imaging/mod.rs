//! # Procesamiento de Imágenes
//!
//! Denoising sincrónico de uploads:
//!
//! - `filter`: grilla de pixeles y filtro de mediana 3x3
//! - `sink`: buffer creciente donde escribe el encoder
//! - `pipeline`: decode → filtro → PNG

pub mod filter;
pub mod pipeline;
pub mod sink;

pub use filter::{PixelGrid, MEDIAN_WINDOW};
pub use pipeline::{denoise, PipelineError};
pub use sink::EncodeSink;
