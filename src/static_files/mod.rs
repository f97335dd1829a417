//! # Archivos Estáticos
//!
//! Todo `GET` que no sea `/images/...` se sirve desde el directorio
//! público (`srv/front` por defecto).

pub mod handler;
pub mod resolver;

pub use handler::{static_handler, CHUNK_SIZE};
pub use resolver::{content_type, ResolveError, StaticRoot, NAME_MAX};
