//! # Resolución de Paths Estáticos
//! src/static_files/resolver.rs
//!
//! Traduce el path de un request a un archivo dentro del directorio
//! público. Todo archivo servido tiene que quedar, ya canonicalizado,
//! debajo de la raíz canonicalizada: symlinks y `..` no permiten salir.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::http::request::PATH_MAX;
use crate::http::StatusCode;

/// Largo máximo de un componente de path (equivalente a `NAME_MAX`)
pub const NAME_MAX: usize = 255;

/// Archivo servido para `/`
const INDEX_FILE: &str = "index.html";

/// Motivos por los que un path no se sirve
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("path contains a parent reference")]
    Traversal,

    #[error("path is not absolute")]
    NotAbsolute,

    #[error("path is {0} bytes long")]
    TooLong(usize),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("path escapes the public directory")]
    OutsideRoot,
}

impl ResolveError {
    pub fn status(&self) -> StatusCode {
        match self {
            ResolveError::Traversal | ResolveError::OutsideRoot => StatusCode::Forbidden,
            ResolveError::NotAbsolute => StatusCode::BadRequest,
            ResolveError::TooLong(_) => StatusCode::UriTooLong,
            ResolveError::NotFound(_) => StatusCode::NotFound,
        }
    }
}

/// Raíz del sandbox de archivos estáticos
#[derive(Debug, Clone)]
pub struct StaticRoot {
    /// Ruta absoluta y canonicalizada
    root: PathBuf,
}

impl StaticRoot {
    /// Canonicaliza el directorio una sola vez, al arrancar
    ///
    /// Falla si el directorio no existe o no es un directorio.
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(dir.as_ref())?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Resuelve el path de un request a un archivo regular dentro de la raíz
    ///
    /// Los chequeos se hacen en este orden:
    /// 1. `..` en cualquier parte → `Traversal`
    /// 2. no empieza con `/` → `NotAbsolute`
    /// 3. más de `NAME_MAX` bytes → `TooLong`
    /// 4. `/` se reemplaza por `/index.html`
    /// 5. raíz + path de más de `PATH_MAX` bytes → `TooLong`
    /// 6. no se puede canonicalizar → `NotFound`
    /// 7. queda fuera de la raíz → `OutsideRoot`
    /// 8. no es un archivo regular → `NotFound`
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, ResolveError> {
        if request_path.contains("..") {
            return Err(ResolveError::Traversal);
        }
        if !request_path.starts_with('/') {
            return Err(ResolveError::NotAbsolute);
        }
        if request_path.len() > NAME_MAX {
            return Err(ResolveError::TooLong(request_path.len()));
        }

        let relative = match request_path {
            "/" => INDEX_FILE,
            other => other.trim_start_matches('/'),
        };

        let joined = self.root.join(relative);
        let joined_len = joined.as_os_str().len();
        if joined_len > PATH_MAX {
            return Err(ResolveError::TooLong(joined_len));
        }

        let canonical = fs::canonicalize(&joined)
            .map_err(|_| ResolveError::NotFound(request_path.to_string()))?;

        // `starts_with` de Path compara por componentes: `/srv/front2` no
        // está debajo de `/srv/front`
        if !canonical.starts_with(&self.root) {
            return Err(ResolveError::OutsideRoot);
        }

        match fs::metadata(&canonical) {
            Ok(meta) if meta.is_file() => Ok(canonical),
            _ => Err(ResolveError::NotFound(request_path.to_string())),
        }
    }
}

/// Adivina el `Content-Type` por la extensión del archivo
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "application/javascript",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
