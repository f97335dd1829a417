//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la configuración del servidor con soporte para
//! argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./denoise_server --port 8080 \
//!   --static-dir srv/front \
//!   --concurrency threaded
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 STATIC_DIR=srv/front ./denoise_server
//! ```

use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Cómo se atienden las conexiones aceptadas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ConcurrencyMode {
    /// Una conexión a la vez, en el thread del listener
    #[default]
    Sequential,

    /// Un thread por conexión
    Threaded,
}

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "denoise_server")]
#[command(about = "Servidor HTTP que elimina ruido de imágenes con un filtro de mediana")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio público de archivos estáticos
    #[arg(long = "static-dir", default_value = "srv/front", env = "STATIC_DIR")]
    pub static_dir: String,

    // === Timeouts ===

    /// Timeout de lectura/escritura mientras se atiende el request (segundos)
    #[arg(long = "request-timeout-secs", default_value = "15", env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: u64,

    /// Timeout del drenado al cerrar la conexión (segundos)
    #[arg(long = "drain-timeout-secs", default_value = "2", env = "DRAIN_TIMEOUT_SECS")]
    pub drain_timeout_secs: u64,

    /// Modelo de atención de conexiones
    #[arg(long, value_enum, default_value_t = ConcurrencyMode::Sequential, env = "CONCURRENCY")]
    pub concurrency: ConcurrencyMode,

    /// Filtro de logs (sintaxis de `RUST_LOG`, ej. `denoise_server=debug`)
    #[arg(long = "log-filter", env = "RUST_LOG")]
    pub log_filter: Option<String>,
}

impl Config {
    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use denoise_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.drain_timeout_secs)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.static_dir.trim().is_empty() {
            return Err("Static dir must not be empty".to_string());
        }

        // Un timeout de 0 en `set_read_timeout` es un error de std
        if self.request_timeout_secs == 0 {
            return Err("Request timeout must be > 0".to_string());
        }
        if self.drain_timeout_secs == 0 {
            return Err("Drain timeout must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            static_dir: "srv/front".to_string(),
            request_timeout_secs: 15,
            drain_timeout_secs: 2,
            concurrency: ConcurrencyMode::Sequential,
            log_filter: None,
        }
    }
}
