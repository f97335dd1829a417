//! # Sistema de Jobs
//!
//! Cada upload crea un job que se procesa en la misma conexión,
//! justo después de responder `202 Accepted`.
//!
//! ## Endpoints
//!
//! - `POST /images` - Subir una imagen
//! - `GET /images/{id}` - Obtener el PNG procesado

pub mod handlers;
pub mod job;
pub mod store;

pub use handlers::{parse_job_path, process_job, result_handler, upload_handler};
pub use job::{is_canonical_id, ImageJob, JobState, JobStatus};
pub use store::{JobStore, StoreError, StoreStats};
