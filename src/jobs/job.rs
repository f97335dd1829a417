//! # Estructura de Job
//! src/jobs/job.rs
//!
//! Un job representa una imagen subida y el resultado de procesarla.
//! Los buffers se guardan detrás de `Arc` para que leer un job (clonarlo)
//! no copie megabytes de datos.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

/// Largo del identificador canónico (`8-4-4-4-12`)
pub const ID_LEN: usize = 36;

/// Posiciones de los guiones dentro del identificador
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Estado público de un job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Imagen guardada, todavía sin resultado
    Pending,

    /// Resultado PNG disponible
    Processed,

    /// La imagen no se pudo procesar; nunca tendrá resultado
    Failed,
}

/// Estado interno con los datos asociados a cada etapa
#[derive(Debug, Clone)]
pub enum JobState {
    Pending,

    /// PNG completo; su tamaño es el largo del buffer
    Processed(Arc<Vec<u8>>),

    /// Motivo del fallo del pipeline
    Failed(String),
}

/// Representa un job individual
#[derive(Debug, Clone)]
pub struct ImageJob {
    /// ID único del job (UUID v4 en minúsculas con guiones)
    id: String,

    /// Bytes exactamente como se subieron
    original: Arc<Vec<u8>>,

    state: JobState,
}

impl ImageJob {
    /// Crea un job pendiente con un identificador nuevo
    pub fn new(original: Vec<u8>) -> Self {
        Self::with_id(Uuid::new_v4().hyphenated().to_string(), original)
    }

    /// Crea un job pendiente con un identificador dado
    pub fn with_id(id: String, original: Vec<u8>) -> Self {
        Self {
            id,
            original: Arc::new(original),
            state: JobState::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn original(&self) -> &[u8] {
        &self.original
    }

    pub fn original_size(&self) -> usize {
        self.original.len()
    }

    pub fn state(&self) -> &JobState {
        &self.state
    }

    pub fn status(&self) -> JobStatus {
        match self.state {
            JobState::Pending => JobStatus::Pending,
            JobState::Processed(_) => JobStatus::Processed,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }

    /// Bytes procesados, si existen
    pub fn processed(&self) -> Option<&[u8]> {
        match &self.state {
            JobState::Processed(png) => Some(png),
            _ => None,
        }
    }

    pub fn processed_size(&self) -> Option<usize> {
        self.processed().map(<[u8]>::len)
    }

    /// Reemplaza el estado; el store garantiza que solo se sale de `Pending`
    pub(crate) fn settle(&mut self, state: JobState) {
        self.state = state;
    }
}

/// Verifica la gramática del identificador: hex minúscula con guiones en 8/13/18/23
///
/// # Ejemplo
/// ```
/// use denoise_server::jobs::job::is_canonical_id;
///
/// assert!(is_canonical_id("123e4567-e89b-42d3-a456-426614174000"));
/// assert!(!is_canonical_id("123E4567-E89B-42D3-A456-426614174000"));
/// assert!(!is_canonical_id("not-a-uuid"));
/// ```
pub fn is_canonical_id(candidate: &str) -> bool {
    candidate.len() == ID_LEN
        && candidate.bytes().enumerate().all(|(i, b)| {
            if HYPHEN_POSITIONS.contains(&i) {
                b == b'-'
            } else {
                matches!(b, b'0'..=b'9' | b'a'..=b'f')
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_pending() {
        let job = ImageJob::new(vec![1, 2, 3]);
        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.original(), &[1, 2, 3]);
        assert_eq!(job.original_size(), 3);
        assert_eq!(job.processed(), None);
        assert_eq!(job.processed_size(), None);
    }

    #[test]
    fn test_generated_ids_are_canonical_and_unique() {
        let a = ImageJob::new(Vec::new());
        let b = ImageJob::new(Vec::new());
        assert!(is_canonical_id(a.id()), "{}", a.id());
        assert!(is_canonical_id(b.id()), "{}", b.id());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_processed_size_matches_buffer() {
        let mut job = ImageJob::new(vec![0]);
        job.settle(JobState::Processed(Arc::new(vec![9; 42])));
        assert_eq!(job.status(), JobStatus::Processed);
        assert_eq!(job.processed_size(), Some(42));
    }

    #[test]
    fn test_id_grammar() {
        assert!(!is_canonical_id("123e4567-e89b-42d3-a456-42661417400")); // 35
        assert!(!is_canonical_id("123e4567-e89b-42d3-a456-4266141740000")); // 37
        assert!(!is_canonical_id("123e4567ae89b-42d3-a456-426614174000")); // guion movido
        assert!(!is_canonical_id("123e4567-e89b-42d3-a456-42661417400g"));
        assert!(!is_canonical_id("------------------------------------"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&JobStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&JobStatus::Failed).unwrap(), "\"failed\"");
    }
}
