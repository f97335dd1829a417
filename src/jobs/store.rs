//! # Almacén de Jobs
//! src/jobs/store.rs
//!
//! Tabla en memoria `id → ImageJob`. Es la única dueña de los buffers de
//! los jobs: todo se libera cuando el store se destruye al apagar el servidor.
//!
//! El mapa vive detrás de un `Mutex` para que el mismo store sirva con
//! conexiones secuenciales o con un thread por conexión. El pipeline nunca
//! corre con el lock tomado: lee el original (clon barato), procesa, y
//! solo bloquea para instalar el resultado.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use super::job::{ImageJob, JobState, JobStatus};

/// Errores de operaciones sobre el store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateId(String),

    #[error("job {0} does not exist")]
    UnknownId(String),

    #[error("job {0} already left the pending state")]
    AlreadySettled(String),

    #[error("out of memory while storing a job")]
    Exhausted,
}

/// Conteo de jobs por estado
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub pending: usize,
    pub processed: usize,
    pub failed: usize,
}

/// Store de jobs en memoria
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: Mutex<HashMap<String, ImageJob>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Un panic en otro thread no invalida el mapa: cada operación deja
    /// el mapa consistente antes de soltar el lock.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, ImageJob>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inserta un job nuevo bajo su propio id
    ///
    /// Un id nunca se reutiliza: si ya existe, el job se rechaza.
    pub fn put(&self, job: ImageJob) -> Result<(), StoreError> {
        let mut key = String::new();
        key.try_reserve_exact(job.id().len())
            .map_err(|_| StoreError::Exhausted)?;
        key.push_str(job.id());

        let mut jobs = self.lock();
        if jobs.contains_key(&key) {
            return Err(StoreError::DuplicateId(key));
        }
        jobs.try_reserve(1).map_err(|_| StoreError::Exhausted)?;
        jobs.insert(key, job);
        Ok(())
    }

    /// Obtiene una copia del job (los buffers se comparten, no se copian)
    pub fn get(&self, id: &str) -> Option<ImageJob> {
        self.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lock().contains_key(id)
    }

    /// Instala el PNG procesado
    pub fn complete(&self, id: &str, png: Vec<u8>) -> Result<(), StoreError> {
        self.settle(id, JobState::Processed(Arc::new(png)))
    }

    /// Marca el job como fallido de forma permanente
    pub fn fail(&self, id: &str, reason: String) -> Result<(), StoreError> {
        self.settle(id, JobState::Failed(reason))
    }

    /// Única transición permitida: `Pending` → terminal
    fn settle(&self, id: &str, state: JobState) -> Result<(), StoreError> {
        let mut jobs = self.lock();
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownId(id.to_string()))?;
        if job.status() != JobStatus::Pending {
            return Err(StoreError::AlreadySettled(id.to_string()));
        }
        job.settle(state);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.lock()
            .values()
            .fold(StoreStats::default(), |mut stats, job| {
                match job.status() {
                    JobStatus::Pending => stats.pending += 1,
                    JobStatus::Processed => stats.processed += 1,
                    JobStatus::Failed => stats.failed += 1,
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_put_and_get() {
        let store = JobStore::new();
        let job = ImageJob::new(vec![1, 2, 3]);
        let id = job.id().to_string();

        store.put(job).unwrap();
        assert!(store.contains(&id));
        assert_eq!(store.len(), 1);

        let fetched = store.get(&id).unwrap();
        assert_eq!(fetched.original(), &[1, 2, 3]);
        assert_eq!(fetched.status(), JobStatus::Pending);
    }

    #[test]
    fn test_unknown_id() {
        let store = JobStore::new();
        assert!(store.get("123e4567-e89b-42d3-a456-426614174000").is_none());
        assert!(!store.contains("anything"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let store = JobStore::new();
        let id = "123e4567-e89b-42d3-a456-426614174000".to_string();
        store.put(ImageJob::with_id(id.clone(), vec![1])).unwrap();

        let err = store.put(ImageJob::with_id(id.clone(), vec![2])).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(id.clone()));
        // El original no se pisa
        assert_eq!(store.get(&id).unwrap().original(), &[1]);
    }

    #[test]
    fn test_complete_is_single_transition() {
        let store = JobStore::new();
        let job = ImageJob::new(vec![0]);
        let id = job.id().to_string();
        store.put(job).unwrap();

        store.complete(&id, vec![7, 7]).unwrap();
        let job = store.get(&id).unwrap();
        assert_eq!(job.processed(), Some(&[7u8, 7][..]));

        assert_eq!(
            store.fail(&id, "late".to_string()),
            Err(StoreError::AlreadySettled(id.clone()))
        );
        assert_eq!(
            store.complete("missing", vec![]),
            Err(StoreError::UnknownId("missing".to_string()))
        );
    }

    #[test]
    fn test_fail_is_terminal() {
        let store = JobStore::new();
        let job = ImageJob::new(vec![0]);
        let id = job.id().to_string();
        store.put(job).unwrap();

        store.fail(&id, "corrupt".to_string()).unwrap();
        assert_eq!(store.get(&id).unwrap().status(), JobStatus::Failed);
        assert!(store.complete(&id, vec![1]).is_err());
    }

    #[test]
    fn test_snapshot_survives_completion() {
        let store = JobStore::new();
        let job = ImageJob::new(vec![5; 10]);
        let id = job.id().to_string();
        store.put(job).unwrap();

        let before = store.get(&id).unwrap();
        store.complete(&id, vec![1]).unwrap();
        assert_eq!(before.status(), JobStatus::Pending);
        assert_eq!(store.get(&id).unwrap().status(), JobStatus::Processed);
    }

    #[test]
    fn test_concurrent_writers_on_distinct_ids() {
        let store = Arc::new(JobStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let job = ImageJob::new(vec![i as u8; 16]);
                    let id = job.id().to_string();
                    store.put(job).unwrap();
                    assert!(store.get(&id).unwrap().processed().is_none());
                    store.complete(&id, vec![i as u8]).unwrap();
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            store.stats(),
            StoreStats {
                pending: 0,
                processed: 8,
                failed: 0
            }
        );
    }
}
