//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! Implementa los endpoints de imágenes:
//! - `POST /images` - upload + procesamiento sincrónico
//! - `GET /images/{id}` - resultado del procesamiento
//!
//! Los handlers escriben directo en el stream: el upload responde `202`
//! *antes* de procesar, y el resultado se envía sin copiar el PNG.

use std::io::{Read, Write};
use std::time::Instant;

use serde_json::json;

use crate::error::ConnectionError;
use crate::http::{receive_body, Response, StatusCode, MAX_UPLOAD_SIZE};
use crate::imaging::denoise;
use crate::jobs::job::{is_canonical_id, ImageJob, JobState, JobStatus};
use crate::jobs::store::JobStore;
use crate::server::io::{send_all, send_response};

/// Prefijo de las rutas de resultados
pub const IMAGES_PREFIX: &str = "/images/";

/// Handler para `POST /images`
///
/// 1. Recibe el body (`Content-Length` obligatorio, máx. 10 MiB)
/// 2. Crea el job y responde `202 Accepted` con `Location`
/// 3. Procesa la imagen antes de devolver el control
///
/// # Ejemplo de response
/// ```text
/// HTTP/1.1 202 Accepted
/// Location: /images/2f1d6c1e-5c1b-4a53-9a43-6c2b8f0f7d11/
///
/// {"id":"2f1d6c1e-5c1b-4a53-9a43-6c2b8f0f7d11","status":"pending"}
/// ```
pub fn upload_handler<S: Read + Write>(
    stream: &mut S,
    initial: &[u8],
    store: &JobStore,
) -> Result<StatusCode, ConnectionError> {
    let body = match receive_body(stream, initial, MAX_UPLOAD_SIZE) {
        Ok(body) => body,
        Err(err) => match err.status() {
            Some(status) => {
                tracing::warn!(error = %err, status = status.as_u16(), "upload rechazado");
                send_response(stream, &Response::error(status, &err.to_string()))?;
                return Ok(status);
            }
            // El peer ya no está: no hay a quién responder
            None => return Err(err.into()),
        },
    };

    let job = ImageJob::new(body);
    let id = job.id().to_string();
    let size = job.original_size();

    if let Err(err) = store.put(job) {
        tracing::error!(error = %err, job_id = %id, "no se pudo guardar el job");
        let response = Response::error(StatusCode::InternalServerError, "Could not store upload");
        send_response(stream, &response)?;
        return Ok(StatusCode::InternalServerError);
    }
    tracing::info!(job_id = %id, bytes = size, "imagen recibida");

    let receipt = Response::json(
        StatusCode::Accepted,
        &json!({ "id": id, "status": JobStatus::Pending }),
    )
    .with_header("Location", &format!("{}{}/", IMAGES_PREFIX, id));

    // Aunque el 202 no llegue, el job ya existe y debe quedar resuelto
    let sent = send_response(stream, &receipt);
    process_job(store, &id);
    sent.map(|()| StatusCode::Accepted)
}

/// Corre el pipeline sobre un job pendiente y guarda el resultado
pub fn process_job(store: &JobStore, id: &str) {
    let Some(job) = store.get(id) else {
        tracing::warn!(job_id = %id, "job desaparecido antes de procesar");
        return;
    };

    let start = Instant::now();
    let outcome = match denoise(job.original()) {
        Ok(png) => {
            let bytes = png.len();
            store.complete(id, png).map(|()| {
                tracing::info!(
                    job_id = %id,
                    bytes,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "imagen procesada"
                );
            })
        }
        Err(err) => {
            tracing::warn!(job_id = %id, error = %err, "no se pudo procesar la imagen");
            store.fail(id, err.to_string())
        }
    };

    if let Err(err) = outcome {
        tracing::error!(job_id = %id, error = %err, "no se pudo actualizar el job");
    }

    let stats = store.stats();
    tracing::debug!(
        pending = stats.pending,
        processed = stats.processed,
        failed = stats.failed,
        "estado del store"
    );
}

/// Extrae el id de `/images/{id}` o `/images/{id}/`
///
/// # Ejemplo
/// ```
/// use denoise_server::jobs::handlers::parse_job_path;
///
/// let id = "123e4567-e89b-42d3-a456-426614174000";
/// assert_eq!(parse_job_path(&format!("/images/{}/", id)), Some(id));
/// assert_eq!(parse_job_path("/images/not-a-uuid"), None);
/// ```
pub fn parse_job_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(IMAGES_PREFIX)?;
    let id = rest.strip_suffix('/').unwrap_or(rest);
    is_canonical_id(id).then_some(id)
}

/// Handler para `GET /images/{id}`
///
/// - id malformado → `400` (sin consultar el store)
/// - id desconocido → `404`
/// - pendiente → `202` sin body
/// - procesado → `200` + `image/png`
/// - fallido → `422` con el motivo
pub fn result_handler<W: Write>(
    stream: &mut W,
    path: &str,
    store: &JobStore,
) -> Result<StatusCode, ConnectionError> {
    let Some(id) = parse_job_path(path) else {
        let response = Response::error(StatusCode::BadRequest, "Malformed image identifier");
        send_response(stream, &response)?;
        return Ok(StatusCode::BadRequest);
    };

    let Some(job) = store.get(id) else {
        let response = Response::error(StatusCode::NotFound, &format!("Image not found: {}", id));
        send_response(stream, &response)?;
        return Ok(StatusCode::NotFound);
    };

    match job.state() {
        JobState::Pending => {
            send_response(stream, &Response::new(StatusCode::Accepted))?;
            Ok(StatusCode::Accepted)
        }
        JobState::Processed(png) => {
            let head = Response::new(StatusCode::Ok)
                .with_header("Content-Type", "image/png")
                .with_content_length(png.len() as u64)
                .head_bytes();
            send_all(stream, &head).map_err(ConnectionError::Write)?;
            send_all(stream, png).map_err(ConnectionError::Write)?;
            Ok(StatusCode::Ok)
        }
        JobState::Failed(reason) => {
            let response = Response::error(StatusCode::UnprocessableEntity, reason);
            send_response(stream, &response)?;
            Ok(StatusCode::UnprocessableEntity)
        }
    }
}
