//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Acepta conexiones y atiende exactamente un request por cada una.
//! Según la configuración, las conexiones se atienden de a una en el
//! thread del listener o cada una en su propio thread.
//!
//! Ciclo de vida de una conexión:
//!
//! ```text
//! accept → timeouts → receive_head → RequestLine → Router → graceful_close
//! ```

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::{Config, ConcurrencyMode};
use crate::error::ConnectionError;
use crate::http::{RequestLine, Response, StatusCode};
use crate::jobs::JobStore;
use crate::router::Router;
use crate::static_files::StaticRoot;

use super::io::{graceful_close, receive_head, send_response, MAX_REQUEST_SIZE};

/// Estado compartido entre conexiones
///
/// Se crea una vez en `Server::bind` y vive lo mismo que el servidor.
#[derive(Debug)]
pub struct AppContext {
    pub store: JobStore,
    pub static_root: StaticRoot,
    pub request_timeout: Duration,
    pub drain_timeout: Duration,
}

impl AppContext {
    pub fn new(static_root: StaticRoot, request_timeout: Duration, drain_timeout: Duration) -> Self {
        Self {
            store: JobStore::new(),
            static_root,
            request_timeout,
            drain_timeout,
        }
    }
}

/// Servidor HTTP de denoising
pub struct Server {
    listener: TcpListener,
    context: Arc<AppContext>,
    mode: ConcurrencyMode,
}

impl Server {
    /// Resuelve el directorio público y abre el socket de escucha
    ///
    /// Ambos errores son fatales al arrancar.
    pub fn bind(config: &Config) -> io::Result<Self> {
        let static_root = StaticRoot::new(&config.static_dir).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("invalid static dir '{}': {}", config.static_dir, e),
            )
        })?;

        let listener = TcpListener::bind(config.address())?;
        let context = AppContext::new(static_root, config.request_timeout(), config.drain_timeout());

        Ok(Self {
            listener,
            context: Arc::new(context),
            mode: config.concurrency,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop principal: bloquea el thread actual aceptando conexiones
    pub fn run(self) -> io::Result<()> {
        let address = self.local_addr()?;
        tracing::info!(
            %address,
            mode = ?self.mode,
            static_dir = %self.context.static_root.path().display(),
            "servidor escuchando"
        );

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    tracing::warn!(error = %e, "error al aceptar conexión");
                    continue;
                }
            };

            match self.mode {
                ConcurrencyMode::Sequential => handle_connection(stream, &self.context),
                ConcurrencyMode::Threaded => {
                    let context = Arc::clone(&self.context);
                    let spawned = thread::Builder::new()
                        .name("conn".to_string())
                        .spawn(move || handle_connection(stream, &context));
                    if let Err(e) = spawned {
                        tracing::error!(error = %e, "no se pudo crear el thread de la conexión");
                    }
                }
            }
        }

        Ok(())
    }
}

/// Atiende una conexión completa y la cierra
///
/// Ningún error sale de acá: cada resultado termina en el log y la
/// conexión siempre pasa por `graceful_close`.
pub fn handle_connection(mut stream: TcpStream, context: &AppContext) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let span = tracing::info_span!("conn", %peer);
    let _entered = span.enter();

    let start = Instant::now();
    if let Err(e) = configure(&stream, context.request_timeout) {
        tracing::warn!(error = %e, "no se pudieron configurar los timeouts");
    }

    match serve_request(&mut stream, context) {
        Ok(Some(status)) if status.is_server_error() => tracing::warn!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "conexión atendida con error interno"
        ),
        Ok(Some(status)) => tracing::debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "conexión atendida"
        ),
        Ok(None) => tracing::debug!("conexión cerrada sin datos"),
        Err(e) if e.is_fatal() => tracing::error!(error = %e, "conexión abortada"),
        Err(e) => tracing::warn!(error = %e, "request abandonado"),
    }

    graceful_close(stream, context.drain_timeout);
}

fn configure(stream: &TcpStream, timeout: Duration) -> io::Result<()> {
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;
    stream.set_nodelay(true)
}

/// Lee, parsea y despacha un request
///
/// `Ok(None)` si el peer cerró sin mandar nada.
fn serve_request(
    stream: &mut TcpStream,
    context: &AppContext,
) -> Result<Option<StatusCode>, ConnectionError> {
    let head = receive_head(stream, MAX_REQUEST_SIZE).map_err(ConnectionError::Receive)?;
    if head.is_empty() {
        return Ok(None);
    }

    let request = match RequestLine::parse_within(&head, MAX_REQUEST_SIZE) {
        Ok(request) => request,
        Err(e) => {
            tracing::info!(error = %e, "request line inválida");
            send_response(stream, &Response::error(StatusCode::BadRequest, &e.to_string()))?;
            return Ok(Some(StatusCode::BadRequest));
        }
    };

    let router = Router::new(&context.store, &context.static_root);
    let status = router.dispatch(stream, &request, &head)?;
    tracing::info!(
        method = request.method().as_str(),
        path = request.path(),
        status = status.as_u16(),
        "request"
    );
    Ok(Some(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::{Cursor, Read, Write};
    use std::net::Shutdown;
    use tempfile::TempDir;

    fn ephemeral_listener() -> TcpListener {
        TcpListener::bind("127.0.0.1:0").expect("bind")
    }

    fn test_context() -> (TempDir, Arc<AppContext>) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>denoise</h1>").unwrap();
        let root = StaticRoot::new(dir.path()).unwrap();
        let context = AppContext::new(root, Duration::from_secs(5), Duration::from_millis(200));
        (dir, Arc::new(context))
    }

    /// Atiende una conexión en otro thread y devuelve lo que recibió el cliente
    fn exchange(context: &Arc<AppContext>, request: &[u8]) -> Vec<u8> {
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let t = thread::spawn({
            let context = Arc::clone(context);
            move || {
                let (stream, _) = listener.accept().unwrap();
                handle_connection(stream, &context);
            }
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(request).unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        t.join().unwrap();
        buf
    }

    fn split(raw: &[u8]) -> (String, Vec<u8>) {
        let end = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap() + 4;
        (String::from_utf8_lossy(&raw[..end]).to_string(), raw[end..].to_vec())
    }

    fn upload_request(body: &[u8]) -> Vec<u8> {
        let mut raw = format!(
            "POST /images HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\n\r\n",
            body.len()
        )
        .into_bytes();
        raw.extend_from_slice(body);
        raw
    }

    fn noisy_png() -> Vec<u8> {
        let mut image = image::GrayImage::from_pixel(16, 16, image::Luma([100]));
        image.put_pixel(5, 5, image::Luma([255]));
        image.put_pixel(10, 3, image::Luma([0]));
        let mut out = Cursor::new(Vec::new());
        image.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_upload_then_fetch_result() {
        let (_dir, context) = test_context();

        let (head, body) = split(&exchange(&context, &upload_request(&noisy_png())));
        assert!(head.starts_with("HTTP/1.1 202 Accepted\r\n"), "{}", head);
        let receipt: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(receipt["status"], "pending");
        let id = receipt["id"].as_str().unwrap().to_string();
        assert!(head.contains(&format!("Location: /images/{}/\r\n", id)));

        let get = format!("GET /images/{}/ HTTP/1.1\r\n\r\n", id);
        let (head, png) = split(&exchange(&context, get.as_bytes()));
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Content-Type: image/png\r\n"));
        assert!(head.contains(&format!("Content-Length: {}\r\n", png.len())));

        let result = image::load_from_memory(&png).unwrap().into_luma8();
        assert_eq!(result.dimensions(), (16, 16));
        assert!(result.pixels().all(|p| p.0[0] == 100));
    }

    #[test]
    fn test_corrupt_upload_is_unprocessable() {
        let (_dir, context) = test_context();
        let (_, body) = split(&exchange(&context, &upload_request(b"GIF89a but not really")));
        let receipt: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let id = receipt["id"].as_str().unwrap();

        let get = format!("GET /images/{} HTTP/1.1\r\n\r\n", id);
        let (head, _) = split(&exchange(&context, get.as_bytes()));
        assert!(head.starts_with("HTTP/1.1 422 Unprocessable Entity\r\n"));
    }

    #[test]
    fn test_upload_protocol_errors() {
        let (_dir, context) = test_context();
        let cases: [(&[u8], &str); 3] = [
            (b"POST /images HTTP/1.1\r\n\r\n", "411 Length Required"),
            (b"POST /images HTTP/1.1\r\nContent-Length: 0\r\n\r\n", "400 Bad Request"),
            (
                b"POST /images HTTP/1.1\r\nContent-Length: 10485761\r\n\r\n",
                "413 Payload Too Large",
            ),
        ];

        for (request, expected) in cases {
            let (head, _) = split(&exchange(&context, request));
            assert!(head.starts_with(&format!("HTTP/1.1 {}\r\n", expected)), "{}", head);
        }
        assert!(context.store.is_empty());
    }

    #[test]
    fn test_result_errors() {
        let (_dir, context) = test_context();

        let (head, _) = split(&exchange(&context, b"GET /images/not-a-uuid HTTP/1.1\r\n\r\n"));
        assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));

        let unknown = b"GET /images/123e4567-e89b-42d3-a456-426614174000 HTTP/1.1\r\n\r\n";
        let (head, _) = split(&exchange(&context, unknown));
        assert!(head.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[test]
    fn test_static_and_unsupported_methods() {
        let (_dir, context) = test_context();

        let (head, body) = split(&exchange(&context, b"GET / HTTP/1.1\r\n\r\n"));
        assert!(head.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(head.contains("Content-Type: text/html"));
        assert_eq!(body, b"<h1>denoise</h1>");

        let (head, _) = split(&exchange(&context, b"GET /../../etc/passwd HTTP/1.1\r\n\r\n"));
        assert!(head.starts_with("HTTP/1.1 403 Forbidden\r\n"));

        let (head, _) = split(&exchange(&context, b"DELETE /images HTTP/1.1\r\n\r\n"));
        assert!(head.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
    }

    #[test]
    fn test_handle_connection_parse_error() {
        let (_dir, context) = test_context();

        // Bytes no-HTTP: la request line termina en el primer NUL
        let (head, _) = split(&exchange(&context, b"\x00\x01\x02\x03garbage"));
        assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));

        let long_method = b"SUPERLONGMETHOD / HTTP/1.1\r\n\r\n";
        let (head, _) = split(&exchange(&context, long_method));
        assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_request_line_longer_than_buffer_is_bad_request() {
        let (_dir, context) = test_context();

        // La lectura corta en MAX_REQUEST_SIZE en medio del path
        let mut request = b"GET /".to_vec();
        request.extend(std::iter::repeat(b'a').take(MAX_REQUEST_SIZE + 500));
        request.extend_from_slice(b" HTTP/1.1\r\n\r\n");

        let (head, _) = split(&exchange(&context, &request));
        assert!(head.starts_with("HTTP/1.1 400 Bad Request\r\n"), "{}", head);
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let (_dir, context) = test_context();
        let listener = ephemeral_listener();
        let addr = listener.local_addr().unwrap();

        let t = thread::spawn({
            let context = Arc::clone(&context);
            move || {
                let (stream, _) = listener.accept().unwrap();
                // El read retorna 0 y la conexión se cierra sin responder
                handle_connection(stream, &context);
            }
        });

        drop(TcpStream::connect(addr).unwrap());
        t.join().unwrap();
        assert!(context.store.is_empty());
    }

    #[test]
    fn test_peer_disconnect_mid_upload_leaves_no_job() {
        let (_dir, context) = test_context();
        let response = exchange(
            &context,
            b"POST /images HTTP/1.1\r\nContent-Length: 5000\r\n\r\nonly a few bytes",
        );
        assert!(response.is_empty());
        assert!(context.store.is_empty());
    }
}
