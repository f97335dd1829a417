//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que emite el servidor. Solo se definen los que
//! realmente aparecen en el protocolo de imágenes y archivos estáticos:
//!
//! - **2xx**: Éxito (200 OK, 202 Accepted)
//! - **4xx**: Error del cliente (400, 403, 404, 411, 413, 414, 422)
//! - **5xx**: Error del servidor (500, 501)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 202 Accepted - Imagen recibida / todavía en procesamiento
    Accepted = 202,

    /// 400 Bad Request - Request o identificador malformado
    BadRequest = 400,

    /// 403 Forbidden - Intento de salir del sandbox
    Forbidden = 403,

    /// 404 Not Found - Archivo o job inexistente
    NotFound = 404,

    /// 411 Length Required - Upload sin `Content-Length`
    LengthRequired = 411,

    /// 413 Payload Too Large - Upload mayor al máximo permitido
    PayloadTooLarge = 413,

    /// 414 URI Too Long - Path demasiado largo para el sistema de archivos
    UriTooLong = 414,

    /// 422 Unprocessable Entity - La imagen subida no se pudo procesar
    UnprocessableEntity = 422,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError = 500,

    /// 501 Not Implemented - Método no soportado
    NotImplemented = 501,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use denoise_server::http::StatusCode;
    /// assert_eq!(StatusCode::Accepted.as_u16(), 202);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use denoise_server::http::StatusCode;
    /// assert_eq!(StatusCode::PayloadTooLarge.reason_phrase(), "Payload Too Large");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Accepted => "Accepted",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::LengthRequired => "Length Required",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::UriTooLong => "URI Too Long",
            StatusCode::UnprocessableEntity => "Unprocessable Entity",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        let code = self.as_u16();
        (500..600).contains(&code)
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "202 Accepted"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_values() {
        assert_eq!(StatusCode::Ok.as_u16(), 200);
        assert_eq!(StatusCode::Accepted.as_u16(), 202);
        assert_eq!(StatusCode::LengthRequired.as_u16(), 411);
        assert_eq!(StatusCode::UriTooLong.as_u16(), 414);
        assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(StatusCode::Forbidden.reason_phrase(), "Forbidden");
        assert_eq!(StatusCode::LengthRequired.reason_phrase(), "Length Required");
        assert_eq!(StatusCode::UriTooLong.reason_phrase(), "URI Too Long");
    }

    #[test]
    fn test_categories() {
        assert!(StatusCode::NotImplemented.is_server_error());
        assert!(StatusCode::InternalServerError.is_server_error());
        assert!(!StatusCode::UnprocessableEntity.is_server_error());
        assert!(!StatusCode::NotFound.is_server_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(StatusCode::Accepted.to_string(), "202 Accepted");
        assert_eq!(StatusCode::NotImplemented.to_string(), "501 Not Implemented");
    }
}
