// errors.rs
use thiserror::Error;

/// Fallos que puede devolver el servicio de aprovisionamiento.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
  /// El servicio rechazó los datos enviados; el mensaje se muestra tal cual.
  #[error("{0}")]
  Validation(String),
  /// El servicio no respondió o respondió con un error interno.
  #[error("Error de transporte: {0}")]
  Transport(String),
  #[error("No encontrado: {0}")]
  NotFound(String),
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    Self::Transport(format!("respuesta ilegible: {}", e))
  }
}
