use guide_state::{StepId, StoreError};
use provisioning_api::{ApiError, EntityKind};
use provisioning_client::ClientConfigError;
use thiserror::Error;

/// Mensaje que ve el usuario cuando el servicio no responde.
pub const TRANSPORT_USER_MESSAGE: &str =
  "No se pudo contactar con el servicio de aprovisionamiento. Inténtelo de nuevo más tarde.";

// Errores de las guías.
//
// Los errores del servicio remoto se separan en validación (el mensaje se
// muestra tal cual) y transporte (se muestra un mensaje genérico). Ninguno de
// los dos modifica la sesión guardada.
#[derive(Error, Debug)]
pub enum GuideError {
  /// Datos rechazados, localmente o por el servicio.
  #[error("{0}")]
  Validation(String),

  /// El servicio no respondió o falló internamente.
  #[error("Error de transporte: {0}")]
  Transport(String),

  #[error("No encontrado: {0}")]
  NotFound(String),

  /// Se envió un paso que no es el actual.
  #[error("Paso fuera de orden: se esperaba {expected}, se recibió {submitted}")]
  StepOutOfOrder { expected: StepId, submitted: StepId },

  /// La acción enviada no corresponde al paso.
  #[error("El paso {step} no acepta la acción '{payload}'")]
  InvalidPayload { step: StepId, payload: &'static str },

  /// Error de programación: el resultado no encaja con el paso o falta un
  /// campo que la secuencia garantiza.
  #[error("Transición inválida: {0}")]
  InvalidTransition(String),

  #[error("Error de almacenamiento: {0}")]
  Store(#[from] StoreError),

  #[error("Error de serializacion: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("Tiempo de espera agotado: {kind} {id} sigue en estado {last}")]
  Timeout { kind: EntityKind, id: String, last: String },

  #[error("{kind} {id} terminó en estado {status}")]
  EntityFailed { kind: EntityKind, id: String, status: String },

  #[error("Configuración inválida: {0}")]
  Config(String),
}

impl From<ApiError> for GuideError {
  fn from(e: ApiError) -> Self {
    match e {
      ApiError::Validation(m) => GuideError::Validation(m),
      ApiError::Transport(m) => GuideError::Transport(m),
      ApiError::NotFound(m) => GuideError::NotFound(m),
    }
  }
}

impl From<ClientConfigError> for GuideError {
  fn from(e: ClientConfigError) -> Self {
    GuideError::Config(e.to_string())
  }
}

impl GuideError {
  /// Texto a mostrar al usuario.
  pub fn user_message(&self) -> String {
    match self {
      GuideError::Validation(m) | GuideError::NotFound(m) => m.clone(),
      GuideError::Transport(_) | GuideError::Timeout { .. } => TRANSPORT_USER_MESSAGE.to_string(),
      GuideError::Store(_) | GuideError::Serialization(_) | GuideError::InvalidTransition(_) => {
        "Error interno de la guía. Reinicie la guía e inténtelo de nuevo.".to_string()
      }
      other => other.to_string(),
    }
  }

  /// Errores que no cambian nada y que el usuario puede corregir reenviando.
  pub fn is_recoverable(&self) -> bool {
    matches!(self,
             GuideError::Validation(_)
             | GuideError::Transport(_)
             | GuideError::NotFound(_)
             | GuideError::StepOutOfOrder { .. }
             | GuideError::InvalidPayload { .. })
  }
}
