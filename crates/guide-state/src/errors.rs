// Archivo: errors.rs
// Propósito: definir los errores del almacén de sesiones y el alias Result<T>
// usado por las APIs del crate.
use thiserror::Error;
/// Errores comunes del almacenamiento de sesiones.
///
/// - `NotFound`: la clave no existe (sólo lo devuelven backends que lo
///   distinguen; `reset` lo trata como éxito).
/// - `Storage`: el almacenamiento subyacente no está disponible.
/// - `Serialization`: la instantánea no pudo (de)serializarse.
/// - `Invalid`: un valor textual no corresponde a ningún tipo conocido.
#[derive(Error, Debug)]
pub enum StoreError {
  /// Clave no encontrada en el almacén.
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Error genérico de almacenamiento (BD, caché, etc.).
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  /// Error al convertir la sesión desde/hacia JSON.
  #[error("Error de serialización: {0}")]
  Serialization(#[from] serde_json::Error),
  /// Valor inválido (por ejemplo un identificador de paso desconocido).
  #[error("Valor inválido: {0}")]
  Invalid(String),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, StoreError>;
