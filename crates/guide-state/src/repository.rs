// Archivo: repository.rs
// Propósito: definir el trait `SessionStore`, el contrato mínimo que debe
// implementar cualquier almacén de sesión (memoria, Diesel, etc.).
use crate::errors::Result;
use serde_json::Value as JsonValue;

/// Almacén clave/valor por sesión de navegador.
///
/// La clave es opaca y la suministra el framework que rodea a las guías. Las
/// operaciones deben ser atómicas respecto a las garantías del almacenamiento
/// subyacente; no se exige control de concurrencia adicional.
pub trait SessionStore: Send + Sync {
    /// Devuelve el valor guardado bajo `key`, o `None` si no existe.
    fn get(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Guarda (o reemplaza) el valor bajo `key`.
    fn set(&self, key: &str, value: JsonValue) -> Result<()>;

    /// Elimina la clave. Devuelve `true` si existía.
    fn remove(&self, key: &str) -> Result<bool>;
}
