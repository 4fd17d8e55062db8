// Archivo: stubs.rs
// Propósito: implementación en memoria de `SessionStore` para pruebas y
// wiring rápido. No es durable.
use crate::errors::Result;
use crate::repository::SessionStore;
use dashmap::DashMap;
use serde_json::Value as JsonValue;

/// Almacén de sesiones en memoria.
///
/// Cada clave se bloquea de forma independiente, así que varias sesiones de
/// usuarios distintos pueden usarlo a la vez desde hilos diferentes.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    entries: DashMap<String, JsonValue>,
}

impl InMemorySessionStore {
    /// Crea un almacén vacío.
    pub fn new() -> Self {
        Self { entries: DashMap::new() }
    }

    /// Número de claves guardadas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<JsonValue>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}
