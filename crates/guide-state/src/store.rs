// Archivo: store.rs
// Propósito: implementar `WorkflowStateStore`, la capa tipada sobre un
// `SessionStore` que carga, guarda y reinicia instantáneas de
// `WorkflowSession`.
use crate::domain::{GuideKind, WorkflowSession};
use crate::errors::{Result, StoreError};
use crate::repository::SessionStore;
use log::{debug, warn};
use std::sync::Arc;

/// Almacén tipado del progreso de las guías.
///
/// Cada guía de cada sesión ocupa una clave propia
/// (`guide:{guide}:{session_key}`), de modo que reiniciar una guía no toca la
/// otra.
pub struct WorkflowStateStore {
    store: Arc<dyn SessionStore>,
}

impl WorkflowStateStore {
    /// Crea el almacén inyectando el `SessionStore` subyacente.
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Clave bajo la que se guarda la guía `guide` de la sesión
    /// `session_key`.
    pub fn storage_key(session_key: &str, guide: GuideKind) -> String {
        format!("guide:{}:{}", guide, session_key)
    }

    /// Devuelve la sesión existente o una nueva si no hay nada guardado.
    ///
    /// Una instantánea ilegible o de otra guía se descarta y se devuelve una
    /// sesión nueva; sólo los fallos del almacenamiento se propagan.
    pub fn load(&self, session_key: &str, guide: GuideKind) -> Result<WorkflowSession> {
        let key = Self::storage_key(session_key, guide);
        let value = match self.store.get(&key)? {
            Some(v) => v,
            None => {
                debug!("sin estado previo para {}; se crea una sesión nueva", key);
                return Ok(WorkflowSession::new(guide));
            }
        };
        match serde_json::from_value::<WorkflowSession>(value) {
            Ok(session) if session.guide == guide => Ok(session),
            Ok(session) => {
                warn!("la instantánea {} pertenece a la guía {}; se descarta", key, session.guide);
                Ok(WorkflowSession::new(guide))
            }
            Err(e) => {
                warn!("instantánea corrupta en {}: {}; se descarta", key, e);
                Ok(WorkflowSession::new(guide))
            }
        }
    }

    /// Persiste la instantánea completa (last-write-wins).
    pub fn save(&self, session_key: &str, session: &WorkflowSession) -> Result<()> {
        let key = Self::storage_key(session_key, session.guide);
        let value = serde_json::to_value(session)?;
        self.store.set(&key, value)
    }

    /// Equivale a guardar una sesión nueva. Es idempotente: un `NotFound` del
    /// backend se considera éxito.
    pub fn reset(&self, session_key: &str, guide: GuideKind) -> Result<()> {
        match self.save(session_key, &WorkflowSession::new(guide)) {
            Err(StoreError::NotFound(what)) => {
                debug!("reset sobre sesión inexistente ({}); nada que hacer", what);
                Ok(())
            }
            other => other,
        }
    }
}
