//! Crate `guide-state`: modelo de datos y almacenamiento de las guías
//!
//! Este crate define el estado persistente de una guía de aprovisionamiento
//! (`WorkflowSession`), el contrato del almacén de sesión (`SessionStore`),
//! el almacén tipado `WorkflowStateStore` y una implementación en memoria útil
//! para pruebas (`InMemorySessionStore`).
//!
//! Diseño resumido:
//! - Una instantánea por par `(session_key, GuideKind)`: cada guardado escribe
//!   la sesión completa (last-write-wins).
//! - El almacén crudo trabaja con `serde_json::Value`; la conversión a tipos
//!   fuertes ocurre sólo en `WorkflowStateStore`.
//! - `reset` es idempotente: equivale a guardar una sesión nueva.
//!
//! Ejemplo rápido:
//! ```rust
//! use guide_state::{GuideKind, InMemorySessionStore, StepId, WorkflowStateStore};
//! use std::sync::Arc;
//! let store = WorkflowStateStore::new(Arc::new(InMemorySessionStore::new()));
//! let session = store.load("sesion-1", GuideKind::Cluster).unwrap();
//! assert_eq!(session.current_step, StepId::PluginSelect);
//! ```
pub mod domain;
pub mod errors;
pub mod repository;
pub mod store;
pub mod stubs;

pub use domain::*;
pub use errors::*;
pub use repository::*;
pub use store::*;
pub use stubs::*;
