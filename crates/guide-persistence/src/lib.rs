//! Almacén durable de sesiones de guía sobre Diesel.
//!
//! Expone `DieselSessionStore`, que implementa `guide_state::SessionStore`
//! guardando cada instantánea como texto JSON en la tabla `guide_sessions`.
//! Las migraciones van embebidas y se aplican al construir el almacén.

mod session_persistence;
pub mod schema;

pub use session_persistence::{new_from_env, DieselSessionStore, MIGRATIONS};
