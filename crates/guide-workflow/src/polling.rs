// Archivo: polling.rs
// Propósito: esperar a que una entidad remota alcance un estado (cluster
// activo, trabajo terminado) consultando su estado periódicamente.
use crate::errors::GuideError;
use log::debug;
use provisioning_api::{EntityKind, EntityStatus, ProvisioningApi};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};

/// Intervalo y límite de la espera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
  pub interval_ms: u64,
  pub timeout_ms: u64,
}

impl Default for PollConfig {
  fn default() -> Self {
    PollConfig { interval_ms: 2_000, timeout_ms: 600_000 }
  }
}

/// Consulta `get_entity_status` hasta que el estado esté en `targets`.
///
/// Termina con `EntityFailed` si la entidad llega a un estado de fallo que no
/// está entre los esperados, y con `Timeout` si se agota el plazo. Los
/// errores del servicio se propagan sin reintentar.
pub fn wait_for_status(api: &dyn ProvisioningApi,
                       kind: EntityKind,
                       id: &str,
                       targets: &[EntityStatus],
                       config: &PollConfig)
                       -> Result<EntityStatus, GuideError> {
  let started = Instant::now();
  let timeout = Duration::from_millis(config.timeout_ms);
  loop {
    let status = api.get_entity_status(kind, id)?;
    if targets.contains(&status) {
      return Ok(status);
    }
    if status.is_failure() {
      return Err(GuideError::EntityFailed { kind, id: id.to_string(), status: status.to_string() });
    }
    let elapsed = started.elapsed();
    if elapsed >= timeout {
      return Err(GuideError::Timeout { kind, id: id.to_string(), last: status.to_string() });
    }
    // la última espera no pasa del plazo
    let pause = Duration::from_millis(config.interval_ms).min(timeout - elapsed);
    debug!("{} {} en estado {}; nueva consulta en {} ms", kind, id, status, pause.as_millis());
    thread::sleep(pause);
  }
}
