use crate::config::GuideConfig;
use crate::service::GuideService;
use crate::GuideError;
use guide_state::{InMemorySessionStore, SessionStore};
use log::{info, warn};
use provisioning_api::{ApiStubs, ProvisioningApi};
use provisioning_client::{ClientConfig, RestProvisioningClient};
use std::sync::Arc;

/// Fábrica de `GuideService`.
///
/// `from_env` conecta el almacén Diesel y el cliente REST según las variables
/// de entorno; `in_memory` usa el almacén en memoria y el servicio de
/// aprovisionamiento de ejemplo para pruebas y demostraciones.
pub struct GuideFactory;

impl GuideFactory {
  /// Construye el servicio desde el entorno.
  ///
  /// - almacén: `guide_persistence::new_from_env` (`GUIDE_DB_URL`,
  ///   `DATABASE_URL`, `GUIDE_DB_POOL_SIZE`).
  /// - API: `RestProvisioningClient` si `PROVISIONING_API_URL` está
  ///   definida; si no, el servicio en memoria de ejemplo.
  pub fn from_env() -> Result<GuideService, GuideError> {
    let store: Arc<dyn SessionStore> = Arc::new(guide_persistence::new_from_env()?);
    let api: Arc<dyn ProvisioningApi> = match ClientConfig::from_env()? {
      Some(cfg) => {
        info!("servicio de aprovisionamiento en {}", cfg.base_url);
        Arc::new(RestProvisioningClient::new(cfg)?)
      }
      None => {
        warn!("PROVISIONING_API_URL no definida; se usa el servicio de aprovisionamiento en memoria");
        Arc::new(ApiStubs::sample_api())
      }
    };
    Ok(GuideService::new(store, api, GuideConfig::from_env()?))
  }

  pub fn in_memory() -> GuideService {
    Self::with_api(Arc::new(ApiStubs::sample_api()))
  }

  /// Servicio en memoria sobre la API indicada.
  pub fn with_api(api: Arc<dyn ProvisioningApi>) -> GuideService {
    GuideService::new(Arc::new(InMemorySessionStore::new()), api, GuideConfig::default())
  }
}
