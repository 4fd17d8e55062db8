// Archivo: service.rs
// Propósito: `GuideService`, la fachada que usa la interfaz para entrar en
// una guía, completar pasos, reiniciar y esperar estados de entidades.
use crate::config::GuideConfig;
use crate::engine::{StepActionAdapter, StepSequencer};
use crate::errors::GuideError;
use crate::options::{StepOptions, StepOptionsLoader};
use crate::polling;
use crate::step::{definition, StepPayload};
use guide_state::{GuideKind, SessionStore, StepId, WorkflowSession, WorkflowStateStore};
use log::{debug, info, warn};
use provisioning_api::{EntityKind, EntityStatus, ProvisioningApi};
use serde::Serialize;
use std::sync::Arc;

/// Lo que la interfaz necesita para mostrar una guía.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuideSnapshot {
  pub guide: GuideKind,
  pub current_step: StepId,
  /// Título del paso actual; vacío si la guía terminó.
  pub step_title: &'static str,
  pub session: WorkflowSession,
  pub options: StepOptions,
}

pub struct GuideService {
  state: WorkflowStateStore,
  sequencer: StepSequencer,
  adapter: StepActionAdapter,
  options: StepOptionsLoader,
  api: Arc<dyn ProvisioningApi>,
  config: GuideConfig,
}

impl GuideService {
  pub fn new(store: Arc<dyn SessionStore>, api: Arc<dyn ProvisioningApi>, config: GuideConfig) -> Self {
    Self { state: WorkflowStateStore::new(store),
           sequencer: StepSequencer::new(),
           adapter: StepActionAdapter::new(api.clone()),
           options: StepOptionsLoader::new(api.clone()),
           api,
           config }
  }

  pub fn config(&self) -> &GuideConfig {
    &self.config
  }

  /// Carga (o crea) la sesión de la guía y devuelve el paso actual con sus
  /// opciones. Si el paso guardado no coincidía con el derivado se corrige y
  /// se guarda.
  pub fn enter_guide(&self, session_key: &str, guide: GuideKind) -> Result<GuideSnapshot, GuideError> {
    let mut session = self.state.load(session_key, guide)?;
    if self.sequencer.reconcile(&mut session) {
      self.state.save(session_key, &session)?;
    }
    Ok(self.snapshot(session_key, session))
  }

  /// Completa `step` con `payload`.
  ///
  /// El paso inicial de una guía puede reenviarse en cualquier momento y
  /// reinicia la guía; cualquier otro debe ser el paso actual. Si la acción
  /// falla no se guarda nada.
  pub fn submit_step(&self,
                     session_key: &str,
                     guide: GuideKind,
                     step: StepId,
                     payload: StepPayload)
                     -> Result<GuideSnapshot, GuideError> {
    let mut session = self.state.load(session_key, guide)?;
    self.sequencer.reconcile(&mut session);

    if step == guide.initial_step() && session.current_step != step {
      info!("{}: se reenvía {} en la sesión '{}'; se reinicia la guía", guide, step, session_key);
      session = WorkflowSession::new(guide);
    } else if step != session.current_step {
      debug!("{}: se envió {} pero el paso actual es {}", guide, step, session.current_step);
      return Err(GuideError::StepOutOfOrder { expected: session.current_step, submitted: step });
    }

    let payload = self.with_cluster_from_guide(session_key, guide, payload)?;
    let outcome = self.adapter.perform(&session, step, &payload)?;
    self.sequencer.advance(&mut session, step, outcome)?;
    self.state.save(session_key, &session)?;
    info!("{}: paso {} completado en la sesión '{}'; siguiente {}",
          guide, step, session_key, session.current_step);
    Ok(self.snapshot(session_key, session))
  }

  /// Reinicia la guía si `confirm` es verdadero; si no, no hace nada.
  pub fn reset_guide(&self, session_key: &str, guide: GuideKind, confirm: bool) -> Result<(), GuideError> {
    if !confirm {
      debug!("{}: reinicio sin confirmar en la sesión '{}'; se ignora", guide, session_key);
      return Ok(());
    }
    self.state.reset(session_key, guide)?;
    info!("{}: guía reiniciada en la sesión '{}'", guide, session_key);
    Ok(())
  }

  /// Espera a que la entidad alcance alguno de los estados `targets` con la
  /// configuración de sondeo del servicio.
  pub fn wait_for_status(&self,
                         kind: EntityKind,
                         id: &str,
                         targets: &[EntityStatus])
                         -> Result<EntityStatus, GuideError> {
    polling::wait_for_status(self.api.as_ref(), kind, id, targets, &self.config.poll)
  }

  /// Al lanzar un trabajo sin cluster se usa el que sugiere el paso, es
  /// decir el de la guía de clusters si está activo o en error.
  fn with_cluster_from_guide(&self,
                             session_key: &str,
                             guide: GuideKind,
                             payload: StepPayload)
                             -> Result<StepPayload, GuideError> {
    match payload {
      StepPayload::LaunchJob(mut spec) if guide == GuideKind::JobExecution && spec.cluster_id.is_none() => {
        let cluster_guide = self.state.load(session_key, GuideKind::Cluster)?;
        spec.cluster_id = cluster_guide.cluster_id
                                       .as_deref()
                                       .and_then(|id| self.options.suggest(id))
                                       .map(|s| s.cluster_id);
        Ok(StepPayload::LaunchJob(spec))
      }
      other => Ok(other),
    }
  }

  fn snapshot(&self, session_key: &str, session: WorkflowSession) -> GuideSnapshot {
    let cluster_id = if session.current_step == StepId::JobLaunch {
      match self.state.load(session_key, GuideKind::Cluster) {
        Ok(cluster_guide) => cluster_guide.cluster_id,
        Err(e) => {
          warn!("no se pudo leer la guía de clusters de '{}': {}", session_key, e);
          None
        }
      }
    } else {
      None
    };
    let options = self.options.load(&session, cluster_id.as_deref());
    let step_title = definition(session.guide, session.current_step).map(|d| d.title).unwrap_or("");
    GuideSnapshot { guide: session.guide, current_step: session.current_step, step_title, session, options }
  }
}
