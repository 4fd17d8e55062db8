use crate::errors::GuideError;
use crate::step::{definition, definitions_for, StepDefinition, StepOutcome};
use guide_state::{StepId, WorkflowSession};
use log::{debug, error, warn};

/// Lógica pura de secuenciación de las guías.
///
/// No hace llamadas externas ni toca el almacén: decide el paso actual a
/// partir de los campos acumulados y aplica los resultados de cada paso.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepSequencer;

impl StepSequencer {
  pub fn new() -> Self {
    StepSequencer
  }

  /// Primer paso de la guía con algo pendiente que no se salta, o
  /// `Complete`.
  pub fn current_step(&self, session: &WorkflowSession) -> StepId {
    definitions_for(session.guide).iter()
                                  .find(|d| !d.is_satisfied(session) && !self.is_skipped(d, session))
                                  .map(|d| d.step_id)
                                  .unwrap_or(StepId::Complete)
  }

  /// Evalúa la regla de salto. Un error al evaluarla equivale a "no se
  /// salta".
  pub fn is_skipped(&self, def: &StepDefinition, session: &WorkflowSession) -> bool {
    match def.skip.evaluate(session) {
      Ok(skipped) => skipped,
      Err(e) => {
        debug!("regla de salto de {} no evaluable ({}); no se salta", def.step_id, e);
        false
      }
    }
  }

  /// Aplica el resultado de `completed_step` y recalcula el paso actual.
  ///
  /// Las colecciones sólo crecen; un id repetido no se duplica.
  pub fn advance(&self,
                 session: &mut WorkflowSession,
                 completed_step: StepId,
                 outcome: StepOutcome)
                 -> Result<(), GuideError> {
    if outcome.step() != completed_step || definition(session.guide, completed_step).is_none() {
      error!("resultado {:?} no corresponde al paso {} de la guía {}", outcome, completed_step, session.guide);
      return Err(GuideError::InvalidTransition(format!("el resultado {:?} no pertenece al paso {} de la guía {}",
                                                       outcome, completed_step, session.guide)));
    }
    match outcome {
      StepOutcome::PluginChosen(choice) => session.selected_plugin = Some(choice),
      StepOutcome::ImageRegistered { image_id } => session.registered_image_id = Some(image_id),
      StepOutcome::NodeGroupTemplateAdded { template_id } => {
        if !session.node_group_template_ids.contains(&template_id) {
          session.node_group_template_ids.push(template_id);
        }
      }
      StepOutcome::NodeGroupsFinished => session.node_groups_done = true,
      StepOutcome::ClusterTemplateCreated { cluster_template_id } => {
        session.cluster_template_id = Some(cluster_template_id)
      }
      StepOutcome::ClusterLaunched { cluster_id } => session.cluster_id = Some(cluster_id),
      StepOutcome::JobTypeChosen(job_type) => session.job_type = Some(job_type),
      StepOutcome::DataSourceAdded { data_source_id } => {
        if !session.data_source_ids.contains(&data_source_id) {
          session.data_source_ids.push(data_source_id);
        }
      }
      StepOutcome::DataSourcesFinished => session.data_sources_done = true,
      StepOutcome::JobTemplateCreated { job_template_id } => session.job_template_id = Some(job_template_id),
      StepOutcome::JobLaunched { job_execution_id } => session.job_execution_id = Some(job_execution_id),
    }
    session.current_step = self.current_step(session);
    Ok(())
  }

  /// Recalcula el paso actual. Devuelve `true` si el valor guardado no
  /// coincidía.
  pub fn reconcile(&self, session: &mut WorkflowSession) -> bool {
    let derived = self.current_step(session);
    if derived == session.current_step {
      return false;
    }
    warn!("paso guardado {} no coincide con el derivado {} (guía {}); se corrige",
          session.current_step, derived, session.guide);
    session.current_step = derived;
    true
  }
}
