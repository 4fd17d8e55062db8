// Archivo: options.rs
// Propósito: datos auxiliares que la interfaz necesita para mostrar el paso
// actual (plugins, plantillas existentes, tipos de trabajo, cluster sugerido).
// Las consultas nunca hacen fallar la petición: un error del servicio se
// registra y se devuelve una lista vacía.
use guide_state::{JobType, StepId, WorkflowSession};
use log::{debug, warn};
use provisioning_api::{sort_versions_desc, EntityKind, EntityStatus, NodeGroupTemplateSummary, PluginSummary,
                       ProvisioningApi};
use serde::Serialize;
use std::sync::Arc;

/// Cluster de la guía de clusters que se ofrece al lanzar un trabajo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestedCluster {
  pub cluster_id: String,
  pub status: EntityStatus,
  pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOptions {
  None,
  /// Versiones de cada plugin de la más nueva a la más antigua.
  Plugins { plugins: Vec<PluginSummary> },
  /// `show_existing` sólo es falso si la consulta respondió sin resultados.
  NodeGroupTemplates { existing: Vec<NodeGroupTemplateSummary>, show_existing: bool },
  JobTypes { job_types: Vec<JobType> },
  LaunchJob { suggested_cluster: Option<SuggestedCluster> },
}

pub struct StepOptionsLoader {
  api: Arc<dyn ProvisioningApi>,
}

impl StepOptionsLoader {
  pub fn new(api: Arc<dyn ProvisioningApi>) -> Self {
    Self { api }
  }

  /// Opciones del paso actual de `session`. `cluster_id` es el cluster
  /// creado por la guía de clusters de la misma sesión, si existe.
  pub fn load(&self, session: &WorkflowSession, cluster_id: Option<&str>) -> StepOptions {
    match session.current_step {
      StepId::PluginSelect => StepOptions::Plugins { plugins: self.plugins() },
      StepId::NodeGroupSelect => self.node_group_templates(session),
      StepId::JobTypeSelect => StepOptions::JobTypes { job_types: self.job_types() },
      StepId::JobLaunch => StepOptions::LaunchJob { suggested_cluster: cluster_id.and_then(|id| self.suggest(id)) },
      _ => StepOptions::None,
    }
  }

  fn plugins(&self) -> Vec<PluginSummary> {
    match self.api.list_plugins() {
      Ok(mut plugins) => {
        for p in plugins.iter_mut() {
          sort_versions_desc(&mut p.versions);
        }
        plugins
      }
      Err(e) => {
        warn!("no se pudieron obtener los plugins: {}", e);
        Vec::new()
      }
    }
  }

  fn node_group_templates(&self, session: &WorkflowSession) -> StepOptions {
    let plugin = match &session.selected_plugin {
      Some(p) => p,
      None => return StepOptions::NodeGroupTemplates { existing: Vec::new(), show_existing: true },
    };
    match self.api.find_node_group_templates(&plugin.plugin_name, &plugin.plugin_version) {
      Ok(existing) => {
        let show_existing = !existing.is_empty();
        StepOptions::NodeGroupTemplates { existing, show_existing }
      }
      Err(e) => {
        warn!("no se pudieron obtener las plantillas de {} {}: {}", plugin.plugin_name, plugin.plugin_version, e);
        StepOptions::NodeGroupTemplates { existing: Vec::new(), show_existing: true }
      }
    }
  }

  fn job_types(&self) -> Vec<JobType> {
    match self.api.list_job_types() {
      Ok(types) => types.into_iter().map(JobType::from).collect(),
      Err(e) => {
        warn!("no se pudieron obtener los tipos de trabajo: {}", e);
        Vec::new()
      }
    }
  }

  /// Sugerencia para `cluster_id`: sólo un cluster activo, o en error con un
  /// aviso. Cualquier otro estado o un fallo de la consulta no sugiere nada.
  pub fn suggest(&self, cluster_id: &str) -> Option<SuggestedCluster> {
    let status = match self.api.get_entity_status(EntityKind::Cluster, cluster_id) {
      Ok(s) => s,
      Err(e) => {
        warn!("no se pudo consultar el cluster {}: {}", cluster_id, e);
        return None;
      }
    };
    let warning = match status {
      EntityStatus::Active => None,
      EntityStatus::Error => Some(format!("El cluster {} está en estado Error", cluster_id)),
      ref other => {
        debug!("cluster {} en estado {}; no se sugiere", cluster_id, other);
        return None;
      }
    };
    Some(SuggestedCluster { cluster_id: cluster_id.to_string(), status, warning })
  }
}
