use crate::errors::GuideError;
use crate::step::{definition, ClusterLaunchSpec, ClusterTemplateSpec, DataSourceSpec, ImageSpec, JobLaunchSpec,
                  JobTemplateSpec, NodeGroupTemplateSpec, StepAction, StepOutcome, StepPayload};
use guide_state::{JobType, PluginChoice, StepId, WorkflowSession};
use log::{error, info, warn};
use provisioning_api::{ClusterRequest, ClusterTemplateRequest, DataSourceRequest, ImageRegistration,
                       JobExecutionRequest, JobTemplateRequest, NodeGroupRef, NodeGroupTemplateRequest,
                       ProvisioningApi};
use std::sync::Arc;

/// Traduce "el usuario completó el paso X con estos datos" en una única
/// llamada al servicio de aprovisionamiento.
///
/// Nunca modifica la sesión: devuelve el `StepOutcome` que el secuenciador
/// debe aplicar, o el error a mostrar.
pub struct StepActionAdapter {
  api: Arc<dyn ProvisioningApi>,
}

fn required(value: &str, what: &str) -> Result<String, GuideError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(GuideError::Validation(format!("El campo '{}' es obligatorio", what)));
  }
  Ok(trimmed.to_string())
}

/// Campo que la secuencia garantiza en este paso.
fn from_session<'a, T>(value: &'a Option<T>, what: &str, step: StepId) -> Result<&'a T, GuideError> {
  value.as_ref().ok_or_else(|| {
                  error!("paso {} alcanzado sin {}", step, what);
                  GuideError::InvalidTransition(format!("falta {} para el paso {}", what, step))
                })
}

impl StepActionAdapter {
  pub fn new(api: Arc<dyn ProvisioningApi>) -> Self {
    Self { api }
  }

  pub fn perform(&self, session: &WorkflowSession, step: StepId, payload: &StepPayload) -> Result<StepOutcome, GuideError> {
    let def = definition(session.guide, step).ok_or_else(|| {
                                               GuideError::InvalidTransition(format!("el paso {} no pertenece a la guía {}",
                                                                                     step, session.guide))
                                             })?;
    let result = match (def.action, payload) {
      (StepAction::ChoosePlugin, StepPayload::ChoosePlugin { plugin_name, plugin_version }) => {
        self.choose_plugin(plugin_name, plugin_version)
      }
      (StepAction::RegisterImage, StepPayload::RegisterImage(spec)) => self.register_image(spec),
      (StepAction::CollectNodeGroups, StepPayload::AddNodeGroupTemplate(spec)) => self.add_node_group(session, spec),
      (StepAction::CollectNodeGroups, StepPayload::UseExistingNodeGroupTemplate { template_id }) => {
        self.use_existing_node_group(session, template_id)
      }
      (StepAction::CollectNodeGroups, StepPayload::FinishNodeGroups) => {
        if session.node_group_template_ids.is_empty() {
          Err(GuideError::Validation("Añada al menos una plantilla de grupo de nodos antes de continuar".into()))
        } else {
          Ok(StepOutcome::NodeGroupsFinished)
        }
      }
      (StepAction::CreateClusterTemplate, StepPayload::CreateClusterTemplate(spec)) => {
        self.create_cluster_template(session, spec)
      }
      (StepAction::LaunchCluster, StepPayload::LaunchCluster(spec)) => self.launch_cluster(session, spec),
      (StepAction::ChooseJobType, StepPayload::ChooseJobType { job_type }) => self.choose_job_type(job_type),
      (StepAction::CollectDataSources, StepPayload::AddDataSource(spec)) => self.add_data_source(spec),
      (StepAction::CollectDataSources, StepPayload::FinishDataSources) => {
        if session.data_source_ids.is_empty() {
          Err(GuideError::Validation("Añada al menos un origen de datos antes de continuar".into()))
        } else {
          Ok(StepOutcome::DataSourcesFinished)
        }
      }
      (StepAction::CreateJobTemplate, StepPayload::CreateJobTemplate(spec)) => self.create_job_template(session, spec),
      (StepAction::LaunchJob, StepPayload::LaunchJob(spec)) => self.launch_job(session, spec),
      (_, other) => return Err(GuideError::InvalidPayload { step, payload: other.name() }),
    };
    match &result {
      Ok(outcome) => info!("{} / {}: {:?}", session.guide, step, outcome),
      Err(e) => warn!("{} / {}: acción '{}' fallida: {}", session.guide, step, payload.name(), e),
    }
    result
  }

  fn choose_plugin(&self, plugin_name: &str, plugin_version: &str) -> Result<StepOutcome, GuideError> {
    let name = required(plugin_name, "plugin")?;
    let version = required(plugin_version, "versión")?;
    let versions = self.api.get_plugin_versions(&name)?;
    if !versions.iter().any(|v| *v == version) {
      return Err(GuideError::Validation(format!("El plugin {} no ofrece la versión {}", name, version)));
    }
    Ok(StepOutcome::PluginChosen(PluginChoice::new(name, version)))
  }

  fn register_image(&self, spec: &ImageSpec) -> Result<StepOutcome, GuideError> {
    let registration = ImageRegistration { image_id: required(&spec.image_id, "imagen")?,
                                           user_name: required(&spec.user_name, "usuario")?,
                                           description: spec.description.clone(),
                                           tags: spec.tags.clone() };
    let image_id = self.api.create_image_registration(&registration)?;
    Ok(StepOutcome::ImageRegistered { image_id })
  }

  fn add_node_group(&self, session: &WorkflowSession, spec: &NodeGroupTemplateSpec) -> Result<StepOutcome, GuideError> {
    let plugin = from_session(&session.selected_plugin, "el plugin", StepId::NodeGroupSelect)?;
    if spec.node_processes.is_empty() {
      return Err(GuideError::Validation("Seleccione al menos un proceso para el grupo de nodos".into()));
    }
    let request = NodeGroupTemplateRequest { name: required(&spec.name, "nombre")?,
                                             plugin_name: plugin.plugin_name.clone(),
                                             plugin_version: plugin.plugin_version.clone(),
                                             flavor_id: required(&spec.flavor_id, "flavor")?,
                                             node_processes: spec.node_processes.clone(),
                                             image_id: session.registered_image_id.clone(),
                                             description: spec.description.clone() };
    let template_id = self.api.create_node_group_template(&request)?;
    Ok(StepOutcome::NodeGroupTemplateAdded { template_id })
  }

  /// Sólo se aceptan las plantillas que el paso ofrece: las del plugin y la
  /// versión elegidos.
  fn use_existing_node_group(&self, session: &WorkflowSession, template_id: &str) -> Result<StepOutcome, GuideError> {
    let plugin = from_session(&session.selected_plugin, "el plugin", StepId::NodeGroupSelect)?;
    let template_id = required(template_id, "plantilla")?;
    let offered = self.api.find_node_group_templates(&plugin.plugin_name, &plugin.plugin_version)?;
    if !offered.iter().any(|t| t.id == template_id) {
      return Err(GuideError::Validation(format!("La plantilla {} no pertenece al plugin {} {}",
                                                template_id, plugin.plugin_name, plugin.plugin_version)));
    }
    Ok(StepOutcome::NodeGroupTemplateAdded { template_id })
  }

  fn create_cluster_template(&self,
                             session: &WorkflowSession,
                             spec: &ClusterTemplateSpec)
                             -> Result<StepOutcome, GuideError> {
    let plugin = from_session(&session.selected_plugin, "el plugin", StepId::ClusterTemplate)?;
    let mut node_groups = Vec::with_capacity(session.node_group_template_ids.len());
    for (i, id) in session.node_group_template_ids.iter().enumerate() {
      let count = spec.counts.get(id).copied().unwrap_or(1);
      if count == 0 {
        return Err(GuideError::Validation(format!("El grupo de nodos {} necesita al menos una instancia", id)));
      }
      node_groups.push(NodeGroupRef { name: format!("grupo-{}", i + 1), node_group_template_id: id.clone(), count });
    }
    let request = ClusterTemplateRequest { name: required(&spec.name, "nombre")?,
                                           plugin_name: plugin.plugin_name.clone(),
                                           plugin_version: plugin.plugin_version.clone(),
                                           node_groups,
                                           description: spec.description.clone() };
    let cluster_template_id = self.api.create_cluster_template(&request)?;
    Ok(StepOutcome::ClusterTemplateCreated { cluster_template_id })
  }

  fn launch_cluster(&self, session: &WorkflowSession, spec: &ClusterLaunchSpec) -> Result<StepOutcome, GuideError> {
    let plugin = from_session(&session.selected_plugin, "el plugin", StepId::ClusterLaunch)?;
    let template = from_session(&session.cluster_template_id, "la plantilla de cluster", StepId::ClusterLaunch)?;
    let image = from_session(&session.registered_image_id, "la imagen", StepId::ClusterLaunch)?;
    let request = ClusterRequest { name: required(&spec.name, "nombre")?,
                                   plugin_name: plugin.plugin_name.clone(),
                                   plugin_version: plugin.plugin_version.clone(),
                                   cluster_template_id: template.clone(),
                                   default_image_id: image.clone(),
                                   user_keypair_id: spec.user_keypair_id.clone(),
                                   net_id: spec.net_id.clone(),
                                   description: spec.description.clone() };
    let cluster_id = self.api.create_cluster(&request)?;
    Ok(StepOutcome::ClusterLaunched { cluster_id })
  }

  fn choose_job_type(&self, job_type: &JobType) -> Result<StepOutcome, GuideError> {
    let offered = self.api.list_job_types()?;
    if !offered.iter().any(|t| t == job_type.as_str()) {
      return Err(GuideError::Validation(format!("El servicio no admite trabajos de tipo {}", job_type)));
    }
    Ok(StepOutcome::JobTypeChosen(job_type.clone()))
  }

  fn add_data_source(&self, spec: &DataSourceSpec) -> Result<StepOutcome, GuideError> {
    let request = DataSourceRequest { name: required(&spec.name, "nombre")?,
                                      ds_type: required(&spec.ds_type, "tipo")?,
                                      url: required(&spec.url, "URL")?,
                                      description: spec.description.clone() };
    let data_source_id = self.api.create_data_source(&request)?;
    Ok(StepOutcome::DataSourceAdded { data_source_id })
  }

  fn create_job_template(&self, session: &WorkflowSession, spec: &JobTemplateSpec) -> Result<StepOutcome, GuideError> {
    let job_type = from_session(&session.job_type, "el tipo de trabajo", StepId::JobTemplate)?;
    let request = JobTemplateRequest { name: required(&spec.name, "nombre")?,
                                       job_type: job_type.as_str().to_string(),
                                       mains: spec.mains.clone(),
                                       libs: spec.libs.clone(),
                                       description: spec.description.clone() };
    let job_template_id = self.api.create_job_template(&request)?;
    Ok(StepOutcome::JobTemplateCreated { job_template_id })
  }

  fn launch_job(&self, session: &WorkflowSession, spec: &JobLaunchSpec) -> Result<StepOutcome, GuideError> {
    let template = from_session(&session.job_template_id, "la plantilla de trabajo", StepId::JobLaunch)?;
    let cluster_id = spec.cluster_id
                         .as_deref()
                         .map(str::trim)
                         .filter(|c| !c.is_empty())
                         .ok_or_else(|| GuideError::Validation("Seleccione el cluster donde lanzar el trabajo".into()))?;
    let configs = if spec.configs.is_null() { serde_json::json!({}) } else { spec.configs.clone() };
    let request = JobExecutionRequest { job_template_id: template.clone(),
                                        cluster_id: cluster_id.to_string(),
                                        input_id: spec.input_id.clone(),
                                        output_id: spec.output_id.clone(),
                                        configs };
    let job_execution_id = self.api.create_job_execution(&request)?;
    Ok(StepOutcome::JobLaunched { job_execution_id })
  }
}
