// Archivo: definition.rs
// Propósito: definición estática de los pasos de cada guía: qué campos deben
// estar completos, cuándo se salta el paso y qué acción externa ejecuta.
use guide_state::{GuideKind, StepId, WorkflowSession};
use thiserror::Error;

/// Tipos de trabajo que no usan orígenes de datos.
pub const JOB_TYPES_WITHOUT_DATA_SOURCES: &[&str] = &["Spark", "Storm", "Storm.Pyleus", "Java"];

/// Campo de la sesión que un paso deja completo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    SelectedPlugin,
    RegisteredImage,
    /// Al menos una plantilla y el usuario marcó que terminó.
    NodeGroups,
    ClusterTemplate,
    Cluster,
    JobType,
    /// Al menos un origen de datos y el usuario marcó que terminó.
    DataSources,
    JobTemplate,
    JobExecution,
}

impl Prerequisite {
    pub fn is_satisfied(self, s: &WorkflowSession) -> bool {
        match self {
            Prerequisite::SelectedPlugin => s.selected_plugin.is_some(),
            Prerequisite::RegisteredImage => s.registered_image_id.is_some(),
            Prerequisite::NodeGroups => !s.node_group_template_ids.is_empty() && s.node_groups_done,
            Prerequisite::ClusterTemplate => s.cluster_template_id.is_some(),
            Prerequisite::Cluster => s.cluster_id.is_some(),
            Prerequisite::JobType => s.job_type.is_some(),
            Prerequisite::DataSources => !s.data_source_ids.is_empty() && s.data_sources_done,
            Prerequisite::JobTemplate => s.job_template_id.is_some(),
            Prerequisite::JobExecution => s.job_execution_id.is_some(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkipError {
    #[error("la sesión no tiene tipo de trabajo")]
    MissingJobType,
}

/// Regla que decide si un paso se salta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipRule {
    Never,
    /// Se salta si el tipo de trabajo coincide con alguno de la lista.
    JobTypeIn(&'static [&'static str]),
}

impl SkipRule {
    pub fn evaluate(&self, s: &WorkflowSession) -> Result<bool, SkipError> {
        match self {
            SkipRule::Never => Ok(false),
            SkipRule::JobTypeIn(types) => {
                let job_type = s.job_type.as_ref().ok_or(SkipError::MissingJobType)?;
                Ok(types.contains(&job_type.as_str()))
            }
        }
    }
}

/// Acción externa asociada a un paso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAction {
    ChoosePlugin,
    RegisterImage,
    CollectNodeGroups,
    CreateClusterTemplate,
    LaunchCluster,
    ChooseJobType,
    CollectDataSources,
    CreateJobTemplate,
    LaunchJob,
}

#[derive(Debug, Clone, Copy)]
pub struct StepDefinition {
    pub step_id: StepId,
    /// Título para la interfaz.
    pub title: &'static str,
    pub prerequisites: &'static [Prerequisite],
    pub skip: SkipRule,
    pub action: StepAction,
}

impl StepDefinition {
    /// El paso ya no tiene nada pendiente.
    pub fn is_satisfied(&self, s: &WorkflowSession) -> bool {
        self.prerequisites.iter().all(|p| p.is_satisfied(s))
    }
}

pub static CLUSTER_GUIDE: [StepDefinition; 5] =
    [StepDefinition { step_id: StepId::PluginSelect,
                      title: "Seleccionar plugin",
                      prerequisites: &[Prerequisite::SelectedPlugin],
                      skip: SkipRule::Never,
                      action: StepAction::ChoosePlugin },
     StepDefinition { step_id: StepId::ImageRegister,
                      title: "Registrar imagen",
                      prerequisites: &[Prerequisite::RegisteredImage],
                      skip: SkipRule::Never,
                      action: StepAction::RegisterImage },
     StepDefinition { step_id: StepId::NodeGroupSelect,
                      title: "Plantillas de grupo de nodos",
                      prerequisites: &[Prerequisite::NodeGroups],
                      skip: SkipRule::Never,
                      action: StepAction::CollectNodeGroups },
     StepDefinition { step_id: StepId::ClusterTemplate,
                      title: "Crear plantilla de cluster",
                      prerequisites: &[Prerequisite::ClusterTemplate],
                      skip: SkipRule::Never,
                      action: StepAction::CreateClusterTemplate },
     StepDefinition { step_id: StepId::ClusterLaunch,
                      title: "Lanzar cluster",
                      prerequisites: &[Prerequisite::Cluster],
                      skip: SkipRule::Never,
                      action: StepAction::LaunchCluster }];

pub static JOB_GUIDE: [StepDefinition; 4] =
    [StepDefinition { step_id: StepId::JobTypeSelect,
                      title: "Seleccionar tipo de trabajo",
                      prerequisites: &[Prerequisite::JobType],
                      skip: SkipRule::Never,
                      action: StepAction::ChooseJobType },
     StepDefinition { step_id: StepId::DataSourceStep,
                      title: "Orígenes de datos",
                      prerequisites: &[Prerequisite::DataSources],
                      skip: SkipRule::JobTypeIn(JOB_TYPES_WITHOUT_DATA_SOURCES),
                      action: StepAction::CollectDataSources },
     StepDefinition { step_id: StepId::JobTemplate,
                      title: "Crear plantilla de trabajo",
                      prerequisites: &[Prerequisite::JobTemplate],
                      skip: SkipRule::Never,
                      action: StepAction::CreateJobTemplate },
     StepDefinition { step_id: StepId::JobLaunch,
                      title: "Lanzar trabajo",
                      prerequisites: &[Prerequisite::JobExecution],
                      skip: SkipRule::Never,
                      action: StepAction::LaunchJob }];

/// Pasos de una guía en orden.
pub fn definitions_for(guide: GuideKind) -> &'static [StepDefinition] {
    match guide {
        GuideKind::Cluster => &CLUSTER_GUIDE,
        GuideKind::JobExecution => &JOB_GUIDE,
    }
}

pub fn definition(guide: GuideKind, step: StepId) -> Option<&'static StepDefinition> {
    definitions_for(guide).iter().find(|d| d.step_id == step)
}
