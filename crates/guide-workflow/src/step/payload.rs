// Archivo: payload.rs
// Propósito: datos que el usuario envía al completar un paso
// (`StepPayload`) y resultado de la acción externa que el secuenciador
// aplica a la sesión (`StepOutcome`).
use guide_state::{JobType, PluginChoice, StepId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSpec {
    pub image_id: String,
    pub user_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Nueva plantilla de grupo de nodos. El plugin y la imagen salen de la
/// sesión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupTemplateSpec {
    pub name: String,
    pub flavor_id: String,
    pub node_processes: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Plantilla de cluster formada por todas las plantillas de grupo de nodos
/// acumuladas. `counts` indica cuántas instancias de cada plantilla (por id);
/// las que no aparecen llevan una.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterTemplateSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub counts: HashMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLaunchSpec {
    pub name: String,
    #[serde(default)]
    pub user_keypair_id: Option<String>,
    #[serde(default)]
    pub net_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceSpec {
    pub name: String,
    pub ds_type: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplateSpec {
    pub name: String,
    #[serde(default)]
    pub mains: Vec<String>,
    #[serde(default)]
    pub libs: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Lanzamiento de un trabajo. Sin `cluster_id` se usa el cluster creado por
/// la guía de clusters de la misma sesión.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobLaunchSpec {
    #[serde(default)]
    pub cluster_id: Option<String>,
    #[serde(default)]
    pub input_id: Option<String>,
    #[serde(default)]
    pub output_id: Option<String>,
    #[serde(default)]
    pub configs: JsonValue,
}

/// Entrada del usuario para un paso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepPayload {
    ChoosePlugin { plugin_name: String, plugin_version: String },
    RegisterImage(ImageSpec),
    AddNodeGroupTemplate(NodeGroupTemplateSpec),
    UseExistingNodeGroupTemplate { template_id: String },
    FinishNodeGroups,
    CreateClusterTemplate(ClusterTemplateSpec),
    LaunchCluster(ClusterLaunchSpec),
    ChooseJobType { job_type: JobType },
    AddDataSource(DataSourceSpec),
    FinishDataSources,
    CreateJobTemplate(JobTemplateSpec),
    LaunchJob(JobLaunchSpec),
}

impl StepPayload {
    pub fn name(&self) -> &'static str {
        match self {
            StepPayload::ChoosePlugin { .. } => "choose_plugin",
            StepPayload::RegisterImage(_) => "register_image",
            StepPayload::AddNodeGroupTemplate(_) => "add_node_group_template",
            StepPayload::UseExistingNodeGroupTemplate { .. } => "use_existing_node_group_template",
            StepPayload::FinishNodeGroups => "finish_node_groups",
            StepPayload::CreateClusterTemplate(_) => "create_cluster_template",
            StepPayload::LaunchCluster(_) => "launch_cluster",
            StepPayload::ChooseJobType { .. } => "choose_job_type",
            StepPayload::AddDataSource(_) => "add_data_source",
            StepPayload::FinishDataSources => "finish_data_sources",
            StepPayload::CreateJobTemplate(_) => "create_job_template",
            StepPayload::LaunchJob(_) => "launch_job",
        }
    }
}

/// Resultado de una acción que el secuenciador aplica a la sesión.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    PluginChosen(PluginChoice),
    ImageRegistered { image_id: String },
    NodeGroupTemplateAdded { template_id: String },
    NodeGroupsFinished,
    ClusterTemplateCreated { cluster_template_id: String },
    ClusterLaunched { cluster_id: String },
    JobTypeChosen(JobType),
    DataSourceAdded { data_source_id: String },
    DataSourcesFinished,
    JobTemplateCreated { job_template_id: String },
    JobLaunched { job_execution_id: String },
}

impl StepOutcome {
    /// Paso al que pertenece este resultado.
    pub fn step(&self) -> StepId {
        match self {
            StepOutcome::PluginChosen(_) => StepId::PluginSelect,
            StepOutcome::ImageRegistered { .. } => StepId::ImageRegister,
            StepOutcome::NodeGroupTemplateAdded { .. } | StepOutcome::NodeGroupsFinished => StepId::NodeGroupSelect,
            StepOutcome::ClusterTemplateCreated { .. } => StepId::ClusterTemplate,
            StepOutcome::ClusterLaunched { .. } => StepId::ClusterLaunch,
            StepOutcome::JobTypeChosen(_) => StepId::JobTypeSelect,
            StepOutcome::DataSourceAdded { .. } | StepOutcome::DataSourcesFinished => StepId::DataSourceStep,
            StepOutcome::JobTemplateCreated { .. } => StepId::JobTemplate,
            StepOutcome::JobLaunched { .. } => StepId::JobLaunch,
        }
    }
}
