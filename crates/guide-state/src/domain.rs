// Archivo: domain.rs
// Propósito: tipos del modelo de datos de las guías: la sesión persistida
// (`WorkflowSession`), el tipo de guía, los identificadores de paso, los tipos
// de trabajo y la elección de plugin.
use crate::errors::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Guías disponibles. Cada una es una máquina de estados independiente que
/// comparte el almacén de sesión.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuideKind {
    /// Creación guiada de un cluster.
    Cluster,
    /// Ejecución guiada de un trabajo.
    JobExecution,
}

impl GuideKind {
    /// Paso con el que arranca una sesión nueva de esta guía.
    pub fn initial_step(self) -> StepId {
        match self {
            GuideKind::Cluster => StepId::PluginSelect,
            GuideKind::JobExecution => StepId::JobTypeSelect,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GuideKind::Cluster => "cluster",
            GuideKind::JobExecution => "job_execution",
        }
    }
}

impl fmt::Display for GuideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GuideKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cluster" => Ok(GuideKind::Cluster),
            "job_execution" | "job" | "jobex" => Ok(GuideKind::JobExecution),
            other => Err(StoreError::Invalid(format!("guía desconocida: {}", other))),
        }
    }
}

/// Identificador de cada paso de las guías. `Complete` es el estado terminal
/// común a ambas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    PluginSelect,
    ImageRegister,
    NodeGroupSelect,
    ClusterTemplate,
    ClusterLaunch,
    JobTypeSelect,
    DataSourceStep,
    JobTemplate,
    JobLaunch,
    Complete,
}

impl StepId {
    pub fn as_str(self) -> &'static str {
        match self {
            StepId::PluginSelect => "plugin_select",
            StepId::ImageRegister => "image_register",
            StepId::NodeGroupSelect => "node_group_select",
            StepId::ClusterTemplate => "cluster_template",
            StepId::ClusterLaunch => "cluster_launch",
            StepId::JobTypeSelect => "job_type_select",
            StepId::DataSourceStep => "data_source_step",
            StepId::JobTemplate => "job_template",
            StepId::JobLaunch => "job_launch",
            StepId::Complete => "complete",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StepId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = match s.trim() {
            "plugin_select" => StepId::PluginSelect,
            "image_register" => StepId::ImageRegister,
            "node_group_select" => StepId::NodeGroupSelect,
            "cluster_template" => StepId::ClusterTemplate,
            "cluster_launch" => StepId::ClusterLaunch,
            "job_type_select" => StepId::JobTypeSelect,
            "data_source_step" => StepId::DataSourceStep,
            "job_template" => StepId::JobTemplate,
            "job_launch" => StepId::JobLaunch,
            "complete" => StepId::Complete,
            other => return Err(StoreError::Invalid(format!("paso desconocido: {}", other))),
        };
        Ok(step)
    }
}

/// Tipo de trabajo elegido en la guía de ejecución.
///
/// Se serializa como el texto que espera el servicio de aprovisionamiento
/// (`"MapReduce.Streaming"`, `"Storm.Pyleus"`, ...). Un texto desconocido se
/// conserva tal cual en `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobType {
    MapReduce,
    MapReduceStreaming,
    Pig,
    Hive,
    Java,
    Spark,
    Storm,
    StormPyleus,
    Shell,
    Other(String),
}

impl JobType {
    /// Valor que se envía al servicio.
    pub fn as_str(&self) -> &str {
        match self {
            JobType::MapReduce => "MapReduce",
            JobType::MapReduceStreaming => "MapReduce.Streaming",
            JobType::Pig => "Pig",
            JobType::Hive => "Hive",
            JobType::Java => "Java",
            JobType::Spark => "Spark",
            JobType::Storm => "Storm",
            JobType::StormPyleus => "Storm.Pyleus",
            JobType::Shell => "Shell",
            JobType::Other(s) => s,
        }
    }

    /// Nombre legible para mostrar en la interfaz.
    pub fn label(&self) -> &str {
        match self {
            JobType::MapReduceStreaming => "Streaming MapReduce",
            JobType::StormPyleus => "Storm Pyleus",
            other => other.as_str(),
        }
    }
}

impl From<&str> for JobType {
    fn from(s: &str) -> Self {
        match s {
            "MapReduce" => JobType::MapReduce,
            "MapReduce.Streaming" => JobType::MapReduceStreaming,
            "Pig" => JobType::Pig,
            "Hive" => JobType::Hive,
            "Java" => JobType::Java,
            "Spark" => JobType::Spark,
            "Storm" => JobType::Storm,
            "Storm.Pyleus" => JobType::StormPyleus,
            "Shell" => JobType::Shell,
            other => JobType::Other(other.to_string()),
        }
    }
}

impl From<String> for JobType {
    fn from(s: String) -> Self {
        JobType::from(s.as_str())
    }
}

impl From<JobType> for String {
    fn from(j: JobType) -> Self {
        j.as_str().to_string()
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Par plugin/versión elegido en el primer paso de la guía de clusters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginChoice {
    pub plugin_name: String,
    pub plugin_version: String,
}

impl PluginChoice {
    pub fn new(plugin_name: impl Into<String>, plugin_version: impl Into<String>) -> Self {
        Self { plugin_name: plugin_name.into(), plugin_version: plugin_version.into() }
    }
}

/// Progreso de una guía para un usuario.
///
/// `current_step` es una caché derivada de los campos acumulados: quien
/// modifique los campos debe recalcularla antes de mostrarla. Los campos que
/// faltan en instantáneas antiguas toman su valor por defecto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSession {
    /// Guía a la que pertenece esta sesión.
    pub guide: GuideKind,
    #[serde(default)]
    pub job_type: Option<JobType>,
    #[serde(default)]
    pub selected_plugin: Option<PluginChoice>,
    #[serde(default)]
    pub registered_image_id: Option<String>,
    /// Plantillas de grupo de nodos en orden de inserción.
    #[serde(default)]
    pub node_group_template_ids: Vec<String>,
    /// El usuario indicó que terminó de añadir plantillas de grupo de nodos.
    #[serde(default)]
    pub node_groups_done: bool,
    #[serde(default)]
    pub cluster_template_id: Option<String>,
    #[serde(default)]
    pub cluster_id: Option<String>,
    /// Orígenes de datos en orden de inserción.
    #[serde(default)]
    pub data_source_ids: Vec<String>,
    #[serde(default)]
    pub data_sources_done: bool,
    #[serde(default)]
    pub job_template_id: Option<String>,
    #[serde(default)]
    pub job_execution_id: Option<String>,
    /// Paso actual (caché).
    pub current_step: StepId,
}

impl WorkflowSession {
    /// Crea una sesión vacía posicionada en el paso inicial de `guide`.
    pub fn new(guide: GuideKind) -> Self {
        Self { guide,
               job_type: None,
               selected_plugin: None,
               registered_image_id: None,
               node_group_template_ids: Vec::new(),
               node_groups_done: false,
               cluster_template_id: None,
               cluster_id: None,
               data_source_ids: Vec::new(),
               data_sources_done: false,
               job_template_id: None,
               job_execution_id: None,
               current_step: guide.initial_step() }
    }

    /// Indica si la sesión no acumula ninguna elección.
    pub fn is_fresh(&self) -> bool {
        *self == Self { current_step: self.current_step, ..Self::new(self.guide) }
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == StepId::Complete
    }
}
