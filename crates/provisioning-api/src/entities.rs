// entities.rs
//
// Tipos de petición y resumen de las entidades del servicio de
// aprovisionamiento. Sólo incluyen los campos que usan las guías.
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Clases de entidad cuyo estado puede consultarse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
  Image,
  NodeGroupTemplate,
  ClusterTemplate,
  Cluster,
  DataSource,
  JobTemplate,
  JobExecution,
}

impl EntityKind {
  pub fn as_str(self) -> &'static str {
    match self {
      EntityKind::Image => "image",
      EntityKind::NodeGroupTemplate => "node_group_template",
      EntityKind::ClusterTemplate => "cluster_template",
      EntityKind::Cluster => "cluster",
      EntityKind::DataSource => "data_source",
      EntityKind::JobTemplate => "job",
      EntityKind::JobExecution => "job_execution",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Estado de una entidad remota.
///
/// Las plantillas y orígenes de datos no tienen ciclo de vida: si existen se
/// reportan como `Available`. Los estados intermedios se conservan con su
/// texto original en `InProgress`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityStatus {
  Available,
  InProgress(String),
  Active,
  Succeeded,
  Failed(String),
  Error,
}

impl EntityStatus {
  /// Interpreta el texto de estado del servicio (sin distinguir mayúsculas).
  pub fn parse(raw: &str) -> Self {
    match raw.trim().to_ascii_lowercase().as_str() {
      "available" => EntityStatus::Available,
      "active" => EntityStatus::Active,
      "succeeded" => EntityStatus::Succeeded,
      "error" => EntityStatus::Error,
      "failed" | "killed" | "donewitherror" => EntityStatus::Failed(raw.trim().to_string()),
      _ => EntityStatus::InProgress(raw.trim().to_string()),
    }
  }

  /// Estados de los que la entidad ya no saldrá con éxito.
  pub fn is_failure(&self) -> bool {
    matches!(self, EntityStatus::Failed(_) | EntityStatus::Error)
  }
}

impl fmt::Display for EntityStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EntityStatus::Available => write!(f, "Available"),
      EntityStatus::InProgress(s) => write!(f, "{}", s),
      EntityStatus::Active => write!(f, "Active"),
      EntityStatus::Succeeded => write!(f, "Succeeded"),
      EntityStatus::Failed(s) => write!(f, "{}", s),
      EntityStatus::Error => write!(f, "Error"),
    }
  }
}

/// Plugin de aprovisionamiento y las versiones que ofrece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSummary {
  pub name: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub versions: Vec<String>,
}

impl PluginSummary {
  pub fn new<I, S>(name: &str, title: &str, versions: I) -> Self
    where I: IntoIterator<Item = S>,
          S: Into<String>
  {
    Self { name: name.to_string(), title: title.to_string(), versions: versions.into_iter().map(Into::into).collect() }
  }
}

/// Registro de una imagen existente en el catálogo de imágenes del servicio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegistration {
  pub image_id: String,
  pub user_name: String,
  pub description: Option<String>,
  #[serde(default)]
  pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupTemplateRequest {
  pub name: String,
  pub plugin_name: String,
  pub plugin_version: String,
  pub flavor_id: String,
  pub node_processes: Vec<String>,
  pub image_id: Option<String>,
  pub description: Option<String>,
}

/// Plantilla de grupo de nodos ya existente en el servicio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupTemplateSummary {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub plugin_name: String,
  #[serde(default, alias = "hadoop_version")]
  pub plugin_version: String,
  #[serde(default)]
  pub node_processes: Vec<String>,
}

/// Referencia a una plantilla de grupo de nodos dentro de una plantilla de
/// cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroupRef {
  pub name: String,
  pub node_group_template_id: String,
  pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTemplateRequest {
  pub name: String,
  pub plugin_name: String,
  pub plugin_version: String,
  pub node_groups: Vec<NodeGroupRef>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterRequest {
  pub name: String,
  pub plugin_name: String,
  pub plugin_version: String,
  pub cluster_template_id: String,
  pub default_image_id: String,
  pub user_keypair_id: Option<String>,
  pub net_id: Option<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSourceRequest {
  pub name: String,
  /// Tipo de almacenamiento: `swift`, `hdfs`, `maprfs`, `manila`, `s3`.
  pub ds_type: String,
  pub url: String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobTemplateRequest {
  pub name: String,
  pub job_type: String,
  #[serde(default)]
  pub mains: Vec<String>,
  #[serde(default)]
  pub libs: Vec<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecutionRequest {
  pub job_template_id: String,
  pub cluster_id: String,
  pub input_id: Option<String>,
  pub output_id: Option<String>,
  /// Configuración libre del trabajo (`configs`, `params`, `args`).
  pub configs: JsonValue,
}
