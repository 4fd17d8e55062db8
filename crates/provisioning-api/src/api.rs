use crate::entities::{ClusterRequest, ClusterTemplateRequest, DataSourceRequest, EntityKind, EntityStatus,
                      ImageRegistration, JobExecutionRequest, JobTemplateRequest, NodeGroupTemplateRequest,
                      NodeGroupTemplateSummary, PluginSummary};
use crate::ApiError;

/// Cliente del servicio remoto de aprovisionamiento.
///
/// Las operaciones de creación devuelven el identificador opaco de la nueva
/// entidad. Cualquier operación puede fallar con un error de validación, de
/// transporte o de entidad inexistente; la implementación no reintenta.
pub trait ProvisioningApi: Send + Sync {
  /// Lista los plugins disponibles con sus versiones.
  fn list_plugins(&self) -> Result<Vec<PluginSummary>, ApiError>;

  /// Versiones ofrecidas por un plugin. `NotFound` si el plugin no existe.
  fn get_plugin_versions(&self, plugin_name: &str) -> Result<Vec<String>, ApiError>;

  /// Registra una imagen y devuelve su id.
  fn create_image_registration(&self, registration: &ImageRegistration) -> Result<String, ApiError>;

  /// Plantillas de grupo de nodos existentes para un plugin/versión.
  fn find_node_group_templates(&self,
                               plugin_name: &str,
                               plugin_version: &str)
                               -> Result<Vec<NodeGroupTemplateSummary>, ApiError>;

  fn create_node_group_template(&self, request: &NodeGroupTemplateRequest) -> Result<String, ApiError>;

  fn create_cluster_template(&self, request: &ClusterTemplateRequest) -> Result<String, ApiError>;

  fn create_cluster(&self, request: &ClusterRequest) -> Result<String, ApiError>;

  /// Tipos de trabajo que acepta el servicio (`"Spark"`, `"Storm.Pyleus"`, ...).
  fn list_job_types(&self) -> Result<Vec<String>, ApiError>;

  fn create_data_source(&self, request: &DataSourceRequest) -> Result<String, ApiError>;

  fn create_job_template(&self, request: &JobTemplateRequest) -> Result<String, ApiError>;

  /// Lanza una plantilla de trabajo sobre un cluster y devuelve el id de la
  /// ejecución.
  fn create_job_execution(&self, request: &JobExecutionRequest) -> Result<String, ApiError>;

  /// Estado actual de una entidad.
  fn get_entity_status(&self, kind: EntityKind, id: &str) -> Result<EntityStatus, ApiError>;
}
