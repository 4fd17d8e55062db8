use crate::entities::{ClusterRequest, ClusterTemplateRequest, DataSourceRequest, EntityKind, EntityStatus,
                      ImageRegistration, JobExecutionRequest, JobTemplateRequest, NodeGroupTemplateRequest,
                      NodeGroupTemplateSummary, PluginSummary};
use crate::{ApiError, ProvisioningApi};
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Operaciones del servicio, usadas para inyectar fallos en pruebas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    ListPlugins,
    GetPluginVersions,
    CreateImageRegistration,
    FindNodeGroupTemplates,
    CreateNodeGroupTemplate,
    CreateClusterTemplate,
    CreateCluster,
    ListJobTypes,
    CreateDataSource,
    CreateJobTemplate,
    CreateJobExecution,
    GetEntityStatus,
}

#[derive(Debug, Clone)]
struct InjectedFailure {
    error: ApiError,
    persistent: bool,
}

/// Implementación en memoria del servicio de aprovisionamiento para tests y
/// desarrollo.
///
/// Valida lo mínimo que valida el servicio real (nombres vacíos, plugins y
/// referencias desconocidas), registra cada llamada y permite inyectar fallos
/// por operación y guionizar la secuencia de estados de una entidad.
pub struct InMemoryProvisioningApi {
    plugins: Arc<Mutex<Vec<PluginSummary>>>,
    job_types: Arc<Mutex<Vec<String>>>,
    node_group_templates: Arc<Mutex<Vec<NodeGroupTemplateSummary>>>,
    entities: Arc<Mutex<HashMap<String, (EntityKind, VecDeque<EntityStatus>)>>>,
    failures: Arc<Mutex<HashMap<ApiOperation, InjectedFailure>>>,
    calls: Arc<Mutex<Vec<ApiOperation>>>,
}

impl InMemoryProvisioningApi {
    pub fn new() -> Self {
        Self { plugins: Arc::new(Mutex::new(Vec::new())),
               job_types: Arc::new(Mutex::new(Vec::new())),
               node_group_templates: Arc::new(Mutex::new(Vec::new())),
               entities: Arc::new(Mutex::new(HashMap::new())),
               failures: Arc::new(Mutex::new(HashMap::new())),
               calls: Arc::new(Mutex::new(Vec::new())) }
    }

    // Helper para mapear mutex envenenados a ApiError
    fn lock_map<'a, T>(&'a self, m: &'a Mutex<T>, name: &str) -> Result<std::sync::MutexGuard<'a, T>, ApiError> {
        m.lock()
         .map_err(|e| ApiError::Transport(format!("Mutex '{}' poisoned: {}", name, e)))
    }

    /// Añade un plugin ofrecido por el servicio.
    pub fn with_plugin(self, plugin: PluginSummary) -> Self {
        self.plugins.lock().unwrap_or_else(|e| e.into_inner()).push(plugin);
        self
    }

    /// Define los tipos de trabajo aceptados.
    pub fn with_job_types<I, S>(self, types: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.job_types
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .extend(types.into_iter().map(Into::into));
        self
    }

    /// Registra una plantilla de grupo de nodos preexistente.
    pub fn with_node_group_template(self, template: NodeGroupTemplateSummary) -> Self {
        self.entities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(template.id.clone(), (EntityKind::NodeGroupTemplate, VecDeque::from(vec![EntityStatus::Available])));
        self.node_group_templates.lock().unwrap_or_else(|e| e.into_inner()).push(template);
        self
    }

    /// La próxima llamada a `op` falla con `error`.
    pub fn fail_next(&self, op: ApiOperation, error: ApiError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op, InjectedFailure { error, persistent: false });
    }

    /// Todas las llamadas a `op` fallan con `error` hasta `clear_failures`.
    pub fn fail_always(&self, op: ApiOperation, error: ApiError) {
        self.failures
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(op, InjectedFailure { error, persistent: true });
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Fija la secuencia de estados que devolverá `get_entity_status` para
    /// `id`: cada consulta consume uno y el último se mantiene.
    pub fn script_statuses(&self, kind: EntityKind, id: &str, statuses: Vec<EntityStatus>) {
        self.entities
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.to_string(), (kind, VecDeque::from(statuses)));
    }

    /// Operaciones invocadas hasta ahora, en orden.
    pub fn calls(&self) -> Vec<ApiOperation> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Número de veces que se invocó `op`.
    pub fn call_count(&self, op: ApiOperation) -> usize {
        self.calls().iter().filter(|c| **c == op).count()
    }

    /// Registra la llamada y devuelve el fallo inyectado, si lo hay.
    fn enter(&self, op: ApiOperation) -> Result<(), ApiError> {
        self.lock_map(&self.calls, "calls")?.push(op);
        let mut failures = self.lock_map(&self.failures, "failures")?;
        let injected = match failures.get(&op) {
            Some(f) => f.clone(),
            None => return Ok(()),
        };
        if !injected.persistent {
            failures.remove(&op);
        }
        debug!("fallo inyectado en {:?}: {}", op, injected.error);
        Err(injected.error)
    }

    fn require_name(name: &str, what: &str) -> Result<(), ApiError> {
        if name.trim().is_empty() {
            return Err(ApiError::Validation(format!("El nombre de {} no puede estar vacío", what)));
        }
        Ok(())
    }

    fn require_entity(&self, kind: EntityKind, id: &str) -> Result<(), ApiError> {
        let entities = self.lock_map(&self.entities, "entities")?;
        match entities.get(id) {
            Some((k, _)) if *k == kind => Ok(()),
            _ => Err(ApiError::Validation(format!("{} {} no existe", kind, id))),
        }
    }

    fn require_plugin_version(&self, plugin_name: &str, plugin_version: &str) -> Result<(), ApiError> {
        let plugins = self.lock_map(&self.plugins, "plugins")?;
        let offered = plugins.iter()
                             .any(|p| p.name == plugin_name && p.versions.iter().any(|v| v == plugin_version));
        if !offered {
            return Err(ApiError::Validation(format!("El plugin {} {} no está disponible", plugin_name, plugin_version)));
        }
        Ok(())
    }

    fn register(&self, kind: EntityKind, initial: EntityStatus) -> Result<String, ApiError> {
        let id = Uuid::new_v4().to_string();
        self.lock_map(&self.entities, "entities")?
            .insert(id.clone(), (kind, VecDeque::from(vec![initial])));
        Ok(id)
    }
}

impl Default for InMemoryProvisioningApi {
    fn default() -> Self {
        Self::new()
    }
}

impl ProvisioningApi for InMemoryProvisioningApi {
    fn list_plugins(&self) -> Result<Vec<PluginSummary>, ApiError> {
        self.enter(ApiOperation::ListPlugins)?;
        Ok(self.lock_map(&self.plugins, "plugins")?.clone())
    }

    fn get_plugin_versions(&self, plugin_name: &str) -> Result<Vec<String>, ApiError> {
        self.enter(ApiOperation::GetPluginVersions)?;
        let plugins = self.lock_map(&self.plugins, "plugins")?;
        plugins.iter()
               .find(|p| p.name == plugin_name)
               .map(|p| p.versions.clone())
               .ok_or_else(|| ApiError::NotFound(format!("plugin {}", plugin_name)))
    }

    fn create_image_registration(&self, registration: &ImageRegistration) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateImageRegistration)?;
        if registration.image_id.trim().is_empty() {
            return Err(ApiError::Validation("Debe indicar la imagen a registrar".to_string()));
        }
        Self::require_name(&registration.user_name, "usuario de la imagen")?;
        self.lock_map(&self.entities, "entities")?.insert(registration.image_id.clone(),
                                                          (EntityKind::Image,
                                                           VecDeque::from(vec![EntityStatus::Available])));
        Ok(registration.image_id.clone())
    }

    fn find_node_group_templates(&self,
                                 plugin_name: &str,
                                 plugin_version: &str)
                                 -> Result<Vec<NodeGroupTemplateSummary>, ApiError> {
        self.enter(ApiOperation::FindNodeGroupTemplates)?;
        let templates = self.lock_map(&self.node_group_templates, "node_group_templates")?;
        Ok(templates.iter()
                    .filter(|t| t.plugin_name == plugin_name && t.plugin_version == plugin_version)
                    .cloned()
                    .collect())
    }

    fn create_node_group_template(&self, request: &NodeGroupTemplateRequest) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateNodeGroupTemplate)?;
        Self::require_name(&request.name, "la plantilla de grupo de nodos")?;
        self.require_plugin_version(&request.plugin_name, &request.plugin_version)?;
        if request.node_processes.is_empty() {
            return Err(ApiError::Validation("Debe elegir al menos un proceso de nodo".to_string()));
        }
        let id = self.register(EntityKind::NodeGroupTemplate, EntityStatus::Available)?;
        self.lock_map(&self.node_group_templates, "node_group_templates")?
            .push(NodeGroupTemplateSummary { id: id.clone(),
                                             name: request.name.clone(),
                                             plugin_name: request.plugin_name.clone(),
                                             plugin_version: request.plugin_version.clone(),
                                             node_processes: request.node_processes.clone() });
        Ok(id)
    }

    fn create_cluster_template(&self, request: &ClusterTemplateRequest) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateClusterTemplate)?;
        Self::require_name(&request.name, "la plantilla de cluster")?;
        self.require_plugin_version(&request.plugin_name, &request.plugin_version)?;
        if request.node_groups.is_empty() {
            return Err(ApiError::Validation("La plantilla de cluster necesita al menos un grupo de nodos".to_string()));
        }
        for ng in &request.node_groups {
            self.require_entity(EntityKind::NodeGroupTemplate, &ng.node_group_template_id)?;
        }
        self.register(EntityKind::ClusterTemplate, EntityStatus::Available)
    }

    fn create_cluster(&self, request: &ClusterRequest) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateCluster)?;
        Self::require_name(&request.name, "el cluster")?;
        self.require_plugin_version(&request.plugin_name, &request.plugin_version)?;
        self.require_entity(EntityKind::ClusterTemplate, &request.cluster_template_id)?;
        self.register(EntityKind::Cluster, EntityStatus::Active)
    }

    fn list_job_types(&self) -> Result<Vec<String>, ApiError> {
        self.enter(ApiOperation::ListJobTypes)?;
        Ok(self.lock_map(&self.job_types, "job_types")?.clone())
    }

    fn create_data_source(&self, request: &DataSourceRequest) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateDataSource)?;
        Self::require_name(&request.name, "el origen de datos")?;
        if request.url.trim().is_empty() {
            return Err(ApiError::Validation("La URL del origen de datos no puede estar vacía".to_string()));
        }
        self.register(EntityKind::DataSource, EntityStatus::Available)
    }

    fn create_job_template(&self, request: &JobTemplateRequest) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateJobTemplate)?;
        Self::require_name(&request.name, "la plantilla de trabajo")?;
        let known = self.lock_map(&self.job_types, "job_types")?.iter().any(|t| *t == request.job_type);
        if !known {
            return Err(ApiError::Validation(format!("Tipo de trabajo no soportado: {}", request.job_type)));
        }
        self.register(EntityKind::JobTemplate, EntityStatus::Available)
    }

    fn create_job_execution(&self, request: &JobExecutionRequest) -> Result<String, ApiError> {
        self.enter(ApiOperation::CreateJobExecution)?;
        self.require_entity(EntityKind::JobTemplate, &request.job_template_id)?;
        self.require_entity(EntityKind::Cluster, &request.cluster_id)?;
        for ds in request.input_id.iter().chain(request.output_id.iter()) {
            self.require_entity(EntityKind::DataSource, ds)?;
        }
        self.register(EntityKind::JobExecution, EntityStatus::Succeeded)
    }

    fn get_entity_status(&self, kind: EntityKind, id: &str) -> Result<EntityStatus, ApiError> {
        self.enter(ApiOperation::GetEntityStatus)?;
        let mut entities = self.lock_map(&self.entities, "entities")?;
        let (stored_kind, statuses) = entities.get_mut(id)
                                              .ok_or_else(|| ApiError::NotFound(format!("{} {}", kind, id)))?;
        if *stored_kind != kind {
            return Err(ApiError::NotFound(format!("{} {}", kind, id)));
        }
        let status = if statuses.len() > 1 { statuses.pop_front() } else { statuses.front().cloned() };
        status.ok_or_else(|| ApiError::NotFound(format!("{} {}", kind, id)))
    }
}
