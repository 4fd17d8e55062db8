use std::time::Duration;

use log::{debug, warn};
use provisioning_api::{ApiError, ClusterRequest, ClusterTemplateRequest, DataSourceRequest, EntityKind, EntityStatus,
                       ImageRegistration, JobExecutionRequest, JobTemplateRequest, NodeGroupTemplateRequest,
                       NodeGroupTemplateSummary, PluginSummary, ProvisioningApi};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde_json::{json, Value as JsonValue};

use crate::config::{ClientConfig, ClientConfigError};
use crate::wire;

/// Implementación HTTP de `ProvisioningApi`.
pub struct RestProvisioningClient {
    config: ClientConfig,
    http: Client,
}

impl RestProvisioningClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientConfigError> {
        let http = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { config, http })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        wire::endpoint(&self.config.base_url, segments)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.header("X-Auth-Token", token),
            None => builder,
        }
    }

    fn send(&self, method: &str, path: &Url, builder: RequestBuilder) -> Result<JsonValue, ApiError> {
        debug!("{} {}", method, path);
        let response = self.authorized(builder)
                           .send()
                           .map_err(|e| ApiError::Transport(format!("{} {}: {}", method, path, e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let err = wire::map_error(status.as_u16(), &body);
            warn!("{} {} -> {}: {}", method, path, status.as_u16(), err);
            return Err(err);
        }
        response.json::<JsonValue>()
                .map_err(|e| ApiError::Transport(format!("Respuesta ilegible de {}: {}", path, e)))
    }

    fn get(&self, segments: &[&str]) -> Result<JsonValue, ApiError> {
        let url = self.url(segments)?;
        self.send("GET", &url, self.http.get(url.clone()))
    }

    fn get_with_query(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<JsonValue, ApiError> {
        let url = self.url(segments)?;
        self.send("GET", &url, self.http.get(url.clone()).query(query))
    }

    fn post(&self, segments: &[&str], body: &JsonValue) -> Result<JsonValue, ApiError> {
        let url = self.url(segments)?;
        self.send("POST", &url, self.http.post(url.clone()).json(body))
    }

    /// POST que crea una entidad y devuelve el id de la respuesta.
    fn post_entity(&self, segments: &[&str], envelope: &str, body: &JsonValue) -> Result<String, ApiError> {
        let created = self.post(segments, body)?;
        wire::extract_id(&created, envelope)
    }
}

fn list_field(body: &JsonValue, field: &str) -> Result<JsonValue, ApiError> {
    body.get(field)
        .cloned()
        .ok_or_else(|| ApiError::Transport(format!("Respuesta sin '{}'", field)))
}

impl ProvisioningApi for RestProvisioningClient {
    fn list_plugins(&self) -> Result<Vec<PluginSummary>, ApiError> {
        let body = self.get(&["plugins"])?;
        Ok(serde_json::from_value(list_field(&body, "plugins")?)?)
    }

    fn get_plugin_versions(&self, plugin_name: &str) -> Result<Vec<String>, ApiError> {
        let body = self.get(&["plugins", plugin_name])?;
        let plugin = list_field(&body, "plugin")?;
        Ok(serde_json::from_value(list_field(&plugin, "versions")?)?)
    }

    fn create_image_registration(&self, registration: &ImageRegistration) -> Result<String, ApiError> {
        let body = json!({
            "username": registration.user_name,
            "description": registration.description.clone().unwrap_or_default(),
        });
        let id = self.post_entity(&["images", &registration.image_id], "image", &body)?;
        if !registration.tags.is_empty() {
            self.post(&["images", &id, "tag"], &json!({ "tags": registration.tags }))?;
        }
        Ok(id)
    }

    fn find_node_group_templates(&self,
                                 plugin_name: &str,
                                 plugin_version: &str)
                                 -> Result<Vec<NodeGroupTemplateSummary>, ApiError> {
        let body = self.get_with_query(&[wire::collection_path(EntityKind::NodeGroupTemplate)],
                                       &[("plugin_name", plugin_name), ("hadoop_version", plugin_version)])?;
        let all: Vec<NodeGroupTemplateSummary> = serde_json::from_value(list_field(&body, "node_group_templates")?)?;
        // versiones antiguas del servicio ignoran el filtro
        Ok(all.into_iter()
              .filter(|t| t.plugin_name == plugin_name && t.plugin_version == plugin_version)
              .collect())
    }

    fn create_node_group_template(&self, request: &NodeGroupTemplateRequest) -> Result<String, ApiError> {
        self.post_entity(&[wire::collection_path(EntityKind::NodeGroupTemplate)],
                         wire::envelope(EntityKind::NodeGroupTemplate),
                         &wire::node_group_template_body(request))
    }

    fn create_cluster_template(&self, request: &ClusterTemplateRequest) -> Result<String, ApiError> {
        self.post_entity(&[wire::collection_path(EntityKind::ClusterTemplate)],
                         wire::envelope(EntityKind::ClusterTemplate),
                         &wire::cluster_template_body(request))
    }

    fn create_cluster(&self, request: &ClusterRequest) -> Result<String, ApiError> {
        self.post_entity(&[wire::collection_path(EntityKind::Cluster)],
                         wire::envelope(EntityKind::Cluster),
                         &wire::cluster_body(request))
    }

    fn list_job_types(&self) -> Result<Vec<String>, ApiError> {
        let body = self.get(&["job-types"])?;
        let types = list_field(&body, "job_types")?;
        let names = types.as_array()
                         .map(|items| {
                             items.iter()
                                  .filter_map(|t| t.get("name").and_then(JsonValue::as_str))
                                  .map(str::to_string)
                                  .collect()
                         })
                         .unwrap_or_default();
        Ok(names)
    }

    fn create_data_source(&self, request: &DataSourceRequest) -> Result<String, ApiError> {
        self.post_entity(&[wire::collection_path(EntityKind::DataSource)],
                         wire::envelope(EntityKind::DataSource),
                         &wire::data_source_body(request))
    }

    fn create_job_template(&self, request: &JobTemplateRequest) -> Result<String, ApiError> {
        self.post_entity(&[wire::collection_path(EntityKind::JobTemplate)],
                         wire::envelope(EntityKind::JobTemplate),
                         &wire::job_template_body(request))
    }

    fn create_job_execution(&self, request: &JobExecutionRequest) -> Result<String, ApiError> {
        self.post_entity(&["jobs", &request.job_template_id, "execute"],
                         wire::envelope(EntityKind::JobExecution),
                         &wire::job_execution_body(request))
    }

    fn get_entity_status(&self, kind: EntityKind, id: &str) -> Result<EntityStatus, ApiError> {
        let body = self.get(&[wire::collection_path(kind), id])?;
        wire::extract_status(kind, &body)
    }
}
