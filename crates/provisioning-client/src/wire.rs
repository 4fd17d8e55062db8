// Formato de cable del servicio (API v1.1).
//
// Las entidades viajan envueltas en una clave en singular
// (`{"cluster": {...}}`) y las listas en plural. Los errores llevan
// `error_message` en el cuerpo.
use provisioning_api::{ApiError, ClusterRequest, ClusterTemplateRequest, DataSourceRequest, EntityKind, EntityStatus,
                       JobExecutionRequest, JobTemplateRequest, NodeGroupTemplateRequest};
use reqwest::Url;
use serde_json::{json, Value as JsonValue};

/// URL de `segments` bajo `base_url`. Cada segmento se codifica entero, así
/// que un id con `/`, `?` o `#` no cambia el recurso pedido.
pub(crate) fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url, ApiError> {
    if let Some(bad) = segments.iter().find(|s| matches!(s.trim(), "" | "." | "..")) {
        return Err(ApiError::Validation(format!("Identificador no válido: '{}'", bad)));
    }
    let mut url = Url::parse(base_url).map_err(|e| ApiError::Transport(format!("URL base no válida {}: {}", base_url, e)))?;
    url.path_segments_mut()
       .map_err(|_| ApiError::Transport(format!("URL base no válida {}", base_url)))?
       .pop_if_empty()
       .extend(segments);
    Ok(url)
}

/// Ruta de la colección de una clase de entidad.
pub(crate) fn collection_path(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Image => "images",
        EntityKind::NodeGroupTemplate => "node-group-templates",
        EntityKind::ClusterTemplate => "cluster-templates",
        EntityKind::Cluster => "clusters",
        EntityKind::DataSource => "data-sources",
        EntityKind::JobTemplate => "jobs",
        EntityKind::JobExecution => "job-executions",
    }
}

/// Clave que envuelve a la entidad en las respuestas.
pub(crate) fn envelope(kind: EntityKind) -> &'static str {
    kind.as_str()
}

pub(crate) fn extract_id(body: &JsonValue, envelope: &str) -> Result<String, ApiError> {
    body.get(envelope)
        .and_then(|e| e.get("id"))
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .ok_or_else(|| ApiError::Transport(format!("Respuesta sin '{}.id'", envelope)))
}

/// Estado de la entidad en el cuerpo de `GET <colección>/<id>`.
///
/// Las ejecuciones guardan el estado en `info.status`; plantillas, imágenes y
/// orígenes de datos no tienen estado y se consideran disponibles si existen.
pub(crate) fn extract_status(kind: EntityKind, body: &JsonValue) -> Result<EntityStatus, ApiError> {
    let entity = body.get(envelope(kind))
                     .ok_or_else(|| ApiError::Transport(format!("Respuesta sin '{}'", envelope(kind))))?;
    let raw = match kind {
        EntityKind::Cluster => entity.get("status").and_then(JsonValue::as_str),
        EntityKind::JobExecution => entity.get("info")
                                          .and_then(|i| i.get("status"))
                                          .and_then(JsonValue::as_str)
                                          .or_else(|| entity.get("status").and_then(JsonValue::as_str)),
        _ => return Ok(EntityStatus::Available),
    };
    raw.map(EntityStatus::parse)
       .ok_or_else(|| ApiError::Transport(format!("Respuesta de {} sin estado", kind)))
}

/// Traduce una respuesta no exitosa al error de la API.
pub(crate) fn map_error(status: u16, body: &str) -> ApiError {
    let message = serde_json::from_str::<JsonValue>(body).ok()
                                                         .and_then(|v| {
                                                             v.get("error_message")
                                                              .and_then(JsonValue::as_str)
                                                              .map(str::to_string)
                                                         })
                                                         .unwrap_or_else(|| body.trim().to_string());
    match status {
        400 => ApiError::Validation(message),
        404 => ApiError::NotFound(message),
        _ => ApiError::Transport(format!("HTTP {}: {}", status, message)),
    }
}

pub(crate) fn node_group_template_body(r: &NodeGroupTemplateRequest) -> JsonValue {
    let mut body = json!({
        "name": r.name,
        "plugin_name": r.plugin_name,
        "hadoop_version": r.plugin_version,
        "flavor_id": r.flavor_id,
        "node_processes": r.node_processes,
    });
    if let Some(image) = &r.image_id {
        body["image_id"] = json!(image);
    }
    if let Some(desc) = &r.description {
        body["description"] = json!(desc);
    }
    body
}

pub(crate) fn cluster_template_body(r: &ClusterTemplateRequest) -> JsonValue {
    json!({
        "name": r.name,
        "plugin_name": r.plugin_name,
        "hadoop_version": r.plugin_version,
        "node_groups": r.node_groups,
        "description": r.description.clone().unwrap_or_default(),
    })
}

pub(crate) fn cluster_body(r: &ClusterRequest) -> JsonValue {
    let mut body = json!({
        "name": r.name,
        "plugin_name": r.plugin_name,
        "hadoop_version": r.plugin_version,
        "cluster_template_id": r.cluster_template_id,
        "default_image_id": r.default_image_id,
        "description": r.description.clone().unwrap_or_default(),
    });
    if let Some(keypair) = &r.user_keypair_id {
        body["user_keypair_id"] = json!(keypair);
    }
    if let Some(net) = &r.net_id {
        body["neutron_management_network"] = json!(net);
    }
    body
}

pub(crate) fn data_source_body(r: &DataSourceRequest) -> JsonValue {
    json!({
        "name": r.name,
        "type": r.ds_type,
        "url": r.url,
        "description": r.description.clone().unwrap_or_default(),
    })
}

pub(crate) fn job_template_body(r: &JobTemplateRequest) -> JsonValue {
    json!({
        "name": r.name,
        "type": r.job_type,
        "mains": r.mains,
        "libs": r.libs,
        "description": r.description.clone().unwrap_or_default(),
    })
}

pub(crate) fn job_execution_body(r: &JobExecutionRequest) -> JsonValue {
    let mut body = json!({
        "cluster_id": r.cluster_id,
        "job_configs": r.configs,
    });
    if let Some(input) = &r.input_id {
        body["input_id"] = json!(input);
    }
    if let Some(output) = &r.output_id {
        body["output_id"] = json!(output);
    }
    body
}
