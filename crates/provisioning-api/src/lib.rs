mod api;
mod api_stubs;
mod entities;
mod errors;
mod in_memory;
mod version;

pub use api::ProvisioningApi;
pub use api_stubs::ApiStubs;
pub use entities::{ClusterRequest, ClusterTemplateRequest, DataSourceRequest, EntityKind, EntityStatus, ImageRegistration,
                   JobExecutionRequest, JobTemplateRequest, NodeGroupRef, NodeGroupTemplateRequest,
                   NodeGroupTemplateSummary, PluginSummary};
pub use errors::ApiError;
pub use in_memory::{ApiOperation, InMemoryProvisioningApi};
pub use version::{compare_versions, sort_versions_desc};
