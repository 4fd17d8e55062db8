pub mod definition;
pub mod payload;

pub use definition::{definition, definitions_for, Prerequisite, SkipError, SkipRule, StepAction, StepDefinition,
                     CLUSTER_GUIDE, JOB_GUIDE, JOB_TYPES_WITHOUT_DATA_SOURCES};
pub use payload::{ClusterLaunchSpec, ClusterTemplateSpec, DataSourceSpec, ImageSpec, JobLaunchSpec, JobTemplateSpec,
                  NodeGroupTemplateSpec, StepOutcome, StepPayload};
