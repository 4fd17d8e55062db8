//! guide-workflow: guías de aprovisionamiento paso a paso
//!
//! Define los pasos de las dos guías (cluster y ejecución de trabajo), el
//! secuenciador que decide el paso actual a partir de las elecciones
//! acumuladas, el adaptador que traduce cada paso en una llamada al servicio
//! de aprovisionamiento y `GuideService`, la fachada que usa la interfaz.

pub mod config;
pub mod engine;
pub mod errors;
pub mod factory;
pub mod options;
pub mod polling;
pub mod service;
pub mod step;

pub use config::GuideConfig;
pub use engine::{StepActionAdapter, StepSequencer};
pub use errors::GuideError;
pub use factory::GuideFactory;
pub use options::{StepOptions, StepOptionsLoader, SuggestedCluster};
pub use polling::{wait_for_status, PollConfig};
pub use service::{GuideService, GuideSnapshot};
pub use step::{ClusterLaunchSpec, ClusterTemplateSpec, DataSourceSpec, ImageSpec, JobLaunchSpec, JobTemplateSpec,
               NodeGroupTemplateSpec, StepDefinition, StepOutcome, StepPayload};
