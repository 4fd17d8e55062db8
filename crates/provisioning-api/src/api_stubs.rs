use crate::entities::{NodeGroupTemplateSummary, PluginSummary};
use crate::InMemoryProvisioningApi;

pub struct ApiStubs;

impl ApiStubs {
    /// Crea un servicio en memoria pre-populado con plugins, tipos de trabajo
    /// y un par de plantillas de grupo de nodos de ejemplo.
    pub fn sample_api() -> InMemoryProvisioningApi {
        InMemoryProvisioningApi::new().with_plugin(PluginSummary::new("fake", "Fake Plugin", ["0.1"]))
                                      .with_plugin(PluginSummary::new("vanilla",
                                                                      "Vanilla Apache Hadoop",
                                                                      ["2.7.1", "2.10.0", "2.8.2"]))
                                      .with_plugin(PluginSummary::new("spark", "Apache Spark", ["1.6.0", "2.3"]))
                                      .with_plugin(PluginSummary::new("storm", "Apache Storm", ["1.1.0", "1.2"]))
                                      .with_job_types(["Pig",
                                                       "Hive",
                                                       "Spark",
                                                       "Storm",
                                                       "Storm.Pyleus",
                                                       "MapReduce",
                                                       "MapReduce.Streaming",
                                                       "Java",
                                                       "Shell"])
                                      .with_node_group_template(NodeGroupTemplateSummary { id: "ngt-vanilla-master".into(),
                                                                                           name: "master".into(),
                                                                                           plugin_name: "vanilla".into(),
                                                                                           plugin_version: "2.7.1".into(),
                                                                                           node_processes: vec!["namenode".into(),
                                                                                                                "resourcemanager".into()] })
                                      .with_node_group_template(NodeGroupTemplateSummary { id: "ngt-vanilla-worker".into(),
                                                                                           name: "worker".into(),
                                                                                           plugin_name: "vanilla".into(),
                                                                                           plugin_version: "2.7.1".into(),
                                                                                           node_processes: vec!["datanode".into(),
                                                                                                                "nodemanager".into()] })
    }
}
