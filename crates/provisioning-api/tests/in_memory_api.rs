use provisioning_api::{compare_versions, sort_versions_desc, ApiError, ApiOperation, ApiStubs, ClusterRequest,
                       ClusterTemplateRequest, EntityKind, EntityStatus, InMemoryProvisioningApi, NodeGroupRef,
                       NodeGroupTemplateRequest, PluginSummary, ProvisioningApi};
use std::cmp::Ordering;

fn ngt_request(name: &str) -> NodeGroupTemplateRequest {
  NodeGroupTemplateRequest { name: name.into(),
                             plugin_name: "fake".into(),
                             plugin_version: "0.1".into(),
                             flavor_id: "m1.small".into(),
                             node_processes: vec!["namenode".into()],
                             image_id: None,
                             description: None }
}

#[test]
fn sample_api_offers_plugins_and_existing_templates() {
  let api = ApiStubs::sample_api();
  let plugins = api.list_plugins().unwrap();
  assert!(plugins.iter().any(|p| p.name == "fake" && p.title == "Fake Plugin"));
  assert_eq!(api.get_plugin_versions("spark").unwrap(), vec!["1.6.0".to_string(), "2.3".to_string()]);
  assert!(matches!(api.get_plugin_versions("nope"), Err(ApiError::NotFound(_))));

  let existing = api.find_node_group_templates("vanilla", "2.7.1").unwrap();
  assert_eq!(existing.len(), 2);
  assert!(api.find_node_group_templates("vanilla", "2.8.2").unwrap().is_empty());
  assert_eq!(api.get_entity_status(EntityKind::NodeGroupTemplate, "ngt-vanilla-master").unwrap(),
             EntityStatus::Available);
}

#[test]
fn cluster_creation_validates_references() {
  let api = ApiStubs::sample_api();
  let ngt = api.create_node_group_template(&ngt_request("master")).unwrap();
  let bad = ClusterTemplateRequest { name: "ct".into(),
                                     plugin_name: "fake".into(),
                                     plugin_version: "0.1".into(),
                                     node_groups: vec![NodeGroupRef { name: "ng".into(),
                                                                      node_group_template_id: "missing".into(),
                                                                      count: 1 }],
                                     description: None };
  assert!(matches!(api.create_cluster_template(&bad), Err(ApiError::Validation(_))));

  let good = ClusterTemplateRequest { node_groups: vec![NodeGroupRef { name: "ng".into(),
                                                                       node_group_template_id: ngt,
                                                                       count: 2 }],
                                      ..bad };
  let ct = api.create_cluster_template(&good).unwrap();
  let cluster = api.create_cluster(&ClusterRequest { name: "c1".into(),
                                                     plugin_name: "fake".into(),
                                                     plugin_version: "0.1".into(),
                                                     cluster_template_id: ct,
                                                     default_image_id: "img".into(),
                                                     user_keypair_id: None,
                                                     net_id: None,
                                                     description: None })
                   .unwrap();
  assert_eq!(api.get_entity_status(EntityKind::Cluster, &cluster).unwrap(), EntityStatus::Active);
  // mismo id con otra clase de entidad
  assert!(api.get_entity_status(EntityKind::JobExecution, &cluster).is_err());
}

#[test]
fn injected_failures_are_consumed_or_persistent() {
  let api = InMemoryProvisioningApi::new().with_plugin(PluginSummary::new("fake", "Fake Plugin", ["0.1"]));
  api.fail_next(ApiOperation::CreateNodeGroupTemplate, ApiError::Transport("caído".into()));
  assert_eq!(api.create_node_group_template(&ngt_request("a")), Err(ApiError::Transport("caído".into())));
  assert!(api.create_node_group_template(&ngt_request("a")).is_ok());

  api.fail_always(ApiOperation::ListPlugins, ApiError::Transport("caído".into()));
  assert!(api.list_plugins().is_err());
  assert!(api.list_plugins().is_err());
  api.clear_failures();
  assert_eq!(api.list_plugins().unwrap().len(), 1);
  assert_eq!(api.call_count(ApiOperation::ListPlugins), 3);
}

#[test]
fn scripted_statuses_advance_and_stick_on_last() {
  let api = InMemoryProvisioningApi::new();
  api.script_statuses(EntityKind::Cluster,
                      "c1",
                      vec![EntityStatus::InProgress("Spawning".into()), EntityStatus::Active]);
  assert_eq!(api.get_entity_status(EntityKind::Cluster, "c1").unwrap(),
             EntityStatus::InProgress("Spawning".into()));
  assert_eq!(api.get_entity_status(EntityKind::Cluster, "c1").unwrap(), EntityStatus::Active);
  assert_eq!(api.get_entity_status(EntityKind::Cluster, "c1").unwrap(), EntityStatus::Active);
}

#[test]
fn status_text_is_parsed_case_insensitively() {
  assert_eq!(EntityStatus::parse("SUCCEEDED"), EntityStatus::Succeeded);
  assert_eq!(EntityStatus::parse("Active"), EntityStatus::Active);
  assert_eq!(EntityStatus::parse("KILLED"), EntityStatus::Failed("KILLED".into()));
  assert!(EntityStatus::parse("Error").is_failure());
  assert_eq!(EntityStatus::parse("Spawning"), EntityStatus::InProgress("Spawning".into()));
}

#[test]
fn versions_sort_numerically_newest_first() {
  let mut versions = vec!["2.9".to_string(), "2.10.0".to_string(), "2.11".to_string(), "2.7.1".to_string()];
  sort_versions_desc(&mut versions);
  assert_eq!(versions, vec!["2.11", "2.10.0", "2.9", "2.7.1"]);
  assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
  assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
}
