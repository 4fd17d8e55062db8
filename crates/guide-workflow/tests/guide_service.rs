use guide_state::{GuideKind, InMemorySessionStore, JobType, PluginChoice, SessionStore, StepId, WorkflowStateStore};
use guide_workflow::errors::TRANSPORT_USER_MESSAGE;
use guide_workflow::{ClusterLaunchSpec, ClusterTemplateSpec, DataSourceSpec, GuideConfig, GuideError, GuideFactory,
                     GuideService, ImageSpec, JobLaunchSpec, JobTemplateSpec, NodeGroupTemplateSpec, StepOptions,
                     StepPayload};
use provisioning_api::{ApiError, ApiOperation, ApiStubs, EntityKind, EntityStatus, InMemoryProvisioningApi,
                       PluginSummary};
use std::sync::Arc;

const KEY: &str = "navegador-1";

fn fake_api() -> Arc<InMemoryProvisioningApi> {
  Arc::new(ApiStubs::sample_api().with_plugin(PluginSummary::new("Fake Plugin", "Fake Plugin", ["0.1"])))
}

fn service_with(api: Arc<InMemoryProvisioningApi>) -> (GuideService, Arc<InMemorySessionStore>) {
  let store = Arc::new(InMemorySessionStore::new());
  (GuideService::new(store.clone(), api, GuideConfig::default()), store)
}

fn ngt(name: &str) -> StepPayload {
  StepPayload::AddNodeGroupTemplate(NodeGroupTemplateSpec { name: name.into(),
                                                            flavor_id: "m1.small".into(),
                                                            node_processes: vec!["datanode".into()],
                                                            description: None })
}

fn image() -> StepPayload {
  StepPayload::RegisterImage(ImageSpec { image_id: "img-1".into(),
                                         user_name: "ubuntu".into(),
                                         description: None,
                                         tags: vec!["fake".into()] })
}

/// Lleva la guía de clusters hasta `ClusterTemplate` con dos grupos.
fn cluster_guide_until_template(svc: &GuideService) {
  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::PluginSelect,
                  StepPayload::ChoosePlugin { plugin_name: "Fake Plugin".into(), plugin_version: "0.1".into() })
     .unwrap();
  svc.submit_step(KEY, GuideKind::Cluster, StepId::ImageRegister, image()).unwrap();
  svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, ngt("master")).unwrap();
  svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, ngt("worker")).unwrap();
  svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, StepPayload::FinishNodeGroups).unwrap();
}

fn launch_payload() -> StepPayload {
  StepPayload::LaunchCluster(ClusterLaunchSpec { name: "c1".into(),
                                                 user_keypair_id: None,
                                                 net_id: None,
                                                 description: None })
}

#[test]
fn cluster_guide_walks_through_every_step() {
  let (svc, _) = service_with(fake_api());
  let snap = svc.enter_guide(KEY, GuideKind::Cluster).unwrap();
  assert_eq!(snap.current_step, StepId::PluginSelect);

  let snap = svc.submit_step(KEY,
                             GuideKind::Cluster,
                             StepId::PluginSelect,
                             StepPayload::ChoosePlugin { plugin_name: "Fake Plugin".into(),
                                                         plugin_version: "0.1".into() })
                .unwrap();
  assert_eq!(snap.current_step, StepId::ImageRegister);

  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::ImageRegister, image()).unwrap();
  assert_eq!(snap.current_step, StepId::NodeGroupSelect);
  assert_eq!(snap.session.registered_image_id.as_deref(), Some("img-1"));

  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, ngt("master")).unwrap();
  assert_eq!(snap.session.node_group_template_ids.len(), 1);
  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, ngt("worker")).unwrap();
  assert_eq!(snap.session.node_group_template_ids.len(), 2);
  assert_eq!(snap.current_step, StepId::NodeGroupSelect);

  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, StepPayload::FinishNodeGroups)
                .unwrap();
  assert_eq!(snap.current_step, StepId::ClusterTemplate);

  let snap = svc.submit_step(KEY,
                             GuideKind::Cluster,
                             StepId::ClusterTemplate,
                             StepPayload::CreateClusterTemplate(ClusterTemplateSpec { name: "ct".into(),
                                                                                      ..Default::default() }))
                .unwrap();
  assert_eq!(snap.current_step, StepId::ClusterLaunch);

  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::ClusterLaunch, launch_payload()).unwrap();
  assert_eq!(snap.current_step, StepId::Complete);
  assert!(snap.session.is_complete());
  assert!(snap.session.cluster_id.is_some());
  assert_eq!(snap.step_title, "");
}

#[test]
fn spark_job_goes_straight_to_job_template() {
  let (svc, _) = service_with(fake_api());
  let snap = svc.submit_step(KEY,
                             GuideKind::JobExecution,
                             StepId::JobTypeSelect,
                             StepPayload::ChooseJobType { job_type: JobType::Spark })
                .unwrap();
  assert_eq!(snap.current_step, StepId::JobTemplate);
  assert!(snap.session.data_source_ids.is_empty());

  // el paso saltado no admite envíos
  let err = svc.submit_step(KEY,
                            GuideKind::JobExecution,
                            StepId::DataSourceStep,
                            StepPayload::FinishDataSources)
               .unwrap_err();
  assert!(matches!(err,
                   GuideError::StepOutOfOrder { expected: StepId::JobTemplate, submitted: StepId::DataSourceStep }));
}

#[test]
fn transport_failure_on_launch_keeps_the_step() {
  let api = fake_api();
  let (svc, store) = service_with(api.clone());
  cluster_guide_until_template(&svc);
  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::ClusterTemplate,
                  StepPayload::CreateClusterTemplate(ClusterTemplateSpec { name: "ct".into(), ..Default::default() }))
     .unwrap();

  let key = WorkflowStateStore::storage_key(KEY, GuideKind::Cluster);
  let before = store.get(&key).unwrap();

  api.fail_next(ApiOperation::CreateCluster, ApiError::Transport("connection reset".into()));
  let err = svc.submit_step(KEY, GuideKind::Cluster, StepId::ClusterLaunch, launch_payload()).unwrap_err();
  match &err {
    GuideError::Transport(m) => assert!(m.contains("connection reset")),
    other => panic!("se esperaba Transport, llegó {:?}", other),
  }
  assert_eq!(err.user_message(), TRANSPORT_USER_MESSAGE);
  assert_eq!(store.get(&key).unwrap(), before);

  let snap = svc.enter_guide(KEY, GuideKind::Cluster).unwrap();
  assert_eq!(snap.current_step, StepId::ClusterLaunch);
  assert!(snap.session.cluster_id.is_none());
}

#[test]
fn failed_submissions_leave_the_stored_session_untouched() {
  let api = fake_api();
  let (svc, store) = service_with(api.clone());
  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::PluginSelect,
                  StepPayload::ChoosePlugin { plugin_name: "Fake Plugin".into(), plugin_version: "0.1".into() })
     .unwrap();
  let key = WorkflowStateStore::storage_key(KEY, GuideKind::Cluster);
  let before = store.get(&key).unwrap();

  // validación del servicio: usuario vacío
  let err = svc.submit_step(KEY,
                            GuideKind::Cluster,
                            StepId::ImageRegister,
                            StepPayload::RegisterImage(ImageSpec { image_id: "img".into(),
                                                                   user_name: " ".into(),
                                                                   description: None,
                                                                   tags: vec![] }))
               .unwrap_err();
  assert!(matches!(err, GuideError::Validation(_)));
  // acción que no corresponde al paso
  let err = svc.submit_step(KEY, GuideKind::Cluster, StepId::ImageRegister, StepPayload::FinishNodeGroups)
               .unwrap_err();
  assert!(matches!(err, GuideError::InvalidPayload { step: StepId::ImageRegister, .. }));
  // paso fuera de orden
  let err = svc.submit_step(KEY, GuideKind::Cluster, StepId::ClusterLaunch, launch_payload()).unwrap_err();
  assert!(matches!(err, GuideError::StepOutOfOrder { expected: StepId::ImageRegister, .. }));
  // el reinicio por un plugin inválido tampoco se guarda
  let err = svc.submit_step(KEY,
                            GuideKind::Cluster,
                            StepId::PluginSelect,
                            StepPayload::ChoosePlugin { plugin_name: "Fake Plugin".into(),
                                                        plugin_version: "9.9".into() })
               .unwrap_err();
  assert_eq!(err.user_message(), "El plugin Fake Plugin no ofrece la versión 9.9");

  assert_eq!(store.get(&key).unwrap(), before);
  assert_eq!(api.call_count(ApiOperation::CreateCluster), 0);
}

#[test]
fn finishing_an_empty_collection_is_rejected_without_calls() {
  let api = fake_api();
  let (svc, _) = service_with(api.clone());
  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::PluginSelect,
                  StepPayload::ChoosePlugin { plugin_name: "Fake Plugin".into(), plugin_version: "0.1".into() })
     .unwrap();
  svc.submit_step(KEY, GuideKind::Cluster, StepId::ImageRegister, image()).unwrap();
  let calls = api.calls().len();
  let err = svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, StepPayload::FinishNodeGroups)
               .unwrap_err();
  assert!(matches!(err, GuideError::Validation(_)));
  assert_eq!(api.calls().len(), calls);
}

#[test]
fn choosing_the_plugin_again_restarts_the_cluster_guide() {
  let (svc, _) = service_with(fake_api());
  cluster_guide_until_template(&svc);
  let snap = svc.submit_step(KEY,
                             GuideKind::Cluster,
                             StepId::PluginSelect,
                             StepPayload::ChoosePlugin { plugin_name: "vanilla".into(),
                                                         plugin_version: "2.7.1".into() })
                .unwrap();
  assert_eq!(snap.current_step, StepId::ImageRegister);
  assert!(snap.session.node_group_template_ids.is_empty());
  assert!(!snap.session.node_groups_done);
  assert_eq!(snap.session.selected_plugin.map(|p| p.plugin_version).as_deref(), Some("2.7.1"));
}

#[test]
fn reset_requires_confirmation() {
  let (svc, _) = service_with(fake_api());
  svc.submit_step(KEY,
                  GuideKind::JobExecution,
                  StepId::JobTypeSelect,
                  StepPayload::ChooseJobType { job_type: JobType::Pig })
     .unwrap();
  svc.reset_guide(KEY, GuideKind::JobExecution, false).unwrap();
  assert_eq!(svc.enter_guide(KEY, GuideKind::JobExecution).unwrap().current_step, StepId::DataSourceStep);
  svc.reset_guide(KEY, GuideKind::JobExecution, true).unwrap();
  assert_eq!(svc.enter_guide(KEY, GuideKind::JobExecution).unwrap().current_step, StepId::JobTypeSelect);
  // reiniciar una guía que nunca se usó
  svc.reset_guide("otra", GuideKind::Cluster, true).unwrap();
}

#[test]
fn job_guide_uses_data_sources_and_the_cluster_from_the_cluster_guide() {
  let api = fake_api();
  let (svc, _) = service_with(api.clone());
  cluster_guide_until_template(&svc);
  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::ClusterTemplate,
                  StepPayload::CreateClusterTemplate(ClusterTemplateSpec { name: "ct".into(), ..Default::default() }))
     .unwrap();
  let cluster_id = svc.submit_step(KEY, GuideKind::Cluster, StepId::ClusterLaunch, launch_payload())
                      .unwrap()
                      .session
                      .cluster_id
                      .unwrap();

  svc.submit_step(KEY,
                  GuideKind::JobExecution,
                  StepId::JobTypeSelect,
                  StepPayload::ChooseJobType { job_type: JobType::Pig })
     .unwrap();
  let mut ids = Vec::new();
  for name in ["entrada", "salida"] {
    let snap = svc.submit_step(KEY,
                               GuideKind::JobExecution,
                               StepId::DataSourceStep,
                               StepPayload::AddDataSource(DataSourceSpec { name: name.into(),
                                                                           ds_type: "swift".into(),
                                                                           url: format!("swift://datos/{}", name),
                                                                           description: None }))
                  .unwrap();
    ids = snap.session.data_source_ids.clone();
  }
  svc.submit_step(KEY, GuideKind::JobExecution, StepId::DataSourceStep, StepPayload::FinishDataSources).unwrap();
  let snap = svc.submit_step(KEY,
                             GuideKind::JobExecution,
                             StepId::JobTemplate,
                             StepPayload::CreateJobTemplate(JobTemplateSpec { name: "wordcount".into(),
                                                                              mains: vec!["script.pig".into()],
                                                                              libs: vec![],
                                                                              description: None }))
                .unwrap();
  assert_eq!(snap.current_step, StepId::JobLaunch);
  match &snap.options {
    StepOptions::LaunchJob { suggested_cluster: Some(c) } => {
      assert_eq!(c.cluster_id, cluster_id);
      assert_eq!(c.status, EntityStatus::Active);
      assert!(c.warning.is_none());
    }
    other => panic!("opciones inesperadas: {:?}", other),
  }

  let snap = svc.submit_step(KEY,
                             GuideKind::JobExecution,
                             StepId::JobLaunch,
                             StepPayload::LaunchJob(JobLaunchSpec { input_id: Some(ids[0].clone()),
                                                                    output_id: Some(ids[1].clone()),
                                                                    ..Default::default() }))
                .unwrap();
  assert_eq!(snap.current_step, StepId::Complete);
  let execution = snap.session.job_execution_id.unwrap();
  assert_eq!(svc.wait_for_status(EntityKind::JobExecution, &execution, &[EntityStatus::Succeeded]).unwrap(),
             EntityStatus::Succeeded);
}

#[test]
fn options_are_loaded_and_degrade_on_errors() {
  let api = fake_api();
  let (svc, _) = service_with(api.clone());
  match svc.enter_guide(KEY, GuideKind::Cluster).unwrap().options {
    StepOptions::Plugins { plugins } => {
      let vanilla = plugins.iter().find(|p| p.name == "vanilla").unwrap();
      assert_eq!(vanilla.versions, vec!["2.10.0", "2.8.2", "2.7.1"]);
    }
    other => panic!("opciones inesperadas: {:?}", other),
  }

  api.fail_next(ApiOperation::ListPlugins, ApiError::Transport("caído".into()));
  assert_eq!(svc.enter_guide(KEY, GuideKind::Cluster).unwrap().options,
             StepOptions::Plugins { plugins: vec![] });

  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::PluginSelect,
                  StepPayload::ChoosePlugin { plugin_name: "vanilla".into(), plugin_version: "2.7.1".into() })
     .unwrap();
  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::ImageRegister, image()).unwrap();
  match snap.options {
    StepOptions::NodeGroupTemplates { existing, show_existing } => {
      assert_eq!(existing.len(), 2);
      assert!(show_existing);
    }
    other => panic!("opciones inesperadas: {:?}", other),
  }
  // una plantilla existente cuenta igual que una nueva
  let snap = svc.submit_step(KEY,
                             GuideKind::Cluster,
                             StepId::NodeGroupSelect,
                             StepPayload::UseExistingNodeGroupTemplate { template_id: "ngt-vanilla-master".into() })
                .unwrap();
  assert_eq!(snap.session.node_group_template_ids, vec!["ngt-vanilla-master"]);

  api.fail_next(ApiOperation::FindNodeGroupTemplates, ApiError::Transport("caído".into()));
  assert_eq!(svc.enter_guide(KEY, GuideKind::Cluster).unwrap().options,
             StepOptions::NodeGroupTemplates { existing: vec![], show_existing: true });
}

#[test]
fn cluster_in_error_is_suggested_with_a_warning() {
  let api = fake_api();
  let (svc, store) = service_with(api.clone());
  let state = WorkflowStateStore::new(store);
  let mut cluster_guide = state.load(KEY, GuideKind::Cluster).unwrap();
  cluster_guide.cluster_id = Some("c-err".into());
  state.save(KEY, &cluster_guide).unwrap();
  let mut job_guide = state.load(KEY, GuideKind::JobExecution).unwrap();
  job_guide.job_type = Some(JobType::Java);
  job_guide.job_template_id = Some("jt".into());
  state.save(KEY, &job_guide).unwrap();

  api.script_statuses(EntityKind::Cluster, "c-err", vec![EntityStatus::Error]);
  match svc.enter_guide(KEY, GuideKind::JobExecution).unwrap().options {
    StepOptions::LaunchJob { suggested_cluster: Some(c) } => assert!(c.warning.is_some()),
    other => panic!("opciones inesperadas: {:?}", other),
  }

  api.script_statuses(EntityKind::Cluster, "c-err", vec![EntityStatus::InProgress("Spawning".into())]);
  assert_eq!(svc.enter_guide(KEY, GuideKind::JobExecution).unwrap().options,
             StepOptions::LaunchJob { suggested_cluster: None });
}

#[test]
fn job_type_must_be_offered_by_the_service() {
  let api = Arc::new(InMemoryProvisioningApi::new().with_job_types(["Pig"]));
  let svc = GuideFactory::with_api(api);
  let err = svc.submit_step(KEY,
                            GuideKind::JobExecution,
                            StepId::JobTypeSelect,
                            StepPayload::ChooseJobType { job_type: JobType::Spark })
               .unwrap_err();
  assert!(matches!(err, GuideError::Validation(_)));
  match svc.enter_guide(KEY, GuideKind::JobExecution).unwrap().options {
    StepOptions::JobTypes { job_types } => assert_eq!(job_types, vec![JobType::Pig]),
    other => panic!("opciones inesperadas: {:?}", other),
  }
}

#[test]
fn corrupted_snapshot_is_replaced_by_a_fresh_guide() {
  let store = Arc::new(InMemorySessionStore::new());
  store.set(&WorkflowStateStore::storage_key(KEY, GuideKind::Cluster), serde_json::json!("basura")).unwrap();
  let svc = GuideService::new(store, fake_api(), GuideConfig::default());
  let snap = svc.enter_guide(KEY, GuideKind::Cluster).unwrap();
  assert_eq!(snap.current_step, StepId::PluginSelect);
  assert!(snap.session.is_fresh());
}

#[test]
fn in_memory_factory_serves_the_sample_api() {
  let svc = GuideFactory::in_memory();
  assert_eq!(svc.config(), &GuideConfig::default());
  let snap = svc.enter_guide(KEY, GuideKind::JobExecution).unwrap();
  match snap.options {
    StepOptions::JobTypes { job_types } => assert_eq!(job_types.len(), 9),
    other => panic!("opciones inesperadas: {:?}", other),
  }
}

#[test]
fn existing_template_of_another_plugin_is_rejected() {
  let api = fake_api();
  let (svc, store) = service_with(api.clone());
  svc.submit_step(KEY,
                  GuideKind::Cluster,
                  StepId::PluginSelect,
                  StepPayload::ChoosePlugin { plugin_name: "Fake Plugin".into(), plugin_version: "0.1".into() })
     .unwrap();
  svc.submit_step(KEY, GuideKind::Cluster, StepId::ImageRegister, image()).unwrap();
  let before = WorkflowStateStore::new(store.clone()).load(KEY, GuideKind::Cluster).unwrap();

  let err = svc.submit_step(KEY,
                            GuideKind::Cluster,
                            StepId::NodeGroupSelect,
                            StepPayload::UseExistingNodeGroupTemplate { template_id: "ngt-vanilla-master".into() })
               .unwrap_err();
  assert!(matches!(err, GuideError::Validation(ref m) if m.contains("ngt-vanilla-master")));
  assert_eq!(WorkflowStateStore::new(store).load(KEY, GuideKind::Cluster).unwrap(), before);

  // una plantilla inexistente tampoco se acepta
  let err = svc.submit_step(KEY,
                            GuideKind::Cluster,
                            StepId::NodeGroupSelect,
                            StepPayload::UseExistingNodeGroupTemplate { template_id: "ngt-nada".into() })
               .unwrap_err();
  assert!(matches!(err, GuideError::Validation(_)));
}

#[test]
fn job_launch_without_cluster_only_uses_a_suggested_one() {
  let api = fake_api();
  let (svc, store) = service_with(api.clone());
  let state = WorkflowStateStore::new(store);
  let mut cluster_guide = state.load(KEY, GuideKind::Cluster).unwrap();
  cluster_guide.cluster_id = Some("c-del".into());
  state.save(KEY, &cluster_guide).unwrap();
  let mut job_guide = state.load(KEY, GuideKind::JobExecution).unwrap();
  job_guide.job_type = Some(JobType::Java);
  job_guide.job_template_id = Some("jt".into());
  state.save(KEY, &job_guide).unwrap();
  api.script_statuses(EntityKind::JobTemplate, "jt", vec![EntityStatus::Available]);

  api.script_statuses(EntityKind::Cluster, "c-del", vec![EntityStatus::InProgress("Deleting".into())]);
  let snap = svc.enter_guide(KEY, GuideKind::JobExecution).unwrap();
  assert_eq!(snap.options, StepOptions::LaunchJob { suggested_cluster: None });
  let launch = || StepPayload::LaunchJob(JobLaunchSpec::default());
  let err = svc.submit_step(KEY, GuideKind::JobExecution, StepId::JobLaunch, launch()).unwrap_err();
  assert!(matches!(err, GuideError::Validation(_)));
  assert_eq!(api.call_count(ApiOperation::CreateJobExecution), 0);
  assert_eq!(state.load(KEY, GuideKind::JobExecution).unwrap().current_step, StepId::JobLaunch);

  api.script_statuses(EntityKind::Cluster, "c-del", vec![EntityStatus::Active]);
  let snap = svc.submit_step(KEY, GuideKind::JobExecution, StepId::JobLaunch, launch()).unwrap();
  assert!(snap.session.is_complete());
  assert!(snap.session.job_execution_id.is_some());
}

#[test]
fn entering_a_guide_recomputes_and_stores_an_edited_snapshot() {
  let (svc, store) = service_with(fake_api());
  let state = WorkflowStateStore::new(store);
  let mut session = state.load(KEY, GuideKind::Cluster).unwrap();
  session.selected_plugin = Some(PluginChoice::new("Fake Plugin", "0.1"));
  session.registered_image_id = Some("img-1".into());
  assert_eq!(session.current_step, StepId::PluginSelect);
  state.save(KEY, &session).unwrap();

  let snap = svc.enter_guide(KEY, GuideKind::Cluster).unwrap();
  assert_eq!(snap.current_step, StepId::NodeGroupSelect);
  assert_eq!(state.load(KEY, GuideKind::Cluster).unwrap().current_step, StepId::NodeGroupSelect);

  // la guía sigue desde el paso recalculado
  let snap = svc.submit_step(KEY, GuideKind::Cluster, StepId::NodeGroupSelect, ngt("master")).unwrap();
  assert_eq!(snap.session.node_group_template_ids.len(), 1);
}
