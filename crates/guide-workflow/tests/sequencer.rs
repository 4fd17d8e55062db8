use guide_state::{GuideKind, InMemorySessionStore, JobType, PluginChoice, StepId, WorkflowSession, WorkflowStateStore};
use guide_workflow::step::{definitions_for, SkipError, SkipRule, JOB_TYPES_WITHOUT_DATA_SOURCES};
use guide_workflow::{GuideError, StepOutcome, StepSequencer};
use std::sync::Arc;

fn job_session(job_type: Option<JobType>) -> WorkflowSession {
  let mut s = WorkflowSession::new(GuideKind::JobExecution);
  s.job_type = job_type;
  s
}

#[test]
fn data_source_step_is_skipped_for_jobs_without_data_sources() {
  let seq = StepSequencer::new();
  for jt in ["Spark", "Storm", "Storm.Pyleus", "Java"] {
    let mut s = job_session(Some(JobType::from(jt)));
    assert_eq!(seq.current_step(&s), StepId::JobTemplate, "tipo {}", jt);
    s.job_template_id = Some("jt".into());
    assert_eq!(seq.current_step(&s), StepId::JobLaunch);
    s.job_execution_id = Some("je".into());
    assert_eq!(seq.current_step(&s), StepId::Complete);
  }
}

#[test]
fn data_source_step_is_reachable_for_other_or_unset_job_types() {
  let seq = StepSequencer::new();
  for jt in ["Pig", "Hive", "MapReduce", "MapReduce.Streaming", "Shell", "Personalizado"] {
    assert_eq!(seq.current_step(&job_session(Some(JobType::from(jt)))), StepId::DataSourceStep, "tipo {}", jt);
  }
  // sin tipo la regla no se puede evaluar y el paso no se salta
  let mut s = job_session(None);
  s.job_template_id = Some("jt".into());
  assert_eq!(seq.current_step(&s), StepId::JobTypeSelect);
  let data_step = &definitions_for(GuideKind::JobExecution)[1];
  assert_eq!(data_step.skip.evaluate(&s), Err(SkipError::MissingJobType));
  assert!(!seq.is_skipped(data_step, &s));
}

#[test]
fn skip_rule_matches_exact_job_type_text() {
  let rule = SkipRule::JobTypeIn(JOB_TYPES_WITHOUT_DATA_SOURCES);
  assert_eq!(rule.evaluate(&job_session(Some(JobType::StormPyleus))), Ok(true));
  assert_eq!(rule.evaluate(&job_session(Some(JobType::Other("spark".into())))), Ok(false));
  assert_eq!(SkipRule::Never.evaluate(&job_session(None)), Ok(false));
}

#[test]
fn reset_brings_back_the_initial_step() {
  let seq = StepSequencer::new();
  let state = WorkflowStateStore::new(Arc::new(InMemorySessionStore::new()));
  for guide in [GuideKind::Cluster, GuideKind::JobExecution] {
    let mut s = WorkflowSession::new(guide);
    s.selected_plugin = Some(PluginChoice::new("fake", "0.1"));
    s.job_type = Some(JobType::Pig);
    s.current_step = seq.current_step(&s);
    state.save("k", &s).unwrap();
    state.reset("k", guide).unwrap();
    let loaded = state.load("k", guide).unwrap();
    assert_eq!(seq.current_step(&loaded), guide.initial_step());
  }
}

#[test]
fn node_group_collection_only_grows() {
  let seq = StepSequencer::new();
  let mut s = WorkflowSession::new(GuideKind::Cluster);
  s.selected_plugin = Some(PluginChoice::new("fake", "0.1"));
  s.registered_image_id = Some("img".into());
  s.current_step = seq.current_step(&s);
  assert_eq!(s.current_step, StepId::NodeGroupSelect);

  let mut previous = 0;
  for id in ["a", "b", "a", "c"] {
    seq.advance(&mut s, StepId::NodeGroupSelect, StepOutcome::NodeGroupTemplateAdded { template_id: id.into() })
       .unwrap();
    assert!(s.node_group_template_ids.len() >= previous);
    previous = s.node_group_template_ids.len();
    assert_eq!(s.current_step, StepId::NodeGroupSelect);
  }
  assert_eq!(s.node_group_template_ids, vec!["a", "b", "c"]);

  seq.advance(&mut s, StepId::NodeGroupSelect, StepOutcome::NodeGroupsFinished).unwrap();
  assert_eq!(s.current_step, StepId::ClusterTemplate);
  assert_eq!(s.node_group_template_ids.len(), 3);
}

#[test]
fn outcome_for_another_step_is_an_invalid_transition() {
  let seq = StepSequencer::new();
  let mut s = WorkflowSession::new(GuideKind::Cluster);
  let before = s.clone();
  let err = seq.advance(&mut s, StepId::PluginSelect, StepOutcome::ImageRegistered { image_id: "img".into() })
               .unwrap_err();
  assert!(matches!(err, GuideError::InvalidTransition(_)));
  // resultado de la otra guía
  let err = seq.advance(&mut s, StepId::JobTypeSelect, StepOutcome::JobTypeChosen(JobType::Pig)).unwrap_err();
  assert!(matches!(err, GuideError::InvalidTransition(_)));
  assert_eq!(s, before);
}

#[test]
fn reconcile_fixes_a_stale_cached_step() {
  let seq = StepSequencer::new();
  let mut s = WorkflowSession::new(GuideKind::Cluster);
  s.selected_plugin = Some(PluginChoice::new("fake", "0.1"));
  assert!(seq.reconcile(&mut s));
  assert_eq!(s.current_step, StepId::ImageRegister);
  assert!(!seq.reconcile(&mut s));
}
