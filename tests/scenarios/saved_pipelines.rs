//! Test: pipelines saved to disk and run after loading

use crate::helpers::*;
use pipeline_shell::core::{ArgsStep, ExecStep, Pipeline, PersistenceError, StoreStep};
use pipeline_shell::persistence::PipelineStore;

#[tokio::test]
async fn test_loaded_pipeline_runs_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let store = PipelineStore::new(dir.path().join("saved").join("p.yaml"));

    let mut pipeline = Pipeline::new();
    pipeline.append(ExecStep::new(["echo", "a b"]).unwrap());
    pipeline.append(ArgsStep::whitespace());
    pipeline.append(StoreStep::new(dir.path().join("out.txt")));
    store.save(&pipeline).unwrap();

    let loaded = store.load_pipeline().unwrap();
    assert_eq!(loaded.steps(), pipeline.steps());

    let (first, _) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;
    let (second, _) = run_pipeline_with_script(&loaded, ScriptedRunner::new()).await;
    assert_eq!(first.final_args, second.final_args);
    assert_eq!(second.final_args, strings(&["a", "b"]));
}

#[tokio::test]
async fn test_hand_written_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.yaml");
    std::fs::write(
        &path,
        r#"version: 1
steps:
  - kind: exec
    program_args: [echo, "1 2"]
  - kind: args
    separator: " "
"#,
    )
    .unwrap();

    let pipeline = PipelineStore::new(&path).load_pipeline().unwrap();
    let (result, _) = run_pipeline_with_script(&pipeline, ScriptedRunner::new()).await;

    assert_clean_completion(&result);
    assert_eq!(result.final_args, strings(&["1", "2\n"]));
}

#[test]
fn test_future_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("p.yaml");
    std::fs::write(&path, "version: 99\nsteps: []\n").unwrap();

    assert!(matches!(
        PipelineStore::new(&path).load(),
        Err(PersistenceError::Corrupt { .. })
    ));
}
