mod common;

use std::fs;
use std::sync::Barrier;
use std::thread;

use cfl_core::{canonicalize, fingerprint, CflError, ExpKind};
use cfl_launch::{
    ClientSpec, ExecutionHandlers, FederatedSetup, LaunchOpts, LaunchOutcome, Launcher,
    ServerModel, SummaryHandlers,
};
use cfl_store::{read_artifact, ResultStore};
use common::{capture_logs, scenario, Recording, Unreachable};

fn json_files(root: &std::path::Path) -> usize {
    ResultStore::new(root).artifacts().count()
}

#[test]
fn fresh_store_runs_the_benchmark_once() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path().join("results"));
    let record = scenario();
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );

    let outcome = launcher.launch(&record).expect("launch");
    let expected_name = canonicalize(&record);
    match &outcome {
        LaunchOutcome::Completed { kind, receipt } => {
            assert_eq!(*kind, ExpKind::Benchmark);
            assert_eq!(receipt.output_name, expected_name);
            assert!(receipt.path.exists());
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let calls = &launcher.handlers().calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, ExpKind::Benchmark);
    assert_eq!(calls[0].num_clients, 5);
    assert_eq!(calls[0].dataset, "mnist");
    assert_eq!(calls[0].output_name, expected_name);
    assert_eq!(json_files(&temp.path().join("results")), 1);
}

#[test]
fn second_run_is_skipped_as_duplicate() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let record = scenario();
    let mut first = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store.clone()),
        LaunchOpts::default(),
    );
    first.launch(&record).expect("first launch");

    let mut second = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );
    let outcome = second.launch(&record).expect("second launch");
    let name = canonicalize(&record);
    assert_eq!(
        outcome,
        LaunchOutcome::Duplicate {
            existing: name.clone(),
            output_name: name,
        }
    );
    assert!(second.handlers().calls.is_empty());
    assert_eq!(json_files(temp.path()), 1);
}

#[test]
fn build_failure_invokes_no_handler_and_writes_nothing() {
    for kind in ["benchmark", "client", "server"] {
        let temp = tempfile::tempdir().expect("tmp dir");
        let store = ResultStore::new(temp.path());
        let mut record = scenario();
        record.exp_type = Some(kind.into());
        let mut launcher = Launcher::new(
            store.clone(),
            Unreachable,
            Recording::new(store.clone()),
            LaunchOpts::default(),
        );

        let outcome = launcher.launch(&record).expect("build failures are not fatal");
        match outcome {
            LaunchOutcome::BuildFailed {
                output_name,
                reason,
            } => {
                assert_eq!(output_name, canonicalize(&record));
                assert!(reason.contains("connection reset"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(launcher.handlers().calls.is_empty());
        assert_eq!(json_files(temp.path()), 0);
        let claim = store.claim_path(&fingerprint(&canonicalize(&record)));
        assert!(!claim.exists(), "claim must be released after a failed build");
    }
}

#[test]
fn invalid_record_is_a_logged_build_failure() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let mut record = scenario();
    record.dataset = Some("imagenet".into());
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );

    let outcome = launcher.launch(&record).expect("launch");
    assert!(matches!(outcome, LaunchOutcome::BuildFailed { .. }));
    assert!(launcher.handlers().calls.is_empty());
}

#[test]
fn unrecognized_kind_fails_before_any_side_effect() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let root = temp.path().join("results");
    let store = ResultStore::new(&root);
    let mut record = scenario();
    record.exp_type = Some("bogus".into());
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );

    let err = launcher.launch(&record).expect_err("bogus kind is fatal");
    assert!(matches!(err, CflError::Config(_)));
    assert!(err.to_string().contains("bogus"));
    assert!(launcher.handlers().calls.is_empty());
    assert!(!root.exists());
}

#[test]
fn held_claim_reports_in_progress() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let record = scenario();
    let name = canonicalize(&record);
    let _held = store
        .claim(&fingerprint(&name), &name)
        .expect("claim")
        .expect("first claim");

    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );
    let outcome = launcher.launch(&record).expect("launch");
    assert_eq!(outcome, LaunchOutcome::InProgress { output_name: name });
    assert!(launcher.handlers().calls.is_empty());
}

#[test]
fn claims_can_be_disabled() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let record = scenario();
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts { claim: false },
    );

    launcher.launch(&record).expect("launch");
    assert!(!temp.path().join(".claims").exists());
    assert_eq!(launcher.handlers().calls.len(), 1);
}

#[test]
fn records_differing_in_unused_fields_are_distinct_runs() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );
    let record = scenario();
    let mut other_clusters = scenario();
    other_clusters.num_clusters = Some(4);

    launcher.launch(&record).expect("first");
    let outcome = launcher.launch(&other_clusters).expect("second");
    assert!(matches!(outcome, LaunchOutcome::Completed { .. }));
    assert_eq!(launcher.handlers().calls.len(), 2);
    assert_eq!(
        fs::read_dir(temp.path())
            .expect("read store")
            .filter_map(Result::ok)
            .filter(|entry| entry.path().extension().map_or(false, |ext| ext == "json"))
            .count(),
        2
    );
}

#[test]
fn concurrent_launches_execute_exactly_once() {
    for _ in 0..20 {
        let temp = tempfile::tempdir().expect("tmp dir");
        let store = ResultStore::new(temp.path());
        let record = scenario();
        let barrier = Barrier::new(2);

        let (outcomes, executions): (Vec<_>, Vec<_>) = thread::scope(|scope| {
            let workers: Vec<_> = (0..2)
                .map(|_| {
                    let store = store.clone();
                    let record = &record;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        let mut launcher = Launcher::new(
                            store.clone(),
                            FederatedSetup::default(),
                            Recording::new(store),
                            LaunchOpts::default(),
                        );
                        barrier.wait();
                        let outcome = launcher.launch(record).expect("launch");
                        (outcome, launcher.handlers().calls.len())
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().expect("worker"))
                .unzip()
        });

        assert_eq!(executions.iter().sum::<usize>(), 1, "outcomes: {outcomes:?}");
        let completed = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, LaunchOutcome::Completed { .. }))
            .count();
        assert_eq!(completed, 1, "outcomes: {outcomes:?}");
        assert!(outcomes.iter().all(|outcome| matches!(
            outcome,
            LaunchOutcome::Completed { .. }
                | LaunchOutcome::Duplicate { .. }
                | LaunchOutcome::InProgress { .. }
        )));
        assert_eq!(json_files(temp.path()), 1);
    }
}

#[test]
fn oversized_cluster_count_is_a_build_failure() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let mut record = scenario();
    record.num_clusters = Some(u64::MAX);
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );

    let outcome = launcher.launch(&record).expect("launch");
    match outcome {
        LaunchOutcome::BuildFailed { reason, .. } => assert!(reason.contains("num_clusters")),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(launcher.handlers().calls.is_empty());
    assert_eq!(json_files(temp.path()), 0);
}

#[test]
fn summary_handlers_size_clusters_from_the_clients() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let record = scenario();
    let name = canonicalize(&record);
    let server = ServerModel {
        dataset: "mnist".into(),
        heterogeneity_type: "label_skew".into(),
        num_clusters: u64::MAX,
        init_seed: 0,
    };
    let clients = (0..3)
        .map(|id| ClientSpec {
            id,
            cluster: id * 1_000_000_007,
            seed: id,
            samples_by_label: 1,
        })
        .collect();

    let receipt = SummaryHandlers::new(store)
        .run_server_side(server, clients, &record, &name)
        .expect("persist");
    let artifact = read_artifact(&receipt.path).expect("read");
    let sizes = &artifact.summary["cluster_sizes"];
    assert_eq!(sizes.as_object().map(|sizes| sizes.len()), Some(3));
    assert_eq!(sizes["1000000007"], 1);
}

#[test]
fn duplicate_notice_is_logged_at_warn() {
    let temp = tempfile::tempdir().expect("tmp dir");
    let store = ResultStore::new(temp.path());
    let record = scenario();
    let name = canonicalize(&record);
    let mut launcher = Launcher::new(
        store.clone(),
        FederatedSetup::default(),
        Recording::new(store),
        LaunchOpts::default(),
    );

    let first = capture_logs(|| launcher.launch(&record).expect("first"));
    assert!(!first.contains("already executed"), "{first}");

    let second = capture_logs(|| launcher.launch(&record).expect("second"));
    let notice = second
        .lines()
        .find(|line| line.contains("already executed"))
        .unwrap_or_else(|| panic!("no duplicate notice in {second}"));
    assert!(notice.contains("WARN"), "{notice}");
    assert!(notice.contains(&format!("{name}.json")), "{notice}");
}
