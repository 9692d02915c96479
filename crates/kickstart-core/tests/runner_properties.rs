//! Behavioural tests for the task runner.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use kickstart_core::prelude::*;

/// Shared log of which actions ran.
#[derive(Clone, Default)]
struct Calls(Arc<Mutex<Vec<String>>>);

impl Calls {
    fn record(&self, title: &str) {
        self.0.lock().unwrap().push(title.to_string());
    }

    fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Recording {
    title: String,
    calls: Calls,
    fail: bool,
}

#[async_trait]
impl TaskAction for Recording {
    async fn run(&self, _ctx: &mut RunContext) -> Result<(), TaskError> {
        self.calls.record(&self.title);
        if self.fail {
            Err(TaskError::validation(format!("{} broke", self.title)))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct CountingObserver {
    notified: Mutex<usize>,
    cancelled: Mutex<Vec<String>>,
}

impl RunObserver for CountingObserver {
    fn task_started(&self, _title: &str) {
        *self.notified.lock().unwrap() += 1;
    }
    fn task_skipped(&self, _title: &str) {}
    fn task_succeeded(&self, _title: &str) {}
    fn task_failed(&self, _title: &str, _error: &TaskError, _severity: Severity) {}
    fn task_cancelled(&self, title: &str, _cause: &str) {
        self.cancelled.lock().unwrap().push(title.to_string());
    }
}

fn task(title: &str, calls: &Calls) -> Task {
    Task::new(
        title,
        Recording {
            title: title.to_string(),
            calls: calls.clone(),
            fail: false,
        },
    )
}

fn failing(title: &str, calls: &Calls) -> Task {
    Task::new(
        title,
        Recording {
            title: title.to_string(),
            calls: calls.clone(),
            fail: true,
        },
    )
}

fn context() -> RunContext {
    RunContext::new(
        ProjectSpec::new("my-lib", "/tmp/work"),
        Default::default(),
        Credentials::default(),
    )
}

#[tokio::test]
async fn skipped_task_never_runs_and_the_run_moves_on() {
    let calls = Calls::default();
    let plan = Plan::new(vec![
        task("first", &calls),
        task("skipped", &calls).skip_when(|_| true),
        task("third", &calls),
    ])
    .unwrap();
    let runner = TaskRunner::new(plan, Arc::new(CountingObserver::default()));

    let report = runner.run_all(&mut context()).await;

    assert!(report.is_success());
    assert_eq!(calls.all(), vec!["first", "third"]);
    assert_eq!(report.status_of("skipped"), Some(&TaskStatus::Skipped));
}

#[tokio::test]
async fn failure_stops_every_later_action() {
    let calls = Calls::default();
    let observer = Arc::new(CountingObserver::default());
    let plan = Plan::new(vec![
        task("a", &calls),
        task("b", &calls).skip_when(|_| true),
        failing("c", &calls),
        task("d", &calls),
        task("e", &calls),
    ])
    .unwrap();
    let runner = TaskRunner::new(plan, observer.clone());

    let report = runner.run_all(&mut context()).await;

    assert_eq!(calls.all(), vec!["a", "c"]);
    match report.outcome() {
        RunOutcome::Failed { task, error, .. } => {
            assert_eq!(task, "c");
            assert_eq!(error.to_string(), "c broke");
        }
        RunOutcome::Success => panic!("run should have failed"),
    }
    assert_eq!(*observer.cancelled.lock().unwrap(), vec!["d", "e"]);
}

#[tokio::test]
async fn clean_run_visits_and_notifies_every_task() {
    let calls = Calls::default();
    let observer = Arc::new(CountingObserver::default());
    let plan = Plan::new((0..6).map(|i| task(&format!("t{i}"), &calls)).collect()).unwrap();
    let runner = TaskRunner::new(plan, observer.clone());

    let report = runner.run_all(&mut context()).await;

    assert!(report.is_success());
    assert_eq!(report.visited(), 6);
    assert_eq!(*observer.notified.lock().unwrap(), 6);
}

#[tokio::test]
async fn unknown_title_in_single_task_mode_touches_nothing() {
    let calls = Calls::default();
    let observer = Arc::new(CountingObserver::default());
    let plan = Plan::new(vec![task("Git init", &calls)]).unwrap();
    let runner = TaskRunner::new(plan, observer.clone());

    let err = runner
        .run_one("git init", &mut context())
        .await
        .unwrap_err();

    assert!(matches!(err, KickstartError::TaskNotFound { .. }));
    assert!(calls.all().is_empty());
    assert_eq!(*observer.notified.lock().unwrap(), 0);
}

#[tokio::test]
async fn single_task_mode_runs_only_that_task() {
    let calls = Calls::default();
    let plan = Plan::new(vec![
        task("a", &calls),
        task("b", &calls).depends_on(["a"]),
        task("c", &calls).depends_on(["b"]),
    ])
    .unwrap();
    let runner = TaskRunner::new(plan, Arc::new(CountingObserver::default()));

    let report = runner.run_one("b", &mut context()).await.unwrap();

    assert!(report.is_success());
    assert_eq!(calls.all(), vec!["b"]);
}

#[tokio::test]
async fn single_task_mode_still_honours_the_skip_predicate() {
    let calls = Calls::default();
    let plan = Plan::new(vec![task("a", &calls).skip_when(|ctx| !ctx.is_app())]).unwrap();
    let runner = TaskRunner::new(plan, Arc::new(CountingObserver::default()));

    let report = runner.run_one("a", &mut context()).await.unwrap();

    assert_eq!(report.status_of("a"), Some(&TaskStatus::Skipped));
    assert!(calls.all().is_empty());
}

#[tokio::test]
async fn dependencies_reorder_declared_tasks() {
    let calls = Calls::default();
    let plan = Plan::new(vec![
        task("push", &calls).depends_on(["commit"]),
        task("commit", &calls),
    ])
    .unwrap();
    let runner = TaskRunner::new(plan, Arc::new(CountingObserver::default()));

    runner.run_all(&mut context()).await;

    assert_eq!(calls.all(), vec!["commit", "push"]);
}
