//! The standard pipeline end to end, over the in-memory filesystem and a
//! scripted shell.

mod common;

use std::path::Path;

use common::{CONTACT, Harness, PARENT, context};
use kickstart_core::application::titles::*;
use kickstart_core::prelude::*;

#[tokio::test]
async fn library_run_scaffolds_and_commits_without_remote_steps() {
    let wired = Harness::new().wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let mut ctx = context("my-lib", Credentials::default());

    let report = wired.runner.run_all(&mut ctx).await;

    assert!(report.is_success(), "{:?}", report.outcome());
    let manifest = wired.fs.contents("/work/my-lib/package.json").unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest["name"], "my-lib");
    assert!(wired.fs.contents("/work/my-lib/README.md").is_some());
    assert!(wired.fs.contents("/work/my-lib/infra/main.tf").is_none());

    for skipped in [
        CHECK_DOMAIN_OWNERSHIP,
        PURCHASE_DOMAIN,
        CREATE_DATABASE,
        CREATE_IAM_USER,
        CREATE_REMOTE_REPOSITORY,
        GIT_PUSH,
        AWAIT_CI_RUN,
    ] {
        assert_eq!(report.status_of(skipped), Some(&TaskStatus::Skipped), "{skipped}");
    }
    assert_eq!(
        wired.shell.command_lines(),
        vec![
            "npm install",
            "git init",
            "git add .",
            "git commit -m Initial commit",
            "git tag -a v0.1.0 -m v0.1.0",
        ]
    );
}

#[tokio::test]
async fn domain_name_runs_in_application_mode() {
    let mut harness = Harness::new();
    harness
        .registrar
        .expect_is_owned()
        .times(1)
        .returning(|_| Ok(true));
    harness.registrar.expect_register().times(0);
    let wired = harness.wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let mut ctx = context("my-app.example.com", Credentials::default());

    let report = wired.runner.run_all(&mut ctx).await;

    assert!(report.is_success(), "{:?}", report.outcome());
    assert_eq!(report.status_of(VALIDATE_PACKAGE_NAME), Some(&TaskStatus::Skipped));
    assert_eq!(report.status_of(CHECK_DOMAIN_OWNERSHIP), Some(&TaskStatus::Succeeded));
    assert_eq!(report.status_of(PURCHASE_DOMAIN), Some(&TaskStatus::Skipped));
    assert!(wired.fs.contents("/work/my-app.example.com/infra/main.tf").is_some());
    assert!(wired.fs.contents("/work/my-app.example.com/.env").is_some());

    let manifest = wired
        .fs
        .contents("/work/my-app.example.com/package.json")
        .unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&manifest).unwrap();
    assert_eq!(manifest["private"], true);
}

#[tokio::test]
async fn unowned_domain_without_contact_stops_before_any_file_is_written() {
    let mut harness = Harness::new();
    harness
        .registrar
        .expect_is_owned()
        .times(1)
        .returning(|_| Ok(false));
    harness.registrar.expect_register().times(0);
    let wired = harness.wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let mut ctx = context("shop.example.com", Credentials::default());

    let report = wired.runner.run_all(&mut ctx).await;

    match report.outcome() {
        RunOutcome::Failed { task, error, cancelled } => {
            assert_eq!(task, PURCHASE_DOMAIN);
            assert!(matches!(error, TaskError::MissingInput { .. }));
            assert!(cancelled.iter().any(|t| t == CREATE_PROJECT_DIRECTORY));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!wired.fs.exists(Path::new("/work/shop.example.com")));
    assert!(wired.shell.command_lines().is_empty());
    assert!(
        wired
            .events
            .lines()
            .contains(&format!("cancel {AWAIT_INFRA_APPLY}"))
    );
}

#[tokio::test]
async fn owned_domain_with_contact_still_skips_purchase() {
    let mut harness = Harness::new();
    harness
        .registrar
        .expect_is_owned()
        .times(1)
        .returning(|_| Ok(true));
    let wired = harness.wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let credentials = Credentials {
        contact_details: Some(CONTACT.into()),
        ..Credentials::default()
    };
    let mut ctx = context("shop.example.com", credentials);

    let report = wired.runner.run_all(&mut ctx).await;

    assert!(report.is_success());
    assert_eq!(report.status_of(PURCHASE_DOMAIN), Some(&TaskStatus::Skipped));
}

#[tokio::test]
async fn single_task_runs_only_git_init_in_an_existing_directory() {
    let wired = Harness::new().wire();
    wired.fs.create_dir_all(Path::new("/work/my-lib")).unwrap();
    let mut ctx = context("my-lib", Credentials::default());

    let report = wired.runner.run_one(GIT_INIT, &mut ctx).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.records().len(), 1);
    assert_eq!(wired.shell.command_lines(), vec!["git init"]);
    let cwd = wired.shell.commands()[0].cwd.clone();
    assert_eq!(cwd.as_deref(), Some(Path::new("/work/my-lib")));
    assert!(wired.fs.contents("/work/my-lib/package.json").is_none());
}

#[tokio::test]
async fn existing_project_directory_is_refused() {
    let wired = Harness::new().wire();
    wired.fs.create_dir_all(Path::new("/work/my-lib")).unwrap();
    let mut ctx = context("my-lib", Credentials::default());

    let report = wired.runner.run_all(&mut ctx).await;

    match report.outcome() {
        RunOutcome::Failed { task, error, .. } => {
            assert_eq!(task, CREATE_PROJECT_DIRECTORY);
            assert!(matches!(error, TaskError::AlreadyExists { .. }));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(wired.shell.command_lines().is_empty());
}

#[tokio::test]
async fn npm_failure_is_reported_with_stderr() {
    let mut harness = Harness::new();
    harness.shell = harness.shell.fail("npm install", "ERESOLVE unable to resolve");
    let wired = harness.wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let mut ctx = context("my-lib", Credentials::default());

    let err = wired.runner.run_all(&mut ctx).await.into_result().unwrap_err();

    assert!(err.to_string().contains(INSTALL_DEPENDENCIES));
    assert_eq!(wired.shell.command_lines(), vec!["npm install"]);
}

#[tokio::test]
async fn application_run_links_the_workspace_and_waits_on_the_pushed_commit() {
    let mut harness = Harness::new();
    harness.shell = harness.shell.respond("git rev-parse HEAD", "abc123\n");
    harness.registrar.expect_is_owned().returning(|_| Ok(true));
    harness
        .source_host
        .expect_repository_exists()
        .returning(|_| Ok(false));
    harness
        .source_host
        .expect_create_repository()
        .times(1)
        .returning(|name, _| Ok(format!("git@github.com:acme/{name}.git")));
    harness
        .source_host
        .expect_commit_run_status()
        .withf(|repository, commit| repository == "shop.example.com" && commit == "abc123")
        .times(1)
        .returning(|_, _| Ok("success".to_string()));
    harness
        .infra
        .expect_create_workspace()
        .withf(|request| {
            request.name == "shop.example.com" && request.repository == "acme/shop.example.com"
        })
        .times(1)
        .returning(|_| Ok("ws-1".to_string()));
    harness
        .infra
        .expect_set_variable()
        .withf(|workspace_id, variable| workspace_id == "ws-1" && variable.key == "domain")
        .times(1)
        .returning(|_, _| Ok(()));
    harness
        .infra
        .expect_queue_run()
        .withf(|workspace_id, _| workspace_id == "ws-1")
        .times(1)
        .returning(|_, _| Ok("run-7".to_string()));
    harness
        .infra
        .expect_run_status()
        .withf(|run_id| run_id == "run-7")
        .times(1)
        .returning(|_| Ok("applied".to_string()));
    let wired = harness.wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let credentials = Credentials {
        github_token: Some("gh".into()),
        tf_org_token: Some("org".into()),
        tf_user_token: Some("user".into()),
        ..Credentials::default()
    };
    let mut ctx = context("shop.example.com", credentials);

    let report = wired.runner.run_all(&mut ctx).await;

    assert!(report.is_success(), "{:?}", report.outcome());
    assert_eq!(report.status_of(AWAIT_INFRA_APPLY), Some(&TaskStatus::Succeeded));
    assert_eq!(report.status_of(AWAIT_CI_RUN), Some(&TaskStatus::Succeeded));
    assert_eq!(ctx.outputs.workspace_id.as_deref(), Some("ws-1"));

    let events = wired.events.lines();
    let position = |line: String| events.iter().position(|e| *e == line).unwrap();
    assert!(
        position(format!("ok {CREATE_REMOTE_REPOSITORY}"))
            < position(format!("start {CREATE_INFRA_WORKSPACE}"))
    );
    assert!(position(format!("ok {GIT_PUSH}")) < position(format!("start {AWAIT_INFRA_APPLY}")));

    let lines = wired.shell.command_lines();
    let push = lines.iter().position(|l| l.starts_with("git push")).unwrap();
    let head = lines.iter().position(|l| l == "git rev-parse HEAD").unwrap();
    assert!(push < head);
}

#[tokio::test]
async fn infra_tasks_skip_without_a_source_host() {
    let mut harness = Harness::new();
    harness.registrar.expect_is_owned().returning(|_| Ok(true));
    harness.infra.expect_create_workspace().times(0);
    harness.infra.expect_queue_run().times(0);
    let wired = harness.wire();
    wired.fs.create_dir_all(Path::new(PARENT)).unwrap();
    let credentials = Credentials {
        tf_org_token: Some("org".into()),
        tf_user_token: Some("user".into()),
        ..Credentials::default()
    };
    let mut ctx = context("shop.example.com", credentials);

    let report = wired.runner.run_all(&mut ctx).await;

    assert!(report.is_success(), "{:?}", report.outcome());
    assert_eq!(report.status_of(CREATE_INFRA_WORKSPACE), Some(&TaskStatus::Skipped));
    assert_eq!(report.status_of(AWAIT_INFRA_APPLY), Some(&TaskStatus::Skipped));
}
