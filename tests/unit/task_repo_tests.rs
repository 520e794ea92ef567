//! Unit tests for `TaskRepo` against an in-memory store.
//!
//! Covers create defaults, newest-first listing, partial updates, deletes,
//! and the error taxonomy for unknown ids and bad input.

use std::sync::Arc;

use todo_sync::models::{NewTask, Priority, TaskPatch};
use todo_sync::persistence::{db, task_repo::TaskRepo};
use todo_sync::AppError;

async fn repo() -> TaskRepo {
    let db = db::connect_memory().await.expect("db");
    TaskRepo::new(Arc::new(db))
}

// ─── create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_identity_and_defaults() {
    let repo = repo().await;

    let task = repo.create(NewTask::new("Write report")).await.expect("create");

    assert!(!task.id.is_empty());
    assert_eq!(task.text, "Write report");
    assert!(!task.completed);
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.deadline, "");
    assert_eq!(task.desc, "");
    assert_eq!(task.created_at, task.updated_at);
}

#[tokio::test]
async fn create_persists_all_fields() {
    let repo = repo().await;
    let draft = NewTask::new("Ship release")
        .with_priority(Priority::High)
        .with_deadline("2030-01-02T17:00")
        .with_desc("tag and publish");

    let created = repo.create(draft).await.expect("create");
    let fetched = repo.get_by_id(&created.id).await.expect("get");

    assert_eq!(fetched, created);
    assert_eq!(fetched.priority, Priority::High);
    assert_eq!(fetched.deadline, "2030-01-02T17:00");
    assert_eq!(fetched.desc, "tag and publish");
}

#[tokio::test]
async fn create_assigns_distinct_ids() {
    let repo = repo().await;

    let a = repo.create(NewTask::new("a")).await.expect("create a");
    let b = repo.create(NewTask::new("b")).await.expect("create b");

    assert_ne!(a.id, b.id);
}

#[tokio::test]
async fn blank_text_is_rejected_and_not_persisted() {
    let repo = repo().await;

    let result = repo.create(NewTask::new("   ")).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(repo.count().await.expect("count"), 0);
}

// ─── list ────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_returns_newest_first() {
    let repo = repo().await;
    let first = repo.create(NewTask::new("first")).await.expect("create");
    let second = repo.create(NewTask::new("second")).await.expect("create");
    let third = repo.create(NewTask::new("third")).await.expect("create");

    let ids: Vec<String> = repo
        .list()
        .await
        .expect("list")
        .into_iter()
        .map(|t| t.id)
        .collect();

    assert_eq!(ids, vec![third.id, second.id, first.id]);
}

#[tokio::test]
async fn list_of_empty_store_is_empty() {
    let repo = repo().await;
    assert!(repo.list().await.expect("list").is_empty());
}

// ─── update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn completion_round_trip_changes_only_updated_at() {
    let repo = repo().await;
    let original = repo.create(NewTask::new("toggle me")).await.expect("create");

    let done = repo
        .update(&original.id, &TaskPatch::completed(true))
        .await
        .expect("complete");
    assert!(done.completed);

    let undone = repo
        .update(&original.id, &TaskPatch::completed(false))
        .await
        .expect("reopen");

    assert!(undone.updated_at >= original.updated_at);
    let mut normalized = undone.clone();
    normalized.updated_at = original.updated_at;
    assert_eq!(normalized, original);
}

#[tokio::test]
async fn update_leaves_unsupplied_fields_alone() {
    let repo = repo().await;
    let created = repo
        .create(
            NewTask::new("draft slides")
                .with_priority(Priority::Low)
                .with_desc("ten slides"),
        )
        .await
        .expect("create");

    let patch = TaskPatch {
        text: Some("final slides".into()),
        ..TaskPatch::default()
    };
    let updated = repo.update(&created.id, &patch).await.expect("update");

    assert_eq!(updated.text, "final slides");
    assert_eq!(updated.priority, Priority::Low);
    assert_eq!(updated.desc, "ten slides");
    assert!(!updated.completed);
    assert_eq!(updated.created_at, created.created_at);

    let stored = repo.get_by_id(&created.id).await.expect("get");
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_can_clear_deadline() {
    let repo = repo().await;
    let created = repo
        .create(NewTask::new("call bank").with_deadline("2030-01-01"))
        .await
        .expect("create");

    let patch = TaskPatch {
        deadline: Some(String::new()),
        ..TaskPatch::default()
    };
    let updated = repo.update(&created.id, &patch).await.expect("update");

    assert_eq!(updated.deadline, "");
}

#[tokio::test]
async fn update_unknown_id_is_not_found() {
    let repo = repo().await;

    let result = repo
        .update("00000000-0000-4000-8000-000000000000", &TaskPatch::completed(true))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn empty_patch_is_invalid_request_for_any_id() {
    let repo = repo().await;
    let created = repo.create(NewTask::new("x")).await.expect("create");

    let known = repo.update(&created.id, &TaskPatch::default()).await;
    let unknown = repo.update("missing", &TaskPatch::default()).await;

    assert!(matches!(known, Err(AppError::InvalidRequest(_))));
    assert!(matches!(unknown, Err(AppError::InvalidRequest(_))));
}

#[tokio::test]
async fn update_to_blank_text_is_rejected_and_not_applied() {
    let repo = repo().await;
    let created = repo.create(NewTask::new("keep me")).await.expect("create");

    let patch = TaskPatch {
        text: Some("  ".into()),
        completed: Some(true),
        ..TaskPatch::default()
    };
    let result = repo.update(&created.id, &patch).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    let stored = repo.get_by_id(&created.id).await.expect("get");
    assert_eq!(stored, created);
}

// ─── delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_removes_task() {
    let repo = repo().await;
    let created = repo.create(NewTask::new("remove me")).await.expect("create");

    repo.delete(&created.id).await.expect("delete");

    assert!(matches!(
        repo.get_by_id(&created.id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(repo.count().await.expect("count"), 0);
}

#[tokio::test]
async fn second_delete_is_not_found() {
    let repo = repo().await;
    let created = repo.create(NewTask::new("once")).await.expect("create");

    repo.delete(&created.id).await.expect("first delete");
    let second = repo.delete(&created.id).await;

    assert!(matches!(second, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn delete_leaves_other_tasks() {
    let repo = repo().await;
    let keep = repo.create(NewTask::new("keep")).await.expect("create");
    let drop = repo.create(NewTask::new("drop")).await.expect("create");

    repo.delete(&drop.id).await.expect("delete");

    let remaining = repo.list().await.expect("list");
    assert_eq!(remaining, vec![keep]);
}

// ─── file-backed store ───────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reconnect() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("nested").join("todos.db");

    let created = {
        let pool = db::connect(&path).await.expect("connect");
        let repo = TaskRepo::new(Arc::new(pool.clone()));
        let task = repo.create(NewTask::new("persist me")).await.expect("create");
        pool.close().await;
        task
    };

    let pool = db::connect(&path).await.expect("reconnect");
    let repo = TaskRepo::new(Arc::new(pool));
    let fetched = repo.get_by_id(&created.id).await.expect("get");
    assert_eq!(fetched, created);
}

// ─── concurrent writers on a file store ──────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_updates_on_file_store_all_succeed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let pool = db::connect(&temp.path().join("todos.db"))
        .await
        .expect("connect");
    let repo = TaskRepo::new(Arc::new(pool));

    let mut ids = Vec::new();
    for i in 0..8 {
        let task = repo
            .create(NewTask::new(format!("task {i}")))
            .await
            .expect("create");
        ids.push(task.id);
    }

    let mut handles = Vec::new();
    for round in 0..5 {
        for id in &ids {
            let repo = repo.clone();
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                let patch = TaskPatch {
                    completed: Some(round % 2 == 0),
                    text: Some(format!("round {round}")),
                    desc: Some(format!("note {round}")),
                    ..TaskPatch::default()
                };
                repo.update(&id, &patch).await
            }));
        }
    }

    let mut written = Vec::new();
    for handle in handles {
        written.push(handle.await.expect("join").expect("update"));
    }
    assert_eq!(written.len(), 40);

    for id in &ids {
        let stored = repo.get_by_id(id).await.expect("get");
        assert!(
            written.contains(&stored),
            "stored record must equal one complete write: {stored:?}"
        );
        assert_eq!(
            stored.text.trim_start_matches("round "),
            stored.desc.trim_start_matches("note ")
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_sequential_write_wins_after_contention() {
    let temp = tempfile::tempdir().expect("tempdir");
    let pool = db::connect(&temp.path().join("todos.db"))
        .await
        .expect("connect");
    let repo = TaskRepo::new(Arc::new(pool));
    let task = repo.create(NewTask::new("contended")).await.expect("create");

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let repo = repo.clone();
            let id = task.id.clone();
            tokio::spawn(async move {
                let patch = TaskPatch {
                    text: Some(format!("writer {i}")),
                    ..TaskPatch::default()
                };
                repo.update(&id, &patch).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.expect("join").expect("update");
    }

    let last = repo
        .update(
            &task.id,
            &TaskPatch {
                text: Some("final".into()),
                priority: Some(Priority::High),
                ..TaskPatch::default()
            },
        )
        .await
        .expect("final update");

    let stored = repo.get_by_id(&task.id).await.expect("get");
    assert_eq!(stored, last);
    assert_eq!(stored.text, "final");
    assert_eq!(stored.created_at, task.created_at);
}
