//! Contract tests for the task JSON documents exchanged with browsers and
//! the sync client.

use serde_json::json;

use todo_sync::models::{NewTask, Priority, Task, TaskPatch};

#[test]
fn task_document_shape() {
    let doc = json!({
        "id": "8d6f4a36-8f0e-4c64-9d38-0d3c1f6a2b11",
        "text": "Write report",
        "completed": false,
        "deadline": "2030-01-02T17:00",
        "priority": "high",
        "desc": "quarterly numbers",
        "createdAt": "2030-01-01T09:00:00.000000000Z",
        "updatedAt": "2030-01-01T09:30:00.000000000Z"
    });

    let task: Task = serde_json::from_value(doc.clone()).expect("parse");

    assert_eq!(task.priority, Priority::High);
    assert!(task.updated_at > task.created_at);
    let out = serde_json::to_value(&task).expect("serialize");
    assert_eq!(out.as_object().expect("object").len(), 8);
    assert_eq!(out["createdAt"].as_str().map(|s| s.ends_with('Z')), Some(true));
    assert_eq!(out["priority"], doc["priority"]);
}

#[test]
fn draft_document_omits_absent_priority() {
    let value = serde_json::to_value(NewTask::new("x")).expect("serialize");

    assert!(value.get("priority").is_none());
    assert_eq!(value["text"], "x");
}

#[test]
fn draft_document_carries_lowercase_priority() {
    let value =
        serde_json::to_value(NewTask::new("x").with_priority(Priority::Low)).expect("serialize");
    assert_eq!(value["priority"], "low");
}

#[test]
fn patch_document_lists_only_changed_fields() {
    let patch = TaskPatch {
        deadline: Some(String::new()),
        priority: Some(Priority::Medium),
        ..TaskPatch::default()
    };

    let value = serde_json::to_value(&patch).expect("serialize");

    assert_eq!(value, json!({ "deadline": "", "priority": "medium" }));
}
