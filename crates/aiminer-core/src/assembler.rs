//! Task assembly: queue a parsed task on a state document.
//!
//! Ids are `1 + max(existing ids)`, defaulting to 1 on an empty queue. Ids are
//! never reused or renumbered, and existing entries are never touched: the
//! queue only grows by one entry per assembled task.

use aiminer_contracts::{
    document::StateDocument,
    error::{BrainError, BrainResult},
    task::Task,
};

/// The id the next queued task receives.
///
/// Fails with `InvalidDocument` when the highest existing id is `i64::MAX`,
/// since no larger id exists.
pub fn next_task_id(document: &StateDocument) -> BrainResult<i64> {
    let highest = document.task_ids().max().unwrap_or(0);
    highest.checked_add(1).ok_or_else(|| BrainError::InvalidDocument {
        reason: format!("task id {highest} leaves no room for another task"),
    })
}

/// Append `task` to the document's queue, creating the queue when absent.
///
/// Overwrites the task's placeholder `id` and `created_at`, then returns the
/// document together with the task exactly as it was queued.
pub fn assemble(
    mut document: StateDocument,
    mut task: Task,
    created_at: i64,
) -> BrainResult<(StateDocument, Task)> {
    task.id = next_task_id(&document)?;
    task.created_at = created_at;

    let entry = serde_json::to_value(&task).map_err(|e| BrainError::Serialization {
        reason: format!("task {} could not be encoded: {e}", task.id),
    })?;

    document.push_task(entry)?;
    Ok((document, task))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use aiminer_contracts::{
        document::StateDocument,
        error::BrainError,
        task::{Action, Coordinates, Task, TaskStatus},
    };

    use super::{assemble, next_task_id};

    fn doc(value: serde_json::Value) -> StateDocument {
        serde_json::from_value(value).unwrap()
    }

    fn move_task() -> Task {
        Task::pending(Action::MoveTo(Coordinates { x: 1, y: 2, z: 3 }))
    }

    #[test]
    fn next_id_follows_highest_existing_id() {
        let d = doc(json!({
            "tasks": [
                { "id": 3, "type": "WAIT", "status": "PENDING", "createdAt": 1, "parameters": {} },
                { "id": 7, "type": "WAIT", "status": "PENDING", "createdAt": 2, "parameters": {} }
            ]
        }));
        assert_eq!(next_task_id(&d).unwrap(), 8);
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(next_task_id(&doc(json!({}))).unwrap(), 1);
        assert_eq!(next_task_id(&doc(json!({ "tasks": [] }))).unwrap(), 1);
        assert_eq!(next_task_id(&doc(json!({ "tasks": null }))).unwrap(), 1);
    }

    #[test]
    fn next_id_is_not_gap_filling() {
        let d = doc(json!({ "tasks": [ { "id": 10 }, { "id": 2 } ] }));
        assert_eq!(next_task_id(&d).unwrap(), 11);
    }

    #[test]
    fn assemble_creates_queue_when_absent() {
        let (d, task) = assemble(doc(json!({ "memory": {} })), move_task(), 1_234).unwrap();

        assert_eq!(task.id, 1);
        assert_eq!(task.created_at, 1_234);
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(d.task_count(), 1);
        assert_eq!(
            d.tasks()[0],
            json!({
                "id": 1, "type": "MOVE_TO", "status": "PENDING", "createdAt": 1234,
                "parameters": { "x": 1, "y": 2, "z": 3 }
            })
        );
    }

    #[test]
    fn assemble_is_append_only() {
        let existing = json!([
            { "id": 3, "type": "GET_ENTITY_POSITION", "status": "COMPLETED", "reason": "kept" },
            { "id": 7, "type": "CHAT", "status": "IN_PROGRESS", "createdAt": 9, "parameters": { "message": "HI" } }
        ]);
        let before = doc(json!({ "tasks": existing.clone() }));

        let (after, task) = assemble(before, Task::pending(Action::Wait), 99).unwrap();

        assert_eq!(task.id, 8);
        let tasks = after.tasks();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0], existing[0]);
        assert_eq!(tasks[1], existing[1]);
        assert_eq!(tasks[2]["id"], json!(8));
    }

    #[test]
    fn integral_float_ids_are_not_reused() {
        let d = doc(json!({ "tasks": [ { "id": 1.0, "type": "WAIT" } ] }));
        assert_eq!(next_task_id(&d).unwrap(), 2);

        let (after, task) = assemble(d, move_task(), 5).unwrap();
        assert_eq!(task.id, 2);
        assert_eq!(after.tasks()[1]["id"], json!(2));
    }

    #[test]
    fn exhausted_id_space_is_rejected() {
        let d = doc(json!({ "tasks": [ { "id": i64::MAX } ] }));
        assert!(matches!(next_task_id(&d), Err(BrainError::InvalidDocument { .. })));

        let result = assemble(d, move_task(), 5);
        assert!(matches!(result, Err(BrainError::InvalidDocument { .. })));
    }

    #[test]
    fn assemble_rejects_non_array_queue() {
        let result = assemble(doc(json!({ "tasks": "none" })), move_task(), 5);
        assert!(matches!(result, Err(BrainError::InvalidDocument { .. })));
    }
}
