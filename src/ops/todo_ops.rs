use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;

use crate::cli::output;
use crate::io::daily::{self, DailyError};
use crate::model::todo::{Line, TodoLine, TodoState};
use crate::parse::render_line;
use crate::remote::RemoteError;
use crate::remote::todoist::TaskService;

/// What a sync run did, for the summary line and for tests. Per-item detail
/// is printed as it happens.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Tasks closed remotely after being completed locally
    pub closed_remotely: usize,
    /// Local items marked done because the remote no longer reports them
    pub completed_locally: usize,
    /// New local items pushed to the remote service
    pub pushed: usize,
    /// Remote tasks appended as new local items
    pub pulled: usize,
    /// Individual remote calls that failed and were left for retry
    pub failures: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("could not fetch the remote task set: {0}")]
    Fetch(#[source] RemoteError),
    #[error(transparent)]
    Daily(#[from] DailyError),
}

/// Reconcile the local TODO file with the remote task service.
///
/// Each remote call is attempted independently: a failed close or create is
/// reported, counted, and leaves that item's encoding unchanged so the next
/// run retries it. Only a failure to fetch the remote active set aborts the
/// whole run, before the file has been touched.
pub fn sync(
    todo_file: &Path,
    service: &dyn TaskService,
    today: NaiveDate,
) -> Result<SyncOutcome, SyncError> {
    let remote = service.fetch_active().map_err(SyncError::Fetch)?;
    let active_ids: HashSet<u64> = remote.iter().map(|t| t.id).collect();

    let mut lines = daily::read_lines(todo_file)?;
    let mut outcome = SyncOutcome::default();
    let mut closed_now: HashSet<u64> = HashSet::new();

    // Items completed locally that the remote still reports open: close them
    for line in &lines {
        if let Line::Todo(todo) = line
            && todo.state == TodoState::Done
            && let Some(id) = todo.remote_id
            && active_ids.contains(&id)
        {
            match service.close(id) {
                Ok(()) => {
                    output::notice(&format!("Closed \"{}\"", todo.content));
                    closed_now.insert(id);
                    outcome.closed_remotely += 1;
                }
                Err(e) => {
                    output::error(&format!("Unable to close task {}: {}", id, e));
                    outcome.failures += 1;
                }
            }
        }
    }

    // The remote is authoritative for closure: open items it has dropped
    // from the active set are marked done, one by one
    for line in lines.iter_mut() {
        if let Line::Todo(todo) = line
            && todo.state == TodoState::Open
            && let Some(id) = todo.remote_id
            && !active_ids.contains(&id)
        {
            todo.state = TodoState::Done;
            outcome.completed_locally += 1;
        }
    }

    // Push purely local items, attaching the assigned id on success
    for line in lines.iter_mut() {
        if let Line::Todo(todo) = line
            && todo.state == TodoState::Open
            && todo.remote_id.is_none()
        {
            match service.create(&todo.content, today) {
                Ok(id) => {
                    todo.remote_id = Some(id);
                    output::success(&format!("Added \"{}\" to Todoist", todo.content));
                    outcome.pushed += 1;
                }
                Err(e) => {
                    output::error(&format!(
                        "Unable to add task to Todoist: {}: {}",
                        todo.content, e
                    ));
                    outcome.failures += 1;
                }
            }
        }
    }

    // Pull down remote tasks not yet present anywhere in the file. The id is
    // matched by substring over every line, so lines appended here count for
    // the tasks that follow.
    for task in &remote {
        if closed_now.contains(&task.id) {
            continue;
        }
        let needle = task.id.to_string();
        if lines.iter().any(|l| render_line(l).contains(&needle)) {
            continue;
        }
        output::success(&format!("Adding \"{}\" from Todoist", task.content));
        lines.push(Line::Todo(TodoLine::new(
            TodoState::Open,
            Some(task.id),
            task.content.clone(),
        )));
        outcome.pulled += 1;
    }

    daily::write_lines(todo_file, &lines)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::todoist::RemoteTask;
    use pretty_assertions::assert_eq;
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// In-memory stand-in for the remote task service
    #[derive(Default)]
    struct FakeService {
        active: RefCell<Vec<RemoteTask>>,
        closed: RefCell<Vec<u64>>,
        fail_close: HashSet<u64>,
        fail_create: bool,
        fail_fetch: bool,
        next_id: Cell<u64>,
    }

    impl FakeService {
        fn with_active(tasks: &[(u64, &str)]) -> Self {
            let service = FakeService {
                next_id: Cell::new(100),
                ..FakeService::default()
            };
            *service.active.borrow_mut() = tasks
                .iter()
                .map(|(id, content)| RemoteTask {
                    id: *id,
                    content: content.to_string(),
                })
                .collect();
            service
        }
    }

    impl TaskService for FakeService {
        fn fetch_active(&self) -> Result<Vec<RemoteTask>, RemoteError> {
            if self.fail_fetch {
                return Err(RemoteError::Unexpected("fetch down".to_string()));
            }
            Ok(self.active.borrow().clone())
        }

        fn close(&self, id: u64) -> Result<(), RemoteError> {
            if self.fail_close.contains(&id) {
                return Err(RemoteError::Unexpected("close down".to_string()));
            }
            self.closed.borrow_mut().push(id);
            self.active.borrow_mut().retain(|t| t.id != id);
            Ok(())
        }

        fn create(&self, content: &str, _due: NaiveDate) -> Result<u64, RemoteError> {
            if self.fail_create {
                return Err(RemoteError::Unexpected("create down".to_string()));
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            self.active.borrow_mut().push(RemoteTask {
                id,
                content: content.to_string(),
            });
            Ok(id)
        }
    }

    fn todo_file(tmp: &TempDir, content: &str) -> PathBuf {
        let path = tmp.path().join("7.md");
        fs::write(&path, content).unwrap();
        path
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
    }

    const HEADER: &str = "### Date :: 8/7/2026\n### Tags :: \n\n";

    #[test]
    fn test_new_local_item_gains_remote_id() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, &format!("{HEADER}- [ ] water the plants\n"));
        let service = FakeService::with_active(&[]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.pushed, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [ ] (100) water the plants\n")
        );
        // ...and the service now reports it in the active set
        assert_eq!(
            service.fetch_active().unwrap(),
            vec![RemoteTask {
                id: 100,
                content: "water the plants".to_string()
            }]
        );
    }

    #[test]
    fn test_completed_local_item_closes_remote_task() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, &format!("{HEADER}- [x] (42) pay rent\n"));
        let service = FakeService::with_active(&[(42, "pay rent")]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.closed_remotely, 1);
        assert_eq!(*service.closed.borrow(), vec![42]);
        // The local line keeps its done encoding
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [x] (42) pay rent\n")
        );
    }

    #[test]
    fn test_stale_local_open_item_is_marked_done() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, &format!("{HEADER}- [ ] (42) vanished remotely\n"));
        let service = FakeService::with_active(&[]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.completed_locally, 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [x] (42) vanished remotely\n")
        );
    }

    #[test]
    fn test_every_stale_item_is_reclassified() {
        // Multiple stale items must each flip, not just the last one seen
        let tmp = TempDir::new().unwrap();
        let path = todo_file(
            &tmp,
            &format!("{HEADER}- [ ] (1) first stale\n- [ ] (2) second stale\n- [ ] (3) still active\n"),
        );
        let service = FakeService::with_active(&[(3, "still active")]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.completed_locally, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [x] (1) first stale\n- [x] (2) second stale\n- [ ] (3) still active\n")
        );
    }

    #[test]
    fn test_remote_tasks_are_pulled_down() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, HEADER);
        let service =
            FakeService::with_active(&[(4301, "review the doc"), (4302, "book travel")]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.pulled, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [ ] (4301) review the doc\n- [ ] (4302) book travel\n")
        );
    }

    #[test]
    fn test_pull_never_duplicates_an_id_already_in_the_file() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(
            &tmp,
            &format!("{HEADER}- [ ] (4301) review the doc\nsee also task 4302 below\n"),
        );
        let service =
            FakeService::with_active(&[(4301, "review the doc"), (4302, "book travel")]);

        let outcome = sync(&path, &service, today()).unwrap();

        // 4301 is linked; 4302 appears as a substring of an opaque line. The
        // join key is weak by design: neither task is appended again.
        assert_eq!(outcome.pulled, 0);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [ ] (4301) review the doc\nsee also task 4302 below\n")
        );
    }

    #[test]
    fn test_just_closed_tasks_are_not_pulled_back() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, &format!("{HEADER}- [x] (42) pay rent\n"));
        let service = FakeService::with_active(&[(42, "pay rent")]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.closed_remotely, 1);
        assert_eq!(outcome.pulled, 0);
    }

    #[test]
    fn test_partial_failure_leaves_other_items_reconciled() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(
            &tmp,
            &format!("{HEADER}- [x] (42) close will fail\n- [ ] create will succeed\n"),
        );
        let mut service = FakeService::with_active(&[(42, "close will fail")]);
        service.fail_close.insert(42);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.closed_remotely, 0);
        assert_eq!(outcome.pushed, 1);
        // The failed close keeps its encoding for retry; the create landed
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [x] (42) close will fail\n- [ ] (100) create will succeed\n")
        );
    }

    #[test]
    fn test_failed_create_leaves_item_for_retry() {
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, &format!("{HEADER}- [ ] flaky network\n"));
        let mut service = FakeService::with_active(&[]);
        service.fail_create = true;

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome.failures, 1);
        assert_eq!(outcome.pushed, 0);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [ ] flaky network\n")
        );
    }

    #[test]
    fn test_fetch_failure_aborts_without_touching_the_file() {
        let tmp = TempDir::new().unwrap();
        let original = format!("{HEADER}- [ ] untouched\n- [x] (42) also untouched\n");
        let path = todo_file(&tmp, &original);
        let service = FakeService {
            fail_fetch: true,
            ..FakeService::default()
        };

        assert!(matches!(
            sync(&path, &service, today()),
            Err(SyncError::Fetch(_))
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_unrecognized_lines_pass_through_sync() {
        let tmp = TempDir::new().unwrap();
        let content = format!(
            "{HEADER}random prose\n- [o] legacy marker\n- [-] (9) migrated long ago\n"
        );
        let path = todo_file(&tmp, &content);
        let service = FakeService::with_active(&[]);

        sync(&path, &service, today()).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_migrated_items_are_ignored_by_sync() {
        // A migrated line with an id in the active set must not be closed or
        // reclassified; its id still blocks re-pulling
        let tmp = TempDir::new().unwrap();
        let path = todo_file(&tmp, &format!("{HEADER}- [-] (42) carried forward\n"));
        let service = FakeService::with_active(&[(42, "carried forward")]);

        let outcome = sync(&path, &service, today()).unwrap();

        assert_eq!(outcome, SyncOutcome::default());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("{HEADER}- [-] (42) carried forward\n")
        );
    }
}
