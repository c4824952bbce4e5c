use chrono::NaiveDate;
use saadhana_core::{
    BoardError, Bucket, Category, KeyValueStore, MemoryStore, Priority, PriorityFilter, Sadhana,
    SadhanaBoard, SadhanaDraft, SadhanaValidationError, StoreError, StoreResult, ToggleOutcome,
    STORAGE_KEY,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn stored_records<S: KeyValueStore>(board: &SadhanaBoard<S>) -> Vec<Sadhana> {
    let raw = board
        .repository()
        .store()
        .read(STORAGE_KEY)
        .unwrap()
        .expect("collection should be stored");
    serde_json::from_str(&raw).unwrap()
}

/// Store whose writes always fail, to exercise the non-rollback path.
#[derive(Default)]
struct RejectingStore {
    inner: MemoryStore,
}

impl KeyValueStore for RejectingStore {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        Err(StoreError::QuotaExceeded {
            key: key.to_string(),
            required: key.len() + value.len(),
            limit: 0,
        })
    }

    fn clear(&mut self, key: &str) -> StoreResult<()> {
        self.inner.clear(key)
    }
}

#[test]
fn add_assigns_unique_increasing_ids_and_persists() {
    let mut board = SadhanaBoard::open(MemoryStore::new());

    let first = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    let second = board
        .add(SadhanaDraft::new("Asana", Category::Daily, Priority::Low))
        .unwrap();

    assert!(second > first);
    assert_eq!(board.records().len(), 2);
    assert_eq!(stored_records(&board), board.records());
}

#[test]
fn add_rejects_blank_title_and_leaves_collection_unchanged() {
    let mut board = SadhanaBoard::open(MemoryStore::new());

    let err = board
        .add(SadhanaDraft::new("", Category::Goal, Priority::Low))
        .unwrap_err();
    assert_eq!(err, SadhanaValidationError::EmptyTitle);

    let err = board
        .add(SadhanaDraft::new("   ", Category::Goal, Priority::Low))
        .unwrap_err();
    assert_eq!(err, SadhanaValidationError::EmptyTitle);

    assert!(board.records().is_empty());
    assert!(board.repository().store().is_empty());
}

#[test]
fn add_normalizes_tags() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(
            SadhanaDraft::new("Kirtan", Category::Goal, Priority::Medium)
                .tags(["Music", " music ", "Bhakti", ""]),
        )
        .unwrap();
    assert_eq!(board.get(id).unwrap().tags, vec!["bhakti", "music"]);
}

#[test]
fn update_replaces_in_place_and_rejects_blank_title() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    board
        .add(SadhanaDraft::new("Asana", Category::Daily, Priority::Low))
        .unwrap();

    let mut edited = board.get(id).unwrap().clone();
    edited.title = "Japa 108".to_string();
    edited.priority = Priority::Medium;
    assert_eq!(board.update(edited), Ok(true));
    assert_eq!(board.records()[0].title, "Japa 108");
    assert_eq!(board.records()[0].priority, Priority::Medium);

    let mut blank = board.get(id).unwrap().clone();
    blank.title = " ".to_string();
    assert_eq!(board.update(blank), Err(SadhanaValidationError::EmptyTitle));
    assert_eq!(board.get(id).unwrap().title, "Japa 108");
}

#[test]
fn update_with_unknown_id_is_silent_noop() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    let before = board.records().to_vec();

    let stranger = Sadhana::from_draft(42, SadhanaDraft::new("x", Category::Goal, Priority::Low));
    assert_eq!(board.update(stranger), Ok(false));
    assert_eq!(board.records(), before.as_slice());
}

#[test]
fn update_drops_reflection_on_incomplete_record() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();

    let mut edited = board.get(id).unwrap().clone();
    edited.reflection = Some("should not stick".to_string());
    board.update(edited).unwrap();
    assert_eq!(board.get(id).unwrap().reflection, None);
    assert!(board.get(id).unwrap().validate().is_ok());
}

#[test]
fn delete_removes_record_and_ignores_unknown_id() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();

    assert!(!board.delete(id + 1000));
    assert_eq!(board.records().len(), 1);

    assert!(board.delete(id));
    assert!(board.records().is_empty());
    assert!(stored_records(&board).is_empty());
}

#[test]
fn toggle_on_open_record_stages_without_mutating() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    let before = board.get(id).unwrap().clone();

    assert_eq!(board.toggle_completion(id), ToggleOutcome::AwaitingReflection);
    assert_eq!(board.get(id), Some(&before));
    assert_eq!(board.staged().map(|staged| staged.id), Some(id));
    assert!(!stored_records(&board)[0].completed);
}

#[test]
fn save_reflection_completes_staged_record_and_clears_staging() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();

    board.toggle_completion(id);
    assert_eq!(board.save_reflection("Mind was calm"), Ok(id));

    let record = board.get(id).unwrap();
    assert!(record.completed);
    assert_eq!(record.reflection.as_deref(), Some("Mind was calm"));
    assert!(board.staged().is_none());
    assert_eq!(stored_records(&board)[0].reflection.as_deref(), Some("Mind was calm"));
    assert_eq!(board.grouped(today()).locate(id), Some(Bucket::Completed));
}

#[test]
fn save_reflection_without_staging_fails() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    assert_eq!(board.save_reflection("anything"), Err(BoardError::NothingStaged));
}

#[test]
fn blank_reflection_completes_without_storing_text() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    board.toggle_completion(id);
    board.save_reflection("  ").unwrap();

    let record = board.get(id).unwrap();
    assert!(record.completed);
    assert_eq!(record.reflection, None);
}

#[test]
fn toggle_on_completed_record_clears_completion_and_reflection() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    board.toggle_completion(id);
    board.save_reflection("done").unwrap();

    assert_eq!(board.toggle_completion(id), ToggleOutcome::Reopened);
    let record = board.get(id).unwrap();
    assert!(!record.completed);
    assert_eq!(record.reflection, None);
    assert!(board.staged().is_none());
    assert_eq!(board.grouped(today()).locate(id), Some(Bucket::Today));
}

#[test]
fn toggle_unknown_id_reports_not_found() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    assert_eq!(board.toggle_completion(7), ToggleOutcome::NotFound);
    assert!(board.staged().is_none());
}

#[test]
fn cancel_reflection_and_delete_clear_staging() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();

    board.toggle_completion(id);
    assert_eq!(board.cancel_reflection().map(|staged| staged.id), Some(id));
    assert!(!board.get(id).unwrap().completed);

    board.toggle_completion(id);
    board.delete(id);
    assert!(board.staged().is_none());
    assert_eq!(board.save_reflection("late"), Err(BoardError::NothingStaged));
}

#[test]
fn reopen_loads_previous_session_from_store() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let id = board
        .add(
            SadhanaDraft::new("Plan pilgrimage", Category::Goal, Priority::High)
                .due_date("2024-07-01"),
        )
        .unwrap();
    let store = board.repository().store().clone();

    let mut reopened = SadhanaBoard::open(store);
    assert_eq!(reopened.records().len(), 1);
    assert_eq!(reopened.grouped(today()).locate(id), Some(Bucket::Upcoming));
}

#[test]
fn malformed_stored_json_opens_as_empty_board() {
    let mut store = MemoryStore::new();
    store.insert_raw(STORAGE_KEY, "{not json");

    let mut board = SadhanaBoard::open(store);
    assert!(board.records().is_empty());

    board
        .add(SadhanaDraft::new("Fresh start", Category::Goal, Priority::Low))
        .unwrap();
    assert_eq!(stored_records(&board).len(), 1);
}

#[test]
fn failed_writes_keep_in_memory_state() {
    let mut board = SadhanaBoard::open(RejectingStore::default());

    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    board.toggle_completion(id);
    board.save_reflection("kept in memory").unwrap();

    assert!(board.get(id).unwrap().completed);
    assert_eq!(board.repository().store().read(STORAGE_KEY).unwrap(), None);
}

#[test]
fn filter_and_search_state_drive_grouped_view() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    let japa = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    let read = board
        .add(SadhanaDraft::new("Read Text", Category::Daily, Priority::Low))
        .unwrap();

    assert_eq!(board.grouped(today()).today.len(), 2);

    board.set_filter(PriorityFilter::Only(Priority::Low));
    assert_eq!(board.filter(), PriorityFilter::Only(Priority::Low));
    assert_eq!(board.grouped(today()).locate(read), Some(Bucket::Today));
    assert_eq!(board.grouped(today()).locate(japa), None);

    board.set_filter(PriorityFilter::All);
    board.set_search_query("jap");
    assert_eq!(board.search_query(), "jap");
    let grouped = board.grouped(today());
    assert_eq!(grouped.total(), 1);
    assert_eq!(grouped.locate(japa), Some(Bucket::Today));
}

#[test]
fn grouped_view_reflects_mutations() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    assert!(board.grouped(today()).is_empty());

    let id = board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();
    assert_eq!(board.grouped(today()).locate(id), Some(Bucket::Today));

    board.delete(id);
    assert!(board.grouped(today()).is_empty());
}

#[test]
fn clear_all_empties_board_and_store() {
    let mut board = SadhanaBoard::open(MemoryStore::new());
    board
        .add(SadhanaDraft::new("Japa", Category::Daily, Priority::High))
        .unwrap();

    board.clear_all();
    assert!(board.records().is_empty());
    assert!(board.grouped(today()).is_empty());
    assert_eq!(board.repository().store().read(STORAGE_KEY).unwrap(), None);
}

#[test]
fn null_tags_record_loads_and_survives_next_write() {
    let mut store = MemoryStore::new();
    store.insert_raw(
        STORAGE_KEY,
        r#"[{"id":1,"title":"Keep me","category":"daily","priority":"high","tags":["japa"]},
            {"id":2,"title":"Untagged","category":"goal","priority":"low","tags":null}]"#,
    );

    let mut board = SadhanaBoard::open(store);
    assert_eq!(board.records().len(), 2);
    assert!(board.get(2).unwrap().tags.is_empty());

    let id = board
        .add(SadhanaDraft::new("New", Category::Goal, Priority::Medium))
        .unwrap();
    let stored: Vec<i64> = stored_records(&board).iter().map(|record| record.id).collect();
    assert_eq!(stored, vec![1, 2, id]);
}

#[test]
fn add_fails_when_ids_are_exhausted() {
    let mut store = MemoryStore::new();
    store.insert_raw(
        STORAGE_KEY,
        r#"[{"id":9223372036854775807,"title":"Last","category":"goal","priority":"low"}]"#,
    );

    let mut board = SadhanaBoard::open(store);
    let err = board
        .add(SadhanaDraft::new("Overflow", Category::Goal, Priority::Low))
        .unwrap_err();
    assert_eq!(err, SadhanaValidationError::IdSpaceExhausted(i64::MAX));
    assert_eq!(board.records().len(), 1);
}
