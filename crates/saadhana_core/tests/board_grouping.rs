use chrono::NaiveDate;
use saadhana_core::{
    group_sadhanas, Bucket, Category, GroupedSadhanas, Priority, PriorityFilter, Sadhana,
    SadhanaDraft,
};
use std::collections::HashSet;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn record(id: i64, title: &str, category: Category, priority: Priority) -> Sadhana {
    Sadhana::from_draft(id, SadhanaDraft::new(title, category, priority))
}

fn goal_due(id: i64, title: &str, priority: Priority, due: &str) -> Sadhana {
    Sadhana::from_draft(
        id,
        SadhanaDraft::new(title, Category::Goal, priority).due_date(due),
    )
}

fn ids(records: &[Sadhana]) -> Vec<i64> {
    records.iter().map(|record| record.id).collect()
}

fn mixed_fixture() -> Vec<Sadhana> {
    let mut completed_goal = goal_due(7, "Finish retreat notes", Priority::Low, "2024-06-01");
    completed_goal.completed = true;
    let mut completed_daily = record(9, "Sandhya", Category::Daily, Priority::High);
    completed_daily.completed = true;
    completed_daily.reflection = Some("steady".to_string());

    vec![
        goal_due(1, "Memorize verse", Priority::Medium, "2024-06-10"),
        record(2, "Read Text", Category::Daily, Priority::Medium),
        goal_due(3, "Plan pilgrimage", Priority::High, "2024-07-01"),
        record(4, "Meditate", Category::Daily, Priority::Medium),
        record(5, "Learn chant", Category::Goal, Priority::Low),
        goal_due(6, "Fast on ekadashi", Priority::High, "2024-06-15"),
        completed_goal,
        goal_due(8, "Bad date", Priority::High, "someday"),
        completed_daily,
    ]
}

#[test]
fn buckets_are_disjoint_and_cover_filtered_input() {
    let records = mixed_fixture();
    let grouped = group_sadhanas(&records, PriorityFilter::All, "", day(2024, 6, 15));

    let mut seen = HashSet::new();
    for bucket in Bucket::ALL {
        for record in grouped.bucket(bucket) {
            assert!(seen.insert(record.id), "id {} appears twice", record.id);
        }
    }
    let expected: HashSet<i64> = records.iter().map(|record| record.id).collect();
    assert_eq!(seen, expected);
    assert_eq!(grouped.total(), records.len());
}

#[test]
fn fixture_lands_in_expected_buckets() {
    let grouped = group_sadhanas(&mixed_fixture(), PriorityFilter::All, "", day(2024, 6, 15));

    assert_eq!(ids(&grouped.overdue), vec![1]);
    // goal due today (high) sorts before the two medium dailies
    assert_eq!(ids(&grouped.today), vec![6, 4, 2]);
    assert_eq!(ids(&grouped.upcoming), vec![3]);
    assert_eq!(ids(&grouped.no_due_date), vec![8, 5]);
    assert_eq!(ids(&grouped.completed), vec![9, 7]);
}

#[test]
fn completed_wins_over_every_other_field() {
    let mut overdue_but_done = goal_due(1, "Done", Priority::High, "2000-01-01");
    overdue_but_done.completed = true;
    let grouped = group_sadhanas(&[overdue_but_done], PriorityFilter::All, "", day(2024, 1, 1));
    assert_eq!(grouped.locate(1), Some(Bucket::Completed));
}

#[test]
fn daily_records_ignore_due_date() {
    let past = Sadhana::from_draft(
        1,
        SadhanaDraft::new("Japa", Category::Daily, Priority::Low).due_date("2001-01-01"),
    );
    let future = Sadhana::from_draft(
        2,
        SadhanaDraft::new("Asana", Category::Daily, Priority::Low).due_date("2099-01-01"),
    );
    let grouped = group_sadhanas(&[past, future], PriorityFilter::All, "", day(2024, 1, 1));
    assert_eq!(ids(&grouped.today), vec![2, 1]);
}

#[test]
fn today_orders_equal_priority_by_title() {
    let records = vec![
        record(1, "Read Text", Category::Daily, Priority::Medium),
        record(2, "Meditate", Category::Daily, Priority::Medium),
    ];
    let grouped = group_sadhanas(&records, PriorityFilter::All, "", day(2024, 1, 1));
    let titles: Vec<&str> = grouped.today.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Meditate", "Read Text"]);
}

#[test]
fn overdue_tie_on_date_is_broken_by_priority() {
    let records = vec![
        goal_due(1, "B", Priority::Low, "2020-01-01"),
        goal_due(2, "A", Priority::High, "2020-01-01"),
    ];
    let grouped = group_sadhanas(&records, PriorityFilter::All, "", day(2024, 3, 3));
    assert_eq!(ids(&grouped.overdue), vec![2, 1]);
}

#[test]
fn overdue_and_upcoming_sort_by_date_first() {
    let records = vec![
        goal_due(1, "later overdue", Priority::High, "2024-05-20"),
        goal_due(2, "oldest overdue", Priority::Low, "2024-05-01"),
        goal_due(3, "far", Priority::High, "2024-09-01"),
        goal_due(4, "near", Priority::Low, "2024-06-20"),
    ];
    let grouped = group_sadhanas(&records, PriorityFilter::All, "", day(2024, 6, 1));
    assert_eq!(ids(&grouped.overdue), vec![2, 1]);
    assert_eq!(ids(&grouped.upcoming), vec![4, 3]);
}

#[test]
fn title_compare_is_case_sensitive_and_id_breaks_full_ties() {
    let records = vec![
        record(3, "same", Category::Goal, Priority::Low),
        record(1, "same", Category::Goal, Priority::Low),
        record(2, "Same", Category::Goal, Priority::Low),
    ];
    let grouped = group_sadhanas(&records, PriorityFilter::All, "", day(2024, 1, 1));
    assert_eq!(ids(&grouped.no_due_date), vec![2, 1, 3]);
}

#[test]
fn due_date_boundaries_follow_calendar_day() {
    let today = day(2024, 2, 29);
    let records = vec![
        goal_due(1, "yesterday", Priority::Low, "2024-02-28"),
        goal_due(2, "today as datetime", Priority::Low, "2024-02-29T23:59:59.000Z"),
        goal_due(3, "tomorrow", Priority::Low, "2024-03-01"),
    ];
    let grouped = group_sadhanas(&records, PriorityFilter::All, "", today);
    assert_eq!(grouped.locate(1), Some(Bucket::Overdue));
    assert_eq!(grouped.locate(2), Some(Bucket::Today));
    assert_eq!(grouped.locate(3), Some(Bucket::Upcoming));
}

#[test]
fn priority_filter_and_search_are_combined() {
    let records = mixed_fixture();

    let high_only = group_sadhanas(
        &records,
        PriorityFilter::Only(Priority::High),
        "",
        day(2024, 6, 15),
    );
    assert!(high_only
        .today
        .iter()
        .chain(&high_only.upcoming)
        .chain(&high_only.completed)
        .all(|record| record.priority == Priority::High));
    assert_eq!(high_only.total(), 4);

    let searched = group_sadhanas(&records, PriorityFilter::All, "READ", day(2024, 6, 15));
    assert_eq!(ids(&searched.today), vec![2]);
    assert_eq!(searched.total(), 1);

    let none = group_sadhanas(
        &records,
        PriorityFilter::Only(Priority::Low),
        "read",
        day(2024, 6, 15),
    );
    assert!(none.is_empty());
}

#[test]
fn grouping_is_idempotent() {
    let records = mixed_fixture();
    let first = group_sadhanas(&records, PriorityFilter::All, "e", day(2024, 6, 15));
    let second = group_sadhanas(&records, PriorityFilter::All, "e", day(2024, 6, 15));
    assert_eq!(first, second);
}

#[test]
fn empty_input_yields_empty_buckets() {
    let grouped = group_sadhanas(&[], PriorityFilter::All, "", day(2024, 6, 15));
    assert_eq!(grouped, GroupedSadhanas::default());
    assert_eq!(grouped.counts().total(), 0);
}

#[test]
fn counts_report_open_and_completed() {
    let grouped = group_sadhanas(&mixed_fixture(), PriorityFilter::All, "", day(2024, 6, 15));
    let counts = grouped.counts();
    assert_eq!(counts.completed, 2);
    assert_eq!(counts.open(), 7);
}
