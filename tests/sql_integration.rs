//! End-to-end SQL tests against on-disk storage

use featherdb::sql::{Mutation, QueryResult};
use featherdb::{execute_sql, DbConfig, FeatherError, FileStorage, Storage};
use std::sync::Arc;
use tempfile::TempDir;

fn setup() -> (TempDir, Arc<dyn Storage>) {
    let dir = TempDir::new().unwrap();
    let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&DbConfig::for_testing(dir.path())));
    (dir, storage)
}

fn run(storage: &Arc<dyn Storage>, sql: &str) -> QueryResult {
    execute_sql(storage.clone(), sql).unwrap()
}

fn rows(storage: &Arc<dyn Storage>, sql: &str) -> Vec<Vec<String>> {
    match run(storage, sql) {
        QueryResult::Select(table) => table.rows.into_iter().map(|r| r.values).collect(),
        other => panic!("expected a SELECT result, got {:?}", other),
    }
}

fn ids(storage: &Arc<dyn Storage>, sql: &str) -> Vec<String> {
    rows(storage, sql).into_iter().map(|mut r| r.remove(0)).collect()
}

fn seed_people(storage: &Arc<dyn Storage>) {
    run(storage, "CREATE TABLE t (id INT, name STRING)");
    for (id, name) in [(7, "gina"), (1, "alice"), (12, "carl"), (6, "bob"), (30, "dora")] {
        run(storage, &format!("INSERT INTO t (id, name) VALUES ({}, '{}')", id, name));
    }
}

#[test]
fn test_create_insert_select_round_trip() {
    let (_dir, storage) = setup();
    run(&storage, "CREATE TABLE t (id INT, name STRING)");
    let inserted = run(&storage, "INSERT INTO t (id, name) VALUES (1, 'x')");
    assert_eq!(
        inserted,
        QueryResult::Modification {
            kind: Mutation::Insert,
            affected_rows: 1
        }
    );

    assert_eq!(rows(&storage, "SELECT * FROM t"), vec![vec!["1", "x"]]);
}

#[test]
fn test_files_survive_a_new_storage_handle() {
    let (dir, storage) = setup();
    seed_people(&storage);
    drop(storage);

    let reopened: Arc<dyn Storage> = Arc::new(FileStorage::open(dir.path()));
    assert_eq!(reopened.list_tables().unwrap(), vec!["t"]);
    assert_eq!(ids(&reopened, "SELECT id FROM t").len(), 5);
    assert!(dir.path().join("t.schema").exists());
    assert!(dir.path().join("t.csv").exists());
}

#[test]
fn test_invalid_int_writes_nothing() {
    let (_dir, storage) = setup();
    run(&storage, "CREATE TABLE t (id INT, name STRING)");

    let err = execute_sql(storage.clone(), "INSERT INTO t (id, name) VALUES (abc, 'x')")
        .unwrap_err();
    assert!(matches!(err, FeatherError::InvalidInteger { .. }));
    assert!(rows(&storage, "SELECT * FROM t").is_empty());
}

#[test]
fn test_where_and_order_by_int() {
    let (_dir, storage) = setup();
    seed_people(&storage);

    assert_eq!(
        ids(&storage, "SELECT * FROM t WHERE id > 5 ORDER BY id"),
        vec!["6", "7", "12", "30"]
    );
}

#[test]
fn test_order_by_string_is_lexical() {
    let (_dir, storage) = setup();
    seed_people(&storage);

    let names: Vec<String> = rows(&storage, "SELECT name FROM t ORDER BY name")
        .into_iter()
        .map(|mut r| r.remove(0))
        .collect();
    assert_eq!(names, vec!["alice", "bob", "carl", "dora", "gina"]);
}

#[test]
fn test_delete_removes_only_matches() {
    let (_dir, storage) = setup();
    seed_people(&storage);
    run(&storage, "INSERT INTO t (id, name) VALUES (1, 'again')");

    let deleted = run(&storage, "DELETE FROM t WHERE id = 1");
    assert_eq!(deleted.affected_rows(), 2);

    let mut left = ids(&storage, "SELECT id FROM t");
    left.sort();
    assert_eq!(left, vec!["12", "30", "6", "7"]);
}

#[test]
fn test_update_persists() {
    let (_dir, storage) = setup();
    seed_people(&storage);

    let updated = run(&storage, "UPDATE t SET name = 'zed' WHERE id >= 12");
    assert_eq!(updated.affected_rows(), 2);
    assert_eq!(
        rows(&storage, "SELECT id, name FROM t WHERE name = 'zed' ORDER BY id"),
        vec![vec!["12", "zed"], vec!["30", "zed"]]
    );
}

#[test]
fn test_in_subquery_restricts_rows() {
    let (_dir, storage) = setup();
    seed_people(&storage);
    run(&storage, "CREATE TABLE t2 (id INT, tag STRING)");
    run(&storage, "INSERT INTO t2 (id, tag) VALUES (12, 'a')");
    run(&storage, "INSERT INTO t2 (id, tag) VALUES (1, 'b')");
    run(&storage, "INSERT INTO t2 (id, tag) VALUES (99, 'a')");

    assert_eq!(
        ids(&storage, "SELECT * FROM t WHERE id IN (SELECT id FROM t2) ORDER BY id"),
        vec!["1", "12"]
    );
    assert_eq!(
        ids(&storage, "SELECT * FROM t WHERE id IN (SELECT id FROM t2 WHERE tag = 'a')"),
        vec!["12"]
    );
}

#[test]
fn test_nested_from() {
    let (_dir, storage) = setup();
    seed_people(&storage);

    let result = run(&storage, "SELECT name FROM (SELECT * FROM t WHERE id < 10) ORDER BY name");
    let table = result.table().unwrap();
    assert_eq!(table.column_names(), vec!["name"]);
    let names: Vec<&str> = table.rows.iter().map(|r| r.values[0].as_str()).collect();
    assert_eq!(names, vec!["alice", "bob", "gina"]);
}

#[test]
fn test_select_is_repeatable() {
    let (_dir, storage) = setup();
    seed_people(&storage);

    let first = run(&storage, "SELECT * FROM t WHERE id != 6");
    let second = run(&storage, "SELECT * FROM t WHERE id != 6");
    assert_eq!(first, second);
}

#[test]
fn test_errors_leave_data_untouched() {
    let (_dir, storage) = setup();
    seed_people(&storage);

    assert!(matches!(
        execute_sql(storage.clone(), "SELECT * FROM nope").unwrap_err(),
        FeatherError::TableNotFound(_)
    ));
    assert!(matches!(
        execute_sql(storage.clone(), "UPDATE t SET age = 3").unwrap_err(),
        FeatherError::ColumnNotFound(_)
    ));
    assert!(matches!(
        execute_sql(storage.clone(), "CREATE TABLE t (x INT)").unwrap_err(),
        FeatherError::TableExists(_)
    ));
    assert!(execute_sql(storage.clone(), "SELECT FROM t").unwrap_err().is_syntax());

    assert_eq!(ids(&storage, "SELECT id FROM t").len(), 5);
}

#[test]
fn test_delete_in_subquery_keeps_other_rows() {
    let (_dir, storage) = setup();
    seed_people(&storage);
    run(&storage, "CREATE TABLE gone (id INT)");
    run(&storage, "INSERT INTO gone (id) VALUES (7)");
    run(&storage, "INSERT INTO gone (id) VALUES (30)");

    let deleted = run(&storage, "DELETE FROM t WHERE id IN (SELECT id FROM gone)");
    assert_eq!(deleted.affected_rows(), 2);
    assert_eq!(ids(&storage, "SELECT id FROM t ORDER BY id"), vec!["1", "6", "12"]);
}
