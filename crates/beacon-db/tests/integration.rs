use beacon_db::{create_pool, run_migrations, DbRuntimeSettings};

#[test]
fn db_initialization_works() {
    let pool = create_pool(":memory:", DbRuntimeSettings::default()).expect("failed to create pool");
    let conn = pool.get().expect("failed to get connection");
    let applied = run_migrations(&conn).expect("failed to run migrations");
    assert_eq!(applied, 2);

    // Verify table set (excluding sqlite internals)
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("failed to prepare table listing query");
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .expect("failed to execute table listing query")
        .map(|r| r.expect("failed to read table name"))
        .collect();

    assert_eq!(
        tables,
        vec![
            "_beacon_migrations".to_string(),
            "events".to_string(),
            "sequence_counters".to_string(),
        ]
    );
}

#[test]
fn counters_survive_pool_reopen() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join("beacon.db");
    let path = path.to_str().unwrap();

    {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("first pool");
        let conn = pool.get().expect("connection");
        run_migrations(&conn).expect("migrations");
        conn.execute(
            "INSERT INTO sequence_counters (name, current) VALUES ('event', 41)",
            [],
        )
        .expect("seed counter");
    }

    let pool = create_pool(path, DbRuntimeSettings::default()).expect("second pool");
    let conn = pool.get().expect("connection");
    let current: i64 = conn
        .query_row(
            "SELECT current FROM sequence_counters WHERE name = 'event'",
            [],
            |row| row.get(0),
        )
        .expect("counter should still exist");
    assert_eq!(current, 41, "counter state must survive a restart");
}
