//! Concurrency and durability properties of the sequence allocator.

use std::collections::HashSet;
use std::thread;

use beacon_db::{create_pool, run_migrations, DbRuntimeSettings};
use beacon_events::{next_index, EVENT_SEQUENCE};

#[test]
fn concurrent_allocations_are_pairwise_distinct() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("seq.db");
    let pool = create_pool(path.to_str().unwrap(), DbRuntimeSettings::default())
        .expect("pool creation should succeed");
    {
        let conn = pool.get().expect("connection");
        run_migrations(&conn).expect("migrations");
    }

    const WRITERS: usize = 8;
    const PER_WRITER: usize = 25;

    let handles: Vec<_> = (0..WRITERS)
        .map(|_| {
            let pool = pool.clone();
            thread::spawn(move || {
                let mut values = Vec::with_capacity(PER_WRITER);
                for _ in 0..PER_WRITER {
                    let conn = pool.get().expect("pooled connection");
                    values.push(next_index(&conn, EVENT_SEQUENCE).expect("allocation"));
                }
                values
            })
        })
        .collect();

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.join().expect("writer thread should not panic"));
    }

    let distinct: HashSet<i64> = all.iter().copied().collect();
    assert_eq!(
        distinct.len(),
        WRITERS * PER_WRITER,
        "no two concurrent callers may observe the same value"
    );
    assert_eq!(*all.iter().max().unwrap(), (WRITERS * PER_WRITER) as i64);
}

#[test]
fn allocator_never_reuses_values_after_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("seq.db");
    let path = path.to_str().unwrap();

    let before = {
        let pool = create_pool(path, DbRuntimeSettings::default()).expect("first pool");
        let conn = pool.get().expect("connection");
        run_migrations(&conn).expect("migrations");
        let mut last = 0;
        for _ in 0..5 {
            last = next_index(&conn, EVENT_SEQUENCE).expect("allocation");
        }
        last
    };

    // Reopen as a fresh process would.
    let pool = create_pool(path, DbRuntimeSettings::default()).expect("second pool");
    let conn = pool.get().expect("connection");
    let after = next_index(&conn, EVENT_SEQUENCE).expect("allocation after reopen");

    assert!(
        after > before,
        "restart must not reuse values: {after} vs {before}"
    );
}
