use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_rows_per_chunk_minimum_one() {
    assert_eq!(rows_per_chunk(0, 4), 1);
    assert_eq!(rows_per_chunk(5, 4), 1);
    assert_eq!(rows_per_chunk(120, 4), 10);
}

#[test]
fn test_rows_per_chunk_zero_threads_treated_as_one() {
    assert_eq!(rows_per_chunk(30, 0), 10);
}

#[test]
fn test_default_parallelism_positive() {
    assert!(default_parallelism() >= 1);
}

#[test]
fn test_map_preserves_order() {
    let pool = WorkerPool::new(4).unwrap();
    let items: Vec<i32> = (0..100).collect();
    let result = pool.map(&items, |&x| x * 2);
    let expected: Vec<i32> = (0..100).map(|x| x * 2).collect();
    assert_eq!(result, expected);
}

#[test]
fn test_map_empty() {
    let pool = WorkerPool::new(2).unwrap();
    let items: Vec<i32> = vec![];
    let result = pool.map(&items, |&x| x);
    assert!(result.is_empty());
}

#[test]
#[should_panic(expected = "threads must be > 0")]
fn test_zero_threads_panics() {
    let _ = WorkerPool::new(0);
}

#[test]
fn test_map_concurrency_cap() {
    let pool = WorkerPool::new(3).unwrap();
    let items: Vec<i32> = (0..20).collect();
    let in_flight = AtomicUsize::new(0);
    let max_observed = AtomicUsize::new(0);

    pool.map(&items, |&x| {
        let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_observed.fetch_max(current, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(5));
        in_flight.fetch_sub(1, Ordering::SeqCst);
        x
    });

    let max = max_observed.load(Ordering::SeqCst);
    assert!(max <= 3, "max in-flight was {max}, expected <= 3");
}

#[test]
fn test_try_map_ok() {
    let pool = WorkerPool::new(2).unwrap();
    let items: Vec<i32> = (0..10).collect();
    let result: Result<Vec<i32>, String> = pool.try_map(&items, |&x| Ok(x + 1));
    assert_eq!(result.unwrap(), (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_try_map_returns_first_error() {
    let pool = WorkerPool::new(2).unwrap();
    let items: Vec<i32> = (0..10).collect();
    let result: Result<Vec<i32>, String> = pool.try_map(&items, |&x| {
        if x >= 5 {
            Err(format!("bad {x}"))
        } else {
            Ok(x)
        }
    });
    assert_eq!(result.unwrap_err(), "bad 5");
}

#[test]
fn test_for_each_row_chunk_offsets() {
    let pool = WorkerPool::new(4).unwrap();
    let width = 7;
    let height = 13;
    let mut data: Vec<usize> = vec![0; width * height];

    pool.for_each_row_chunk(&mut data, width, |first_row, chunk| {
        assert_eq!(chunk.len() % width, 0, "Chunk not row-aligned");
        for (local_y, row) in chunk.chunks_mut(width).enumerate() {
            for (x, val) in row.iter_mut().enumerate() {
                *val = (first_row + local_y) * width + x;
            }
        }
    });

    for (i, &v) in data.iter().enumerate() {
        assert_eq!(v, i);
    }
}

#[test]
fn test_for_each_row_chunk_empty() {
    let pool = WorkerPool::new(2).unwrap();
    let mut data: Vec<u8> = vec![];
    pool.for_each_row_chunk(&mut data, 4, |_, _| panic!("must not be called"));
}
