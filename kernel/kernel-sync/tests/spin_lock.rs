use kernel_sync::SpinLock;
use std::sync::Arc;
use std::thread;

#[test]
fn guard_mutates_and_unlocks_on_drop() {
    let lock = SpinLock::new(10_u32);

    {
        let mut guard = lock.lock();
        *guard += 5;
    }

    // the previous guard must have released the lock
    assert_eq!(*lock.lock(), 15);
}

#[test]
fn try_lock_fails_while_held() {
    let lock = SpinLock::new('x');

    let held = lock.try_lock().expect("uncontended try_lock must succeed");
    assert!(lock.try_lock().is_none());

    drop(held);
    assert!(lock.try_lock().is_some());
}

#[test]
fn with_lock_returns_closure_result() {
    let lock = SpinLock::new(vec![1, 2]);
    let len = lock.with_lock(|v| {
        v.push(3);
        v.len()
    });
    assert_eq!(len, 3);
    assert_eq!(lock.with_lock(|v| v.clone()), vec![1, 2, 3]);
}

#[test]
fn get_mut_bypasses_the_atomic() {
    let mut lock = SpinLock::new(0_u8);
    *lock.get_mut() = 7;
    assert_eq!(*lock.lock(), 7);
}

#[test]
fn counter_is_consistent_under_contention() {
    const THREADS: usize = 4;
    const INCREMENTS: usize = 10_000;

    let counter = Arc::new(SpinLock::new(0_usize));
    let mut handles = Vec::new();
    for _ in 0..THREADS {
        let counter = Arc::clone(&counter);
        handles.push(thread::spawn(move || {
            for _ in 0..INCREMENTS {
                *counter.lock() += 1;
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*counter.lock(), THREADS * INCREMENTS);
}
