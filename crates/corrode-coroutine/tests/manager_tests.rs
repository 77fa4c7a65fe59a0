use super::*;

#[test]
fn test_not_manager_thread_by_default() {
    assert!(!ManagerThread::is_manager_thread());
}

#[test]
fn test_invoke_marks_manager_thread() {
    let inside = ManagerThread::invoke(ManagerThread::is_manager_thread);
    assert!(inside);
    assert!(!ManagerThread::is_manager_thread());
}

#[test]
fn test_invoke_is_reentrant() {
    ManagerThread::invoke(|| {
        ManagerThread::invoke(ManagerThread::assert_is_manager_thread);
        assert!(ManagerThread::is_manager_thread());
    });
    assert!(!ManagerThread::is_manager_thread());
}

#[test]
fn test_invoke_returns_value() {
    assert_eq!(ManagerThread::invoke(|| 42), 42);
}

#[test]
fn test_manager_state_restored_after_panic() {
    let result = std::panic::catch_unwind(|| {
        ManagerThread::invoke(|| panic!("boom"));
    });
    assert!(result.is_err());
    assert!(!ManagerThread::is_manager_thread());
}

#[test]
fn test_manager_state_is_per_thread() {
    ManagerThread::invoke(|| {
        let other = std::thread::spawn(ManagerThread::is_manager_thread)
            .join()
            .unwrap();
        assert!(!other);
    });
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "manager thread")]
fn test_assert_off_manager_thread_panics() {
    ManagerThread::assert_is_manager_thread();
}
