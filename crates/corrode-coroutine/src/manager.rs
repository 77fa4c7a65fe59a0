//! The debugger manager thread.
//!
//! Introspection calls are only valid while the debuggee is suspended, and
//! the debugger serializes them on one thread. Code that reads the
//! debuggee runs inside [`ManagerThread::invoke`]; accessors check it with
//! [`ManagerThread::assert_is_manager_thread`].

use std::cell::Cell;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

pub struct ManagerThread;

impl ManagerThread {
    pub fn is_manager_thread() -> bool {
        DEPTH.with(|depth| depth.get() > 0)
    }

    /// Panics in debug builds when called off the manager thread.
    #[track_caller]
    pub fn assert_is_manager_thread() {
        debug_assert!(
            Self::is_manager_thread(),
            "debuggee introspection must run on the manager thread"
        );
    }

    /// Run `f` as the manager thread. Re-entrant.
    pub fn invoke<R>(f: impl FnOnce() -> R) -> R {
        let _guard = ManagerGuard::enter();
        f()
    }
}

struct ManagerGuard;

impl ManagerGuard {
    fn enter() -> Self {
        DEPTH.with(|depth| depth.set(depth.get() + 1));
        ManagerGuard
    }
}

impl Drop for ManagerGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

#[cfg(test)]
#[path = "../tests/manager_tests.rs"]
mod tests;
