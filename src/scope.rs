//! Task ownership for a mounted view.
//!
//! A view spawns its requests through a [`ViewScope`]. Tearing the view down
//! drops the scope, which aborts whatever is still in flight, so a late
//! response can never update state for a view that is gone.

#[cfg(test)]
#[path = "scope_test.rs"]
mod scope_test;

use std::future::Future;

use tokio::task::{AbortHandle, JoinHandle};

use crate::routes::Route;

#[derive(Debug)]
pub struct ViewScope {
    view: Route,
    tasks: Vec<AbortHandle>,
}

impl ViewScope {
    #[must_use]
    pub fn new(view: Route) -> Self {
        Self { view, tasks: Vec::new() }
    }

    #[must_use]
    pub fn view(&self) -> Route {
        self.view
    }

    /// Spawn `future` on the tokio runtime, owned by this scope.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&mut self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.tasks.retain(|task| !task.is_finished());
        let handle = tokio::spawn(future);
        self.tasks.push(handle.abort_handle());
        handle
    }

    /// Number of owned tasks that have not finished yet.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Tear the view down now. Equivalent to dropping the scope.
    pub fn teardown(self) {}
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        let mut aborted = 0_usize;
        for task in self.tasks.drain(..) {
            if !task.is_finished() {
                task.abort();
                aborted += 1;
            }
        }
        if aborted > 0 {
            tracing::debug!(view = %self.view, aborted, "view torn down; in-flight tasks aborted");
        }
    }
}
