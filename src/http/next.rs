use crate::error::BoxError;
use std::sync::{Arc, Mutex, PoisonError};

/// Lets a handler give up on a request.
///
/// `call` passes the request on (there is nothing after a route, so the
/// client gets 404); `fail` routes an error to the exception filter.
#[derive(Debug, Clone, Default)]
pub struct Next {
    state: Arc<Mutex<Option<NextOutcome>>>,
}

#[derive(Debug)]
pub enum NextOutcome {
    Passed,
    Failed(BoxError),
}

impl Next {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call(&self) {
        self.set(NextOutcome::Passed);
    }

    pub fn fail(&self, error: impl Into<BoxError>) {
        self.set(NextOutcome::Failed(error.into()));
    }

    pub fn is_called(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn take(&self) -> Option<NextOutcome> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn set(&self, outcome: NextOutcome) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
    }
}
