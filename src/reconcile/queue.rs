//! Explicitly fed scheduler.

use std::cell::RefCell;
use std::rc::Rc;

use super::{Reconciler, Scheduler};
use crate::error::Result;
use crate::host::InstanceHost;
use crate::primitives::Element;

/// Commits whatever description was last submitted through its handle.
///
/// Useful when the application owns its state outside of signals, or for
/// driving the loop from tests: callbacks submit the next description and
/// it is committed at the following yield point. Submitting twice before a
/// flush keeps only the latest description.
#[derive(Debug, Default)]
pub struct QueueScheduler {
    reconciler: Reconciler,
    pending: Rc<RefCell<Option<Element>>>,
}

/// Cloneable sender half of a [`QueueScheduler`].
#[derive(Debug, Clone)]
pub struct QueueHandle {
    pending: Rc<RefCell<Option<Element>>>,
}

impl QueueHandle {
    pub fn submit(&self, element: Element) {
        *self.pending.borrow_mut() = Some(element);
    }

    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }
}

impl QueueScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler with `element` already queued for the first commit.
    pub fn with_initial(element: Element) -> Self {
        let scheduler = Self::new();
        scheduler.handle().submit(element);
        scheduler
    }

    pub fn handle(&self) -> QueueHandle {
        QueueHandle {
            pending: self.pending.clone(),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }
}

impl Scheduler for QueueScheduler {
    fn flush(&mut self, host: &mut InstanceHost) -> Result<bool> {
        let Some(element) = self.pending.borrow_mut().take() else {
            return Ok(false);
        };
        self.reconciler.commit(host, element)?;
        Ok(true)
    }
}
