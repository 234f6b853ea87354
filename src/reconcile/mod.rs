//! Reconcile - turning element descriptions into host lifecycle calls.
//!
//! The render loop does not know how descriptions are produced or diffed.
//! It only calls [`Scheduler::flush`] once per iteration, after the frame
//! has been presented. That call is the single point where the retained
//! tree changes while the loop is running.
//!
//! - [`Reconciler`] - positional diff of successive descriptions
//! - [`ComponentScheduler`] - re-renders a component function when the
//!   signals it reads change
//! - [`QueueScheduler`] - commits descriptions pushed through a [`QueueHandle`]

mod component;
mod diff;
mod queue;

pub use component::ComponentScheduler;
pub use diff::Reconciler;
pub use queue::{QueueHandle, QueueScheduler};

use crate::error::Result;
use crate::host::InstanceHost;

/// The render loop's yield point.
pub trait Scheduler {
    /// Apply pending reconciliation work to `host`.
    ///
    /// Returns whether a commit happened.
    fn flush(&mut self, host: &mut InstanceHost) -> Result<bool>;
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn flush(&mut self, host: &mut InstanceHost) -> Result<bool> {
        (**self).flush(host)
    }
}
