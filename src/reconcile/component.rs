//! Signal-driven component scheduler.
//!
//! A component is a plain function returning an [`Element`]. It runs inside
//! a `spark_signals` effect, so every signal it reads becomes a dependency:
//! when a callback sets one of them during a frame, the effect re-runs the
//! component right away, but the resulting description only waits in a
//! slot. The render loop commits it at the next yield point, after the
//! frame that triggered it has been presented.
//!
//! ```ignore
//! let count = signal(0);
//! let c = count.clone();
//! let scheduler = ComponentScheduler::new(move || {
//!     let c2 = c.clone();
//!     button(format!("Clicked {}", c.get())).on_click(move || c2.set(c2.get() + 1))
//! });
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use spark_signals::effect;
use tracing::trace;

use super::{Reconciler, Scheduler};
use crate::error::Result;
use crate::host::InstanceHost;
use crate::primitives::Element;

/// Re-renders a component whenever the signals it reads change.
pub struct ComponentScheduler {
    reconciler: Reconciler,
    pending: Rc<RefCell<Option<Element>>>,
    renders: Rc<Cell<u64>>,
    stop_effect: Option<Box<dyn FnOnce()>>,
}

impl ComponentScheduler {
    /// Run `component` once now and again after every change to a signal it reads.
    pub fn new<F>(component: F) -> Self
    where
        F: Fn() -> Element + 'static,
    {
        let pending = Rc::new(RefCell::new(None));
        let renders = Rc::new(Cell::new(0));

        let slot = pending.clone();
        let count = renders.clone();
        let stop = effect(move || {
            let element = component();
            count.set(count.get() + 1);
            trace!(render = count.get(), "component rendered");
            *slot.borrow_mut() = Some(element);
        });

        Self {
            reconciler: Reconciler::new(),
            pending,
            renders,
            stop_effect: Some(Box::new(stop)),
        }
    }

    /// A re-render is waiting for the next flush.
    pub fn is_dirty(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Times the component function has run.
    pub fn renders(&self) -> u64 {
        self.renders.get()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Stop tracking signals. Descriptions already pending still commit.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
    }
}

impl Scheduler for ComponentScheduler {
    fn flush(&mut self, host: &mut InstanceHost) -> Result<bool> {
        let Some(element) = self.pending.borrow_mut().take() else {
            return Ok(false);
        };
        self.reconciler.commit(host, element)?;
        Ok(true)
    }
}

impl fmt::Debug for ComponentScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentScheduler")
            .field("renders", &self.renders.get())
            .field("dirty", &self.is_dirty())
            .field("tracking", &self.stop_effect.is_some())
            .finish()
    }
}

impl Drop for ComponentScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::label;
    use spark_signals::signal;

    #[test]
    fn test_initial_render_is_pending() {
        let mut host = InstanceHost::new();
        let mut scheduler = ComponentScheduler::new(|| label("hello"));
        assert_eq!(scheduler.renders(), 1);
        assert!(scheduler.is_dirty());

        assert!(scheduler.flush(&mut host).unwrap());
        assert!(!scheduler.is_dirty());
        assert!(!scheduler.flush(&mut host).unwrap());
    }

    #[test]
    fn test_signal_change_rerenders_but_waits_for_flush() {
        let mut host = InstanceHost::new();
        let count = signal(0);
        let c = count.clone();
        let mut scheduler = ComponentScheduler::new(move || label(format!("Clicked ({})", c.get())));
        scheduler.flush(&mut host).unwrap();
        let id = scheduler.reconciler().root_nodes()[0];

        count.set(1);
        assert!(scheduler.is_dirty());
        assert_eq!(host.text_content(id).unwrap(), "Clicked (0)");

        scheduler.flush(&mut host).unwrap();
        assert_eq!(host.text_content(id).unwrap(), "Clicked (1)");
        assert_eq!(scheduler.renders(), 2);
    }

    #[test]
    fn test_stop_ends_tracking() {
        let count = signal(0);
        let c = count.clone();
        let mut scheduler = ComponentScheduler::new(move || label(format!("{}", c.get())));
        scheduler.stop();
        count.set(5);
        assert_eq!(scheduler.renders(), 1);
    }
}
