//! Pipeline - from retained tree to presented frames.
//!
//! ```text
//! Scheduler::flush → InstanceHost tree → project → Engine calls → callbacks
//!        ^                                                          |
//!        +----------------------- next iteration -------------------+
//! ```
//!
//! - [`project`] - one depth-first pass translating nodes into engine calls
//! - [`mount`] - the [`Runtime`] loop and the [`render`] entry points

pub mod mount;
pub mod project;

pub use mount::{render, render_with_config, LoopState, Runtime};
pub use project::project;
