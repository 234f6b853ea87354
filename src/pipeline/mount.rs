//! Mount API - Render loop lifecycle.
//!
//! A [`Runtime`] owns the engine, the retained tree and the scheduler that
//! feeds it, and drives them through one state machine:
//!
//! ```text
//! Uninitialized --start--> Running --stop--> Stopped
//! ```
//!
//! Each iteration of the running loop:
//!
//! 1. poll input; a stop request ends the loop before anything is drawn
//! 2. begin frame
//! 3. project the tree
//! 4. end frame
//! 5. yield to the scheduler, which commits what the frame's callbacks queued
//!
//! # Example
//!
//! ```ignore
//! use spark_mu::pipeline::{render, Runtime};
//!
//! // Option 1: block until the user quits
//! render(TerminalEngine::new(&config), move || app(&state))?;
//!
//! // Option 2: tick manually
//! let mut runtime = Runtime::new(engine, scheduler);
//! runtime.start()?;
//! while runtime.tick()? {
//!     // Your logic here
//! }
//! runtime.stop()?;
//! ```

use std::fmt;

use tracing::{debug, warn};

use super::project::project;
use crate::backend::Engine;
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::host::InstanceHost;
use crate::primitives::Element;
use crate::reconcile::{ComponentScheduler, Scheduler};

// =============================================================================
// Loop State
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Stopped,
}

impl LoopState {
    pub fn name(self) -> &'static str {
        match self {
            LoopState::Uninitialized => "uninitialized",
            LoopState::Running => "running",
            LoopState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// The render loop.
///
/// The engine is acquired by [`start`](Runtime::start) and released by
/// [`stop`](Runtime::stop), exactly once each.
pub struct Runtime<E: Engine, S: Scheduler> {
    engine: E,
    scheduler: S,
    host: InstanceHost,
    config: RenderConfig,
    state: LoopState,
    frames: u64,
}

impl<E: Engine, S: Scheduler> Runtime<E, S> {
    pub fn new(engine: E, scheduler: S) -> Self {
        Self::with_config(engine, scheduler, RenderConfig::default())
    }

    pub fn with_config(engine: E, scheduler: S, config: RenderConfig) -> Self {
        Self {
            engine,
            scheduler,
            host: InstanceHost::new(),
            config,
            state: LoopState::Uninitialized,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Frames projected so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn host(&self) -> &InstanceHost {
        &self.host
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Release the engine and scheduler.
    pub fn into_parts(self) -> (E, S) {
        (self.engine, self.scheduler)
    }

    /// Initialize the engine and commit the initial tree.
    pub fn start(&mut self) -> Result<()> {
        if self.state != LoopState::Uninitialized {
            return Err(Error::InvalidState {
                expected: LoopState::Uninitialized.name(),
                actual: self.state.name(),
            });
        }

        self.engine.init()?;
        self.state = LoopState::Running;
        debug!(state = %self.state, "render loop started");

        if let Err(err) = self.scheduler.flush(&mut self.host) {
            self.abort();
            return Err(err);
        }
        Ok(())
    }

    /// Run one iteration.
    ///
    /// Returns `Ok(false)` once the loop has stopped, either because input
    /// requested it or because `max_frames` was reached.
    pub fn tick(&mut self) -> Result<bool> {
        match self.state {
            LoopState::Running => {}
            LoopState::Stopped => return Ok(false),
            LoopState::Uninitialized => {
                return Err(Error::InvalidState {
                    expected: LoopState::Running.name(),
                    actual: self.state.name(),
                });
            }
        }

        if self.engine.poll_input()? {
            debug!(frames = self.frames, "stop requested");
            self.stop()?;
            return Ok(false);
        }

        self.engine.begin_frame()?;
        project(&self.host, &mut self.engine, &self.config.window_title)?;
        self.engine.end_frame()?;
        self.frames += 1;

        // Yield point: commits queued by this frame's callbacks land here.
        self.scheduler.flush(&mut self.host)?;

        if self.config.max_frames.is_some_and(|max| self.frames >= max) {
            debug!(frames = self.frames, "frame limit reached");
            self.stop()?;
            return Ok(false);
        }
        Ok(true)
    }

    /// Shut the engine down. Idempotent.
    pub fn stop(&mut self) -> Result<()> {
        let previous = std::mem::replace(&mut self.state, LoopState::Stopped);
        if previous == LoopState::Running {
            self.engine.shutdown()?;
            debug!(frames = self.frames, "render loop stopped");
        }
        Ok(())
    }

    /// Start if needed, then tick until stopped.
    ///
    /// On error the engine is shut down before the error is returned.
    pub fn run(&mut self) -> Result<()> {
        if self.state == LoopState::Uninitialized {
            self.start()?;
        }
        loop {
            match self.tick() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(err) => {
                    self.abort();
                    return Err(err);
                }
            }
        }
    }

    /// Stop while unwinding from another error.
    fn abort(&mut self) {
        if let Err(err) = self.stop() {
            warn!(%err, "engine shutdown failed");
        }
    }
}

impl<E: Engine, S: Scheduler> fmt::Debug for Runtime<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("state", &self.state)
            .field("frames", &self.frames)
            .field("nodes", &self.host.node_count())
            .finish()
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Render `component` on `engine` until stopped, configured from the environment.
///
/// Returns the engine once the loop has shut it down.
pub fn render<E, F>(engine: E, component: F) -> Result<E>
where
    E: Engine,
    F: Fn() -> Element + 'static,
{
    render_with_config(engine, component, RenderConfig::from_env())
}

/// [`render`] with an explicit configuration.
pub fn render_with_config<E, F>(engine: E, component: F, config: RenderConfig) -> Result<E>
where
    E: Engine,
    F: Fn() -> Element + 'static,
{
    let scheduler = ComponentScheduler::new(component);
    let mut runtime = Runtime::with_config(engine, scheduler, config);
    runtime.run()?;
    let (engine, _) = runtime.into_parts();
    Ok(engine)
}

// =============================================================================
// Tests
// =============================================================================
