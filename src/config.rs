//! Runtime configuration.
//!
//! `RenderConfig` is passed to [`crate::pipeline::render_with_config`] and to
//! the terminal engine. Defaults mirror a 60 fps interactive session with an
//! unbounded loop.

use std::env;
use std::time::Duration;

/// Environment variable overriding [`RenderConfig::target_fps`].
pub const ENV_FPS: &str = "SPARK_MU_FPS";
/// Environment variable overriding [`RenderConfig::max_frames`].
pub const ENV_MAX_FRAMES: &str = "SPARK_MU_MAX_FRAMES";
/// Environment variable overriding [`RenderConfig::window_title`].
pub const ENV_TITLE: &str = "SPARK_MU_TITLE";

/// Configuration for the render loop and the terminal engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Frame rate cap. The terminal engine waits for input for at most one
    /// frame budget per iteration.
    pub target_fps: u32,
    /// Stop after this many projected frames (headless runs, smoke tests).
    pub max_frames: Option<u64>,
    /// Title used for the root container window and untitled windows.
    pub window_title: String,
    /// Maximum length accepted by text fields, in characters.
    pub max_input_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            max_frames: None,
            window_title: "root".to_string(),
            max_input_len: 256,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `SPARK_MU_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(fps) = env::var(ENV_FPS).ok().and_then(|v| v.parse().ok()) {
            config = config.with_target_fps(fps);
        }
        if let Some(frames) = env::var(ENV_MAX_FRAMES).ok().and_then(|v| v.parse().ok()) {
            config.max_frames = Some(frames);
        }
        if let Ok(title) = env::var(ENV_TITLE) {
            if !title.is_empty() {
                config.window_title = title;
            }
        }
        config
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps.max(1);
        self
    }

    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn with_window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn with_max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = len;
        self
    }

    /// Time budget for one frame.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.target_fps.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.max_frames, None);
        assert_eq!(config.window_title, "root");
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::new()
            .with_target_fps(0)
            .with_max_frames(3)
            .with_window_title("demo");
        assert_eq!(config.target_fps, 1);
        assert_eq!(config.max_frames, Some(3));
        assert_eq!(config.window_title, "demo");
    }

    #[test]
    fn test_frame_budget() {
        let config = RenderConfig::new().with_target_fps(50);
        assert!((config.frame_budget().as_secs_f64() - 0.02).abs() < 1e-6);
    }
}
