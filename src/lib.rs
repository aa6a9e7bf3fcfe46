#![warn(clippy::all, rust_2018_idioms)]

//! Animated wireframe mountain backdrop, rendered with wgpu behind page content.

pub mod animator;
pub mod app;
pub mod background;
pub mod config;
pub mod error;
pub mod gpu;
pub mod platform;
pub mod scene;
pub mod terrain;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use animator::{AnimationConfig, Animator, AnimatorState};
#[cfg(not(target_arch = "wasm32"))]
pub use app::NativeHost;
pub use app::{BackgroundApp, EguiScheduler};
pub use background::Background;
pub use config::BackgroundConfig;
pub use error::{BackgroundError, BackgroundResult};
pub use platform::{FrameScheduler, Host, HostEvent, SceneRenderer};
pub use scene::Scene;
