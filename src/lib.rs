//! Typing animation and scroll-spy effects for single page sites.
//!
//! The effects are host agnostic: they observe and mutate the outside world only through the
//! [page::Page] trait and are advanced by an [runtime::EffectsRuntime] that the host ticks with
//! the time elapsed since start. Two hosts are included: a deterministic [headless] runner and an
//! interactive [terminal] one.

pub mod config;
pub mod effects;
pub mod headless;
pub mod logging;
pub mod page;
pub mod presets;
pub mod runtime;
pub mod terminal;

pub use crate::{
    config::{ConfigError, SiteConfig},
    page::{Page, StaticPage},
    runtime::{EffectsRuntime, StopHandle},
};
