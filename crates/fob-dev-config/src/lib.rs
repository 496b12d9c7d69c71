//! Configuration for the fob development middleware.
//!
//! Provides the serde option types consumed by `fob-dev-middleware` and a
//! figment-based loader that layers defaults, `fob-dev.toml` and
//! `FOB_DEV_*` environment variables.

pub mod error;
pub mod loading;
pub mod options;
pub mod validation;

pub use error::*;
pub use loading::{CONFIG_FILE_NAME, ConfigLoader, ENV_PREFIX, discover};
pub use options::*;
