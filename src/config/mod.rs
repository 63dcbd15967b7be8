//! Configuration management
//!
//! Two layers: process settings (`settings`) seeded from environment variables, and the
//! consensus parameters of the chain (`chain`) that come from the genesis file.

pub mod chain;
pub mod settings;

pub use chain::ChainConfig;
pub use settings::{Config, GLOBAL_CONFIG};
