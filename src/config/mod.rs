//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HttpConfig (validated, immutable)
//!     → one pipeline per ClientConfig in the registry
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; a pipeline keeps its PolicyConfig for life
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{ClientConfig, HeaderConfig, HttpConfig, ObservabilityConfig, PolicyConfig, DEFAULT_CLIENT};
pub use validation::ValidationError;
