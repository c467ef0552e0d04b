//! Configuration file loading for sage
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `SAGE_`-prefixed environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./sage.toml` or `./.sage.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/sage/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    AggregationChoice, AssignmentChoice, ConfigValidationError, DecompositionChoice,
    FileConfig, FileEscalationConfig, FileLoggingConfig, FileModelEntry, FileModelsConfig,
    FileOllamaConfig, FileOpenAiConfig, FileOrchestrationConfig, FileOutputConfig,
    FileOutputFormat, FileProvidersConfig,
};
pub use loader::ConfigLoader;
