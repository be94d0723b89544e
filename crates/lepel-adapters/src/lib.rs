//! lepel-adapters: adaptadores de I/O alrededor de `lepel-core`.
pub mod cli_args;
pub mod config_file;
pub mod env;
pub mod error;
pub mod file_store;
pub mod git;
pub mod launcher;
pub mod steps;

pub use cli_args::cli_args_to_config;
pub use config_file::{load_config, save_config, ConfigFormat};
pub use error::AdapterError;
pub use file_store::FileCheckpointStore;
pub use git::{save_git_status, save_git_status_from};
pub use launcher::{run_pipeline, RunOptions};
pub use steps::{BindConfigFromDisk, EnsureRequiredConfigValues, RegisterCliArgsToConfig};
