///! Configuration Module

pub mod loader;
pub mod resolver;
pub mod types;

pub use loader::load_file_config;
pub use resolver::{FailurePolicy, Overrides, Settings, resolve};
pub use types::FileConfig;
