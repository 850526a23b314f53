//! Configuration loading
//!
//! Files (TOML or JSON) plus `CLASSBATCH_*` environment overrides.

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_file, probe_config_paths, validate};
