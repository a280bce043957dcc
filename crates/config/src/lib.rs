//! App profile configuration for the connector auth helper.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{
        clear_config_dir, config_dir, default_profiles_path, discover_profiles,
        find_profiles_file, load_profiles, set_config_dir,
    },
    schema::{AppProfile, ProfilesFile},
};
