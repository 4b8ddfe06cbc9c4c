// DeskForge Services
// Business logic layer

mod draft_store;
mod events;
mod exporter;
mod github_build;
pub mod validator;

pub use draft_store::*;
pub use events::*;
pub use exporter::{config_json, env_file};
pub use github_build::*;
pub use validator::{validate, FieldError};
