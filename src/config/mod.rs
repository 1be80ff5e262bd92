mod r#impl;
mod structs;
pub mod validators;

pub use r#impl::{get_config, init_config, init_config_with};
pub use structs::*;
