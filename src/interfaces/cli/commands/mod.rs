mod config_gen;
mod healthcheck;
mod user;

pub use config_gen::config_generate;
pub use healthcheck::{default_health_url, healthcheck};
pub use user::{create_user, get_password, list_users};
