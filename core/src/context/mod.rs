mod app_config;

pub use app_config::{APP_NAME, AppConfig, AppConfigExt};
