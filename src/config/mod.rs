//! Configuration loaded from `config/default`, `config/local` and `APP__*` variables

mod app_config;

pub use app_config::{
    AppConfig, LogFormat, LoggingConfig, ServerConfig, StorageBackend, StorageConfig,
};
