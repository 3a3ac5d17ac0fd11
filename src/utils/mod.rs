pub mod config_loader;
pub mod constants;
pub mod env;
pub mod http_client;
pub mod logging;
