pub mod config_service;
pub mod image_store;
pub mod paths;
pub mod secret_service;

pub use config_service::ConfigService;
pub use image_store::{read_image, write_image};
pub use paths::VoguePaths;
pub use secret_service::SecretServiceImpl;
