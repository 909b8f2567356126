pub mod loader;
pub mod proc_validator;
pub mod settings;
