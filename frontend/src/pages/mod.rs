pub mod history;
pub mod home;
pub mod settings;
pub mod strength;
pub mod upload;
