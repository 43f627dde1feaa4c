pub mod auth;
pub mod health;
pub mod home;
pub mod upload;
