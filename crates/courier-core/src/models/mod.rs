//! Data models for the handshake and upload flow

mod credentials;
mod navigation;
mod token;
mod upload;

pub use credentials::*;
pub use navigation::*;
pub use token::*;
pub use upload::*;
