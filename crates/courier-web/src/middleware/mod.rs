pub mod gate;
pub mod security_headers;

pub use gate::gate_middleware;
pub use security_headers::{security_headers_middleware, SecurityHeadersConfig};
