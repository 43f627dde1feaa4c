//! Courier Services Layer
//!
//! The authorization handshake and the federated upload flow. Every external
//! effect goes through a trait so the flows can run against stubs: cookies
//! (`CookieStore`), time (`Clock`), browser navigation (`Navigator`), the token
//! endpoint (`TokenEndpoint`), credential federation (`CredentialProvider`) and
//! object storage (`courier_storage::Storage`).

pub mod clock;
pub mod cookies;
pub mod exchange;
pub mod federation;
pub mod gate;
pub mod navigator;
pub mod upload;

pub use clock::{Clock, FixedClock, SystemClock};
pub use cookies::{Cookie, CookieStore, MemoryCookieStore, RequestCookies};
pub use exchange::{CodeExchange, ExchangeOutcome, HttpTokenEndpoint, TokenEndpoint, TokenRequest};
pub use federation::{CognitoCredentialProvider, CredentialProvider};
pub use gate::{AuthorizationGate, GateDecision};
pub use navigator::{Navigator, RecordingNavigator};
pub use upload::{FederatedUpload, UploadFile};
