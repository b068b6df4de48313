//! Auth domain - OTP lifecycle and credential issuance.
//!
//! Flow: client requests an OTP -> generator produces a code -> store
//! keeps it with a 5 minute TTL -> dispatcher walks the delivery chain ->
//! client submits the code (plus PIN where one is on file) -> verification
//! consumes the record -> session issuer resolves or creates the identity
//! and mints the access/refresh token pair.

pub mod channels;
pub mod dispatch;
pub mod generator;
pub mod jwt;
pub mod phone;
pub mod pin;
pub mod session;
pub mod store;
pub mod verify;

pub use channels::{channels_from_config, ConsoleChannel};
pub use dispatch::{DeliveryChannel, DeliveryMethod, DeliveryOutcome, Dispatcher};
pub use jwt::{AccessClaims, RefreshClaims, TokenService};
pub use session::AuthService;
pub use store::{InMemoryOtpStore, OtpRecord, OtpStore};
