//! Authentication core for the Samriddhi retail bond platform.
//!
//! Phone-number identity instead of email/password: clients request an
//! OTP, the dispatcher pushes it through an ordered chain of delivery
//! channels, and a successful verification (plus an optional PIN check)
//! mints a signed access/refresh token pair.

pub mod common;
pub mod config;
pub mod domains;
pub mod server;

pub use config::Config;
