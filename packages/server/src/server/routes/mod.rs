pub mod auth;
pub mod health;

pub use auth::{
    check_user_handler, login_handler, logout_handler, profile_handler, refresh_handler,
    register_handler, send_otp_handler, verify_otp_handler,
};
pub use health::health_handler;
