//! Authentication primitives for the orchard inventory service

pub mod password;
pub mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use session::{SessionClaims, SessionError, SessionValidator};
