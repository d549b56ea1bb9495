//! Authentication service models

pub mod user;

pub use user::{CreatedUser, Credentials, LoginRequest, NewUser, UserResponse};
