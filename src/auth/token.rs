//! Bearer credential models.

pub mod credentials;
pub mod secret;
