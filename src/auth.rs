//! Auth-domain identifiers, roles, identities, and session credentials.

pub mod id;
pub mod identity;
pub mod token;

pub use id::*;
pub use identity::*;
pub use token::{credentials::*, secret::*};
