//! Auth-domain identifiers, redacted secrets, and derived binding credentials.

pub mod credentials;
pub mod id;
pub mod secret;

pub use credentials::*;
pub use id::*;
pub use secret::*;
