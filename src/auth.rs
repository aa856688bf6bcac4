//! Credential models, scope sets, and validated identifiers.

pub mod credential;
pub mod id;
pub mod scope;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use scope::*;
pub use secret::*;
