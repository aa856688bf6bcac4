//! Token endpoint flows: refresh, authorization-code exchange, and client credentials.

pub mod exchange;
pub mod refresh;

pub use exchange::*;
pub use refresh::*;
