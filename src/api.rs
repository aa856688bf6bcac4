//! Operation registry, environment gate, dispatch pipeline, and call-style facades.
//!
//! Every facade resolves an [`ApiCall`] to its [`Operation`] and runs it through
//! [`ApiClient::prepare`] before anything is sent, so sandbox-only operations are rejected the
//! same way whichever call style invoked them.

mod call;
mod client;
mod facade;
mod operation;
mod session;

pub use call::ApiCall;
pub use client::ApiClient;
pub use facade::{BlockingRidesService, CallbackRidesService, RidesService};
pub use operation::{EnvironmentGate, Operation};
pub use session::Session;
