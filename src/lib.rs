//! Authentication core for the Rides REST API: signs every outgoing request, refreshes expired
//! OAuth credentials exactly once under concurrent load, retries rejected requests within a
//! fixed ceiling, and keeps sandbox-only operations away from production.
//!
//! The crate is organized leaf first:
//!
//! - [`auth`] holds credentials, scopes, and redacted secrets.
//! - [`config`] validates the immutable [`config::SessionConfiguration`].
//! - [`store`] persists the current [`auth::Credential`] per session key.
//! - [`flows`] talks to the token endpoint (refresh, code exchange, client credentials).
//! - [`authenticator`], [`retry`], and [`signing`] attach and repair the `Authorization` header.
//! - [`api`] gates, signs, dispatches, and retries calls behind three call-style facades.

#![deny(clippy::all)]
#![warn(missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod authenticator;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod retry;
pub mod signing;
pub mod store;

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use oauth2::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
