//! Crate-level error taxonomy shared by configuration, transport, token flows, and dispatch.

// crates.io
use serde_json::Value;
// self
use crate::{_prelude::*, http::ApiResponse, retry::AuthorizationFailureReason};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error surfaced to callers.
///
/// Authorization decisions are resolved inside the retry coordinator; only the final outcome
/// crosses into this type.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Invalid configuration, including sandbox-only operations invoked in production.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential store failure.
	#[error(transparent)]
	Storage(
		#[from]
		crate::store::StoreError,
	),
	/// Network failure (connect, timeout, reset) on an API call or a token call.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The token endpoint rejected a refresh; the session needs a fresh login.
	#[error("Token refresh was rejected with HTTP {}.", .0.status)]
	RefreshFailed(#[source] TokenEndpointFailure),
	/// The token endpoint rejected an authorization-code or client-credentials exchange.
	#[error("Token exchange was rejected with HTTP {}.", .0.status)]
	ExchangeFailed(#[source] TokenEndpointFailure),
	/// The token endpoint answered 200 with a body that is not a valid token response.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Terminal 401/403 after the retry coordinator gave up.
	#[error(transparent)]
	Authorization(#[from] AuthorizationFailure),
	/// Any other non-2xx API response.
	#[error(transparent)]
	Api(#[from] ApiFailure),
}
impl Error {
	/// Classifies the error so callers can pick a recovery path.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::Config(_) => ErrorKind::Configuration,
			Error::Storage(_) => ErrorKind::Storage,
			Error::Transport(_) => ErrorKind::Network,
			Error::RefreshFailed(failure) =>
				if failure.is_invalid_client() {
					ErrorKind::InvalidClient
				} else {
					ErrorKind::LoginRequired
				},
			Error::ExchangeFailed(failure) =>
				if failure.is_invalid_client() || failure.is_invalid_grant() {
					ErrorKind::InvalidClient
				} else {
					ErrorKind::Api
				},
			Error::TokenResponse { .. } => ErrorKind::Api,
			Error::Authorization(_) => ErrorKind::LoginRequired,
			Error::Api(_) => ErrorKind::Api,
		}
	}

	/// Returns `true` for permanent authorization failures, including rejected refreshes.
	pub fn is_authorization_failure(&self) -> bool {
		matches!(self, Error::Authorization(_) | Error::RefreshFailed(_))
	}
}

/// Coarse classification returned by [`Error::kind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The configuration is invalid; fix the code.
	Configuration,
	/// Client id, client secret, or authorization code is wrong.
	InvalidClient,
	/// The user must log in again.
	LoginRequired,
	/// The network is unreachable or timed out.
	Network,
	/// The API returned an error unrelated to authorization.
	Api,
	/// The credential store failed.
	Storage,
}

/// Configuration and validation failures. Never retried.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Client identifier failed validation.
	#[error("Client id is invalid.")]
	InvalidClientId(#[source] crate::auth::IdentifierError),
	/// Credential key failed validation.
	#[error("Credential key is invalid.")]
	InvalidCredentialKey(#[source] crate::auth::IdentifierError),
	/// A secret-bearing field was supplied as an empty string.
	#[error("The {field} cannot be empty.")]
	EmptySecret {
		/// Name of the offending field.
		field: &'static str,
	},
	/// A host override is not an absolute http(s) URL.
	#[error("The {name} host must be an absolute http or https URL: {url}.")]
	InvalidHost {
		/// Which host failed validation.
		name: &'static str,
		/// Offending URL.
		url: String,
	},
	/// A URL could not be joined or parsed.
	#[error("URL is invalid.")]
	InvalidUrl(#[from] url::ParseError),
	/// A configured value cannot be sent as an HTTP header.
	#[error("The {name} header value is invalid.")]
	InvalidHeader {
		/// Header that failed validation.
		name: &'static str,
		/// Underlying header failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Session was given both an OAuth credential and a server token.
	#[error("A session must use either an OAuth credential or a server token, not both.")]
	AmbiguousAuthentication,
	/// Session was given neither an OAuth credential nor a server token.
	#[error("A session requires an OAuth credential or a server token.")]
	MissingAuthentication,
	/// No credential is stored under the session key.
	#[error("No credential is stored under `{key}`.")]
	MissingCredential {
		/// Session key that was looked up.
		key: String,
	},
	/// The grant requires a client secret but none was configured.
	#[error("The {grant} grant requires a client secret.")]
	MissingClientSecret {
		/// Grant label.
		grant: &'static str,
	},
	/// Authorization-code flows need a redirect URI.
	#[error("The authorization code flow requires a redirect URI.")]
	MissingRedirectUri,
	/// Authorization state returned by the redirect does not match.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// A sandbox-only operation was invoked against production.
	#[error("Operation `{operation}` is only available in the sandbox environment.")]
	SandboxOnly {
		/// Operation name.
		operation: &'static str,
	},
	/// Path parameters do not match the operation's template.
	#[error("Operation `{operation}` expects {expected} path parameters but received {actual}.")]
	PathParameters {
		/// Operation name.
		operation: &'static str,
		/// Placeholder count in the template.
		expected: usize,
		/// Parameters supplied by the caller.
		actual: usize,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be serialized.")]
	RequestBody(#[source] serde_json::Error),
	/// Credential builder validation failed.
	#[error("Unable to build credential.")]
	CredentialBuild(#[from] crate::auth::CredentialBuilderError),
	/// Token endpoint returned an `expires_in` that does not fit the supported range.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures. Surfaced to callers and never retried by this crate.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The request timed out.
	#[error("Request timed out.")]
	Timeout {
		/// Transport-specific timeout error.
		#[source]
		source: BoxError,
	},
	/// Connection, DNS, TLS, or reset failure.
	#[error("Network error occurred while sending the request.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while sending the request.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Timeout { source: Box::new(src) }
	}

	/// Returns `true` for timeouts.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout { .. })
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Non-success answer from the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Token endpoint responded with HTTP {status}.")]
pub struct TokenEndpointFailure {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body (lossy UTF-8).
	pub body: String,
	/// OAuth `error` code extracted from a JSON body, if present.
	pub oauth_error: Option<String>,
}
impl TokenEndpointFailure {
	/// Builds a failure and extracts the OAuth `error` code from the body.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		let body = body.into();
		let oauth_error = serde_json::from_str::<Value>(&body)
			.ok()
			.and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_owned));

		Self { status, body, oauth_error }
	}

	/// Returns `true` when the server blamed the client credentials.
	pub fn is_invalid_client(&self) -> bool {
		matches!(self.oauth_error.as_deref(), Some("invalid_client" | "unauthorized_client"))
	}

	/// Returns `true` when the server rejected the grant (code or refresh token).
	pub fn is_invalid_grant(&self) -> bool {
		matches!(self.oauth_error.as_deref(), Some("invalid_grant"))
	}
}

/// Terminal authorization failure with the rejected response attached.
#[derive(Debug, ThisError)]
#[error("Request was not authorized: {reason}.")]
pub struct AuthorizationFailure {
	/// Why the coordinator stopped retrying.
	pub reason: AuthorizationFailureReason,
	/// The last 401/403 response, unchanged.
	pub response: Box<ApiResponse>,
}
impl AuthorizationFailure {
	/// HTTP status of the rejected response.
	pub fn status(&self) -> u16 {
		self.response.status.as_u16()
	}

	/// Parses the error body of the rejected response.
	pub fn error(&self) -> ApiError {
		ApiError::parse(&self.response.body, self.status())
	}
}

/// Non-authorization HTTP failure returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("API responded with HTTP {status}.")]
pub struct ApiFailure {
	/// HTTP status code.
	pub status: u16,
	/// Error detail parsed from the body.
	pub error: ApiError,
}
impl ApiFailure {
	/// Builds a failure from a non-success response.
	pub fn from_response(response: &ApiResponse) -> Self {
		let status = response.status.as_u16();

		Self { status, error: ApiError::parse(&response.body, status) }
	}
}

/// Error detail parsed from an API response body.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
	/// Individual errors reported by the server.
	pub errors: Vec<ClientError>,
}
impl ApiError {
	/// Parses any of the error body shapes the API emits.
	///
	/// Understands `{"errors":[...]}`, `{"code","message"}`, and OAuth `{"error",
	/// "error_description"}` bodies; everything else becomes a single `unknown` error.
	pub fn parse(body: &[u8], status: u16) -> Self {
		let fallback = || ClientError {
			status: Some(status),
			code: "unknown".into(),
			title: String::from_utf8_lossy(body).trim().to_owned(),
		};
		let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
			return Self { errors: vec![fallback()] };
		};

		if let Some(Value::Array(entries)) = map.get("errors") {
			let errors = entries
				.iter()
				.map(|entry| ClientError {
					status: entry.get("status").and_then(status_value).or(Some(status)),
					code: string_field(entry, "code").unwrap_or_else(|| "unknown".into()),
					title: string_field(entry, "title").unwrap_or_default(),
				})
				.collect();

			return Self { errors };
		}

		let object = Value::Object(map);

		if let Some(code) = string_field(&object, "code") {
			let title = string_field(&object, "message").unwrap_or_default();

			return Self { errors: vec![ClientError { status: Some(status), code, title }] };
		}
		if let Some(code) = string_field(&object, "error") {
			let title = string_field(&object, "error_description").unwrap_or_default();

			return Self { errors: vec![ClientError { status: Some(status), code, title }] };
		}

		Self { errors: vec![fallback()] }
	}

	/// First reported error, if any.
	pub fn first(&self) -> Option<&ClientError> {
		self.errors.first()
	}
}

/// One error entry reported by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientError {
	/// HTTP status attached to the entry.
	pub status: Option<u16>,
	/// Machine-readable error code.
	pub code: String,
	/// Human-readable description.
	pub title: String,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
	value.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn status_value(value: &Value) -> Option<u16> {
	match value {
		Value::Number(number) => number.as_u64().and_then(|raw| u16::try_from(raw).ok()),
		Value::String(text) => text.parse().ok(),
		_ => None,
	}
}
