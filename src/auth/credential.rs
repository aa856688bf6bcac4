//! Immutable OAuth credential and its builder.
//!
//! A [`Credential`] is never mutated after it is built. Every refresh produces a new value that
//! replaces the previous one in the [`CredentialStore`](crate::store::CredentialStore).

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
};

/// Token type reported by the authorization server when none is supplied.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Errors produced by [`CredentialBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
	/// Issued when the access token is an empty string.
	#[error("Access token cannot be empty.")]
	EmptyAccessToken,
}

/// Access token, optional refresh token, expiry, and granted scopes for one logged-in user.
///
/// A credential without a refresh token is terminal: it cannot be refreshed and is treated as
/// valid until the API rejects it.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the server issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Token type reported by the server (usually `Bearer`).
	pub token_type: String,
	/// Scopes granted to this credential.
	pub scope: ScopeSet,
	/// Instant the token endpoint issued the credential.
	pub issued_at: OffsetDateTime,
	/// Absolute expiry derived from `issued_at + expires_in`, when the server reported one.
	pub expires_at: Option<OffsetDateTime>,
}
impl Credential {
	/// Returns a builder for assembling credentials.
	pub fn builder() -> CredentialBuilder {
		CredentialBuilder::default()
	}

	/// Returns `true` when a refresh token is present.
	pub fn is_refreshable(&self) -> bool {
		self.refresh_token.is_some()
	}

	/// Remaining lifetime at `now`, or `None` when the credential carries no expiry.
	pub fn expires_in_at(&self, now: OffsetDateTime) -> Option<Duration> {
		self.expires_at.map(|expires_at| expires_at - now)
	}

	/// Returns `true` if the credential has expired at the provided instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| now >= expires_at)
	}

	/// Returns `true` if the credential expires within `window` of `now`.
	///
	/// Credentials without an expiry never fall inside a window.
	pub fn expires_within(&self, window: Duration, now: OffsetDateTime) -> bool {
		self.expires_in_at(now).is_some_and(|remaining| remaining <= window)
	}
}
impl Debug for Credential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credential")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("token_type", &self.token_type)
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`Credential`].
#[derive(Clone, Debug, Default)]
pub struct CredentialBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	token_type: Option<String>,
	scope: ScopeSet,
	issued_at: Option<OffsetDateTime>,
	expires_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl CredentialBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Overrides the token type (defaults to [`DEFAULT_TOKEN_TYPE`]).
	pub fn token_type(mut self, token_type: impl Into<String>) -> Self {
		self.token_type = Some(token_type.into());

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the issued-at instant.
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets an absolute expiry instant.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the expiry relative to the issued-at instant.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`Credential`].
	pub fn build(self) -> Result<Credential, CredentialBuilderError> {
		let access_token = self.access_token.ok_or(CredentialBuilderError::MissingAccessToken)?;

		if access_token.is_empty() {
			return Err(CredentialBuilderError::EmptyAccessToken);
		}

		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);
		let expires_at = match (self.expires_at, self.expires_in) {
			(Some(instant), _) => Some(instant),
			(None, Some(delta)) => Some(issued_at + delta),
			(None, None) => None,
		};

		Ok(Credential {
			access_token,
			refresh_token: self.refresh_token.filter(|token| !token.is_empty()),
			token_type: self.token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_owned()),
			scope: self.scope,
			issued_at,
			expires_at,
		})
	}
}
