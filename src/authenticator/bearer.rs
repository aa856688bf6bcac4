//! OAuth 2.0 bearer authenticator with a single-flight refresh critical section.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKey, TokenSecret},
	authenticator::{AuthFuture, Authenticator, RefreshMetrics},
	error::{ConfigError, TokenEndpointFailure},
	flows::TokenRefresher,
	http::ApiRequest,
	retry::AuthenticationAttempt,
	store::CredentialStore,
};

/// Window used by [`OAuth2Authenticator::refresh_credential_if_needed`].
pub const DEFAULT_REFRESH_WINDOW: Duration = Duration::minutes(5);

/// Signs with `Authorization: Bearer <access_token>` from the credential stored under one key.
///
/// Reactive refreshes ([`Authenticator::refresh`]) and on-demand refreshes
/// ([`refresh_credential_if_needed`](Self::refresh_credential_if_needed)) share one async mutex.
/// Inside it the failed request's `Authorization` value is compared byte for byte with the value
/// the current credential produces. A mismatch means another caller already refreshed, so the
/// request is re-signed without a network call. This relies on the header format staying stable:
/// if two credential generations ever rendered the same header, the check could not tell them
/// apart and a redundant refresh would follow.
///
/// A rejected refresh is remembered together with the header it was attempted for. Callers still
/// holding that header get the same [`Error::RefreshFailed`] without another network call, until
/// the stored credential changes.
pub struct OAuth2Authenticator {
	store: Arc<dyn CredentialStore>,
	key: CredentialKey,
	refresher: Arc<dyn TokenRefresher>,
	refresh_guard: AsyncMutex<Option<RejectedGeneration>>,
	refresh_window: Duration,
	metrics: Arc<RefreshMetrics>,
}
impl OAuth2Authenticator {
	/// Creates an authenticator that reads and writes `key` in `store`.
	pub fn new(
		store: Arc<dyn CredentialStore>,
		key: CredentialKey,
		refresher: Arc<dyn TokenRefresher>,
	) -> Self {
		Self {
			store,
			key,
			refresher,
			refresh_guard: AsyncMutex::new(None),
			refresh_window: DEFAULT_REFRESH_WINDOW,
			metrics: Arc::default(),
		}
	}

	/// Overrides the on-demand refresh window.
	pub fn with_refresh_window(mut self, window: Duration) -> Self {
		self.refresh_window = window;

		self
	}

	/// Session key this authenticator is bound to.
	pub fn key(&self) -> &CredentialKey {
		&self.key
	}

	/// Shared counters for refreshes, resigns, and failures.
	pub fn metrics(&self) -> &Arc<RefreshMetrics> {
		&self.metrics
	}

	/// Current credential from the store.
	pub fn current_credential(&self) -> Result<Credential> {
		self.store
			.load(&self.key)?
			.ok_or_else(|| ConfigError::MissingCredential { key: self.key.to_string() }.into())
	}

	/// Refreshes when the stored credential is refreshable and expires within the window.
	///
	/// Returns `Ok(false)` without a network call otherwise. Signing never calls this.
	pub async fn refresh_credential_if_needed(&self) -> Result<bool> {
		let mut rejected = self.refresh_guard.lock().await;
		let current = self.current_credential()?;
		let Some(refresh_token) = current.refresh_token.as_ref() else {
			return Ok(false);
		};

		if !current.expires_within(self.refresh_window, OffsetDateTime::now_utc()) {
			return Ok(false);
		}

		self.refresh_locked(&mut rejected, bearer_header(&current)?, refresh_token).await?;

		Ok(true)
	}

	/// Runs one refresh for the generation rendering `current_header`.
	///
	/// Must be called with the refresh guard held; `rejected` is the guarded slot.
	async fn refresh_locked(
		&self,
		rejected: &mut Option<RejectedGeneration>,
		current_header: HeaderValue,
		refresh_token: &TokenSecret,
	) -> Result<Credential> {
		if let Some(generation) = rejected.as_ref().filter(|generation| generation.header == current_header)
		{
			#[cfg(feature = "tracing")]
			tracing::debug!(key = %self.key, "refresh already rejected for this credential");

			return Err(Error::RefreshFailed(generation.failure.clone()));
		}

		self.metrics.record_refresh();

		match self.refresher.refresh(refresh_token).await {
			Ok(credential) => {
				self.store.store(&self.key, credential.clone())?;
				*rejected = None;

				#[cfg(feature = "tracing")]
				tracing::debug!(key = %self.key, "stored refreshed credential");

				Ok(credential)
			},
			Err(e) => {
				self.metrics.record_failure();

				if let Error::RefreshFailed(failure) = &e {
					*rejected =
						Some(RejectedGeneration { header: current_header, failure: failure.clone() });
				}

				Err(e)
			},
		}
	}
}
impl Authenticator for OAuth2Authenticator {
	fn authorization_header(&self) -> Result<HeaderValue> {
		bearer_header(&self.current_credential()?)
	}

	fn is_refreshable(&self) -> bool {
		matches!(self.store.load(&self.key), Ok(Some(credential)) if credential.is_refreshable())
	}

	fn refresh<'a>(
		&'a self,
		attempt: &'a AuthenticationAttempt<'a>,
	) -> AuthFuture<'a, Option<ApiRequest>> {
		Box::pin(async move {
			let mut rejected = self.refresh_guard.lock().await;
			let current = self.current_credential()?;
			let current_header = bearer_header(&current)?;
			let mut request = attempt.request().clone();

			if attempt.signed_with() != Some(&current_header) {
				self.metrics.record_resign();

				#[cfg(feature = "tracing")]
				tracing::debug!(key = %self.key, "credential already refreshed; re-signing");

				request.set_header(header::AUTHORIZATION, current_header);

				return Ok(Some(request));
			}

			let Some(refresh_token) = current.refresh_token.as_ref() else {
				return Ok(None);
			};
			let fresh = self.refresh_locked(&mut rejected, current_header, refresh_token).await?;

			request.set_header(header::AUTHORIZATION, bearer_header(&fresh)?);

			Ok(Some(request))
		})
	}
}
impl Debug for OAuth2Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuth2Authenticator")
			.field("key", &self.key)
			.field("refresh_window", &self.refresh_window)
			.field("metrics", &self.metrics)
			.finish_non_exhaustive()
	}
}

/// Refresh rejection remembered for the credential generation that produced `header`.
struct RejectedGeneration {
	header: HeaderValue,
	failure: TokenEndpointFailure,
}

fn bearer_header(credential: &Credential) -> Result<HeaderValue> {
	let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.access_token.expose()))
		.map_err(|source| ConfigError::InvalidHeader { name: "Authorization", source })?;

	value.set_sensitive(true);

	Ok(value)
}
