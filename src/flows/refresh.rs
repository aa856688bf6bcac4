//! Refresh-token grant.
//!
//! [`TokenRefresher`] is a pure function of (refresh token, client id/secret): it performs the
//! network call and returns the replacement [`Credential`]. Persisting the result and deciding
//! *when* to refresh belong to the authenticator.

// crates.io
use oauth2::RefreshToken;
// self
use crate::{
	_prelude::*,
	auth::{Credential, TokenSecret},
	config::SessionConfiguration,
	http::Transport,
	oauth::{self, ConfiguredClient, ResponseMetadataSlot, TokenEndpointClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Boxed future returned by [`TokenRefresher::refresh`].
pub type RefreshFuture<'a> = Pin<Box<dyn Future<Output = Result<Credential>> + 'a + Send>>;

/// Exchanges a refresh token for a new [`Credential`].
pub trait TokenRefresher
where
	Self: Send + Sync,
{
	/// Performs `grant_type=refresh_token` against the token endpoint.
	///
	/// A non-success response resolves to [`Error::RefreshFailed`]; a transport failure resolves
	/// to [`Error::Transport`].
	fn refresh<'a>(&'a self, refresh_token: &'a TokenSecret) -> RefreshFuture<'a>;
}

/// [`TokenRefresher`] that posts the form-encoded refresh grant through a [`Transport`].
pub struct OAuthTokenRefresher<T>
where
	T: ?Sized + Transport,
{
	client: ConfiguredClient,
	transport: Arc<T>,
}
impl<T> OAuthTokenRefresher<T>
where
	T: ?Sized + Transport,
{
	/// Builds a refresher for the configuration's token endpoint and client credentials.
	pub fn new(config: &SessionConfiguration, transport: impl Into<Arc<T>>) -> Result<Self> {
		Ok(Self { client: oauth::configured_client(config)?, transport: transport.into() })
	}
}
impl<T> TokenRefresher for OAuthTokenRefresher<T>
where
	T: ?Sized + Transport,
{
	fn refresh<'a>(&'a self, refresh_token: &'a TokenSecret) -> RefreshFuture<'a> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		Box::pin(span.instrument(async move {
			let slot = ResponseMetadataSlot::default();
			let http = TokenEndpointClient::new(Arc::clone(&self.transport), slot.clone());
			let secret = RefreshToken::new(refresh_token.expose().to_owned());
			let result = match self.client.exchange_refresh_token(&secret).request_async(&http).await {
				Ok(response) => oauth::credential_from_response(&response, Some(refresh_token)),
				Err(e) => Err(oauth::map_request_error(KIND, slot.take(), e)),
			};

			obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

			result
		}))
	}
}
impl<T> Debug for OAuthTokenRefresher<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OAuthTokenRefresher").finish_non_exhaustive()
	}
}
