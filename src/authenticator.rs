//! The capability set every session authenticates with: sign, is-refreshable, refresh.

mod bearer;
mod metrics;
mod server_token;

pub use bearer::{DEFAULT_REFRESH_WINDOW, OAuth2Authenticator};
pub use metrics::RefreshMetrics;
pub use server_token::ServerTokenAuthenticator;

// self
use crate::{_prelude::*, http::ApiRequest, retry::AuthenticationAttempt};

/// Boxed future returned by [`Authenticator::refresh`].
pub type AuthFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Attaches credentials to requests and repairs them after an authorization failure.
pub trait Authenticator
where
	Self: Send + Sync,
{
	/// `Authorization` value derived from the current credential state. Never refreshes.
	fn authorization_header(&self) -> Result<HeaderValue>;

	/// Signs `request`, replacing any `Authorization` header already present.
	fn sign(&self, request: &mut ApiRequest) -> Result<()> {
		let value = self.authorization_header()?;

		request.set_header(header::AUTHORIZATION, value);

		Ok(())
	}

	/// Returns `true` when [`refresh`](Self::refresh) can obtain a new credential.
	fn is_refreshable(&self) -> bool;

	/// Produces a re-signed copy of the failed request, refreshing first when nobody else has.
	///
	/// Resolves to `None` when this authenticator cannot help.
	fn refresh<'a>(
		&'a self,
		attempt: &'a AuthenticationAttempt<'a>,
	) -> AuthFuture<'a, Option<ApiRequest>>;
}
impl<A> Authenticator for Arc<A>
where
	A: ?Sized + Authenticator,
{
	fn authorization_header(&self) -> Result<HeaderValue> {
		(**self).authorization_header()
	}

	fn sign(&self, request: &mut ApiRequest) -> Result<()> {
		(**self).sign(request)
	}

	fn is_refreshable(&self) -> bool {
		(**self).is_refreshable()
	}

	fn refresh<'a>(
		&'a self,
		attempt: &'a AuthenticationAttempt<'a>,
	) -> AuthFuture<'a, Option<ApiRequest>> {
		(**self).refresh(attempt)
	}
}
