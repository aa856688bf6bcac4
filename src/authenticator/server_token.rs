// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	authenticator::{AuthFuture, Authenticator},
	error::ConfigError,
	http::ApiRequest,
	retry::AuthenticationAttempt,
};

/// Signs with a static application server token (`Authorization: Token <token>`).
///
/// Server tokens never expire and cannot be refreshed.
#[derive(Clone)]
pub struct ServerTokenAuthenticator {
	header: HeaderValue,
}
impl ServerTokenAuthenticator {
	/// Builds the authenticator from a server token.
	pub fn new(token: &TokenSecret) -> Result<Self, ConfigError> {
		if token.is_empty() {
			return Err(ConfigError::EmptySecret { field: "server token" });
		}

		let mut header = HeaderValue::from_str(&format!("Token {}", token.expose()))
			.map_err(|source| ConfigError::InvalidHeader { name: "Authorization", source })?;

		header.set_sensitive(true);

		Ok(Self { header })
	}
}
impl Authenticator for ServerTokenAuthenticator {
	fn authorization_header(&self) -> Result<HeaderValue> {
		Ok(self.header.clone())
	}

	fn is_refreshable(&self) -> bool {
		false
	}

	fn refresh<'a>(
		&'a self,
		_: &'a AuthenticationAttempt<'a>,
	) -> AuthFuture<'a, Option<ApiRequest>> {
		Box::pin(async { Ok(None) })
	}
}
impl Debug for ServerTokenAuthenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ServerTokenAuthenticator(<redacted>)")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::http::ApiResponse;

	#[tokio::test]
	async fn server_tokens_sign_and_never_refresh() {
		let authenticator =
			ServerTokenAuthenticator::new(&TokenSecret::new("serverToken")).expect("Server token should be valid.");
		let mut request = ApiRequest::new(
			Method::GET,
			Url::parse("https://api.uber.com/v1.2/products").expect("Fixture URL should parse."),
		);

		authenticator.sign(&mut request).expect("Signing should succeed.");
		authenticator.sign(&mut request).expect("Re-signing should succeed.");

		assert_eq!(request.headers.get_all(header::AUTHORIZATION).iter().count(), 1);
		assert_eq!(request.authorization(), Some(&HeaderValue::from_static("Token serverToken")));
		assert!(!authenticator.is_refreshable());

		let response = ApiResponse::new(StatusCode::UNAUTHORIZED, HeaderMap::new(), Vec::new(), request);
		let attempt = AuthenticationAttempt::new(&response);

		assert!(authenticator.refresh(&attempt).await.expect("Refresh should not fail.").is_none());
		assert!(!format!("{authenticator:?}").contains("serverToken"));
	}
}
