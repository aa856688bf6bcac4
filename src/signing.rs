//! Header stamping applied to every outgoing API request.

// self
use crate::{
	_prelude::*, authenticator::Authenticator, config::SessionConfiguration, http::ApiRequest,
};

/// Client identification header name.
pub const USER_AGENT_HEADER: &str = "x-uber-user-agent";
/// Client identification header value.
pub const USER_AGENT: &str = concat!("Rust Rides SDK v", env!("CARGO_PKG_VERSION"));

/// Adds `Accept-Language`, the client identification header, then `Authorization`.
///
/// Every header is inserted with replace semantics, so running the interceptor again on a retried
/// request never duplicates anything. Signing reads the current credential and never refreshes.
#[derive(Clone)]
pub struct RequestSigningInterceptor {
	locale: HeaderValue,
	authenticator: Arc<dyn Authenticator>,
}
impl RequestSigningInterceptor {
	/// Builds an interceptor for the configuration's locale.
	pub fn new(config: &SessionConfiguration, authenticator: Arc<dyn Authenticator>) -> Self {
		Self { locale: config.locale_header().clone(), authenticator }
	}

	/// Authenticator used for the `Authorization` header.
	pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
		&self.authenticator
	}

	/// Stamps the headers onto `request`.
	pub fn intercept(&self, request: &mut ApiRequest) -> Result<()> {
		request.set_header(header::ACCEPT_LANGUAGE, self.locale.clone());
		request.set_header(
			HeaderName::from_static(USER_AGENT_HEADER),
			HeaderValue::from_static(USER_AGENT),
		);

		self.authenticator.sign(request)
	}
}
impl Debug for RequestSigningInterceptor {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestSigningInterceptor").field("locale", &self.locale).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::TokenSecret, authenticator::ServerTokenAuthenticator};

	#[test]
	fn intercept_is_idempotent() {
		let config = SessionConfiguration::builder("client")
			.locale("fr-FR")
			.build()
			.expect("Configuration should build.");
		let authenticator = ServerTokenAuthenticator::new(&TokenSecret::new("serverToken"))
			.expect("Server token should be valid.");
		let interceptor = RequestSigningInterceptor::new(&config, Arc::new(authenticator));
		let mut request = ApiRequest::new(
			Method::GET,
			Url::parse("https://api.uber.com/v1.2/products").expect("Fixture URL should parse."),
		);

		interceptor.intercept(&mut request).expect("First pass should succeed.");
		interceptor.intercept(&mut request).expect("Second pass should succeed.");

		assert_eq!(request.headers.len(), 3);
		assert_eq!(request.headers.get(header::ACCEPT_LANGUAGE), Some(&HeaderValue::from_static("fr-FR")));
		assert_eq!(
			request.headers.get(USER_AGENT_HEADER).and_then(|value| value.to_str().ok()),
			Some(concat!("Rust Rides SDK v", env!("CARGO_PKG_VERSION")))
		);
		assert_eq!(request.authorization(), Some(&HeaderValue::from_static("Token serverToken")));
	}
}
