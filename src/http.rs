//! Request/response model and the transport seam shared by API calls and token calls.
//!
//! [`Transport`] is the crate's only dependency on an HTTP stack. The default
//! [`ReqwestTransport`] wraps a [`ReqwestClient`] that never follows redirects, so a 401/403 or a
//! token endpoint response is always observed as-is.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`Transport::send`].
///
/// `Sync` is required because token calls are driven through `oauth2`'s
/// [`AsyncHttpClient`](oauth2::AsyncHttpClient), whose futures must be `Send + Sync`.
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send + Sync>>;

/// Abstraction over HTTP stacks capable of executing one request.
///
/// Implementations must not retry on their own; authorization retries are decided by the
/// dispatcher and everything else is surfaced to the caller.
pub trait Transport
where
	Self: 'static + Send + Sync,
{
	/// Sends the request and resolves with the raw response.
	fn send(&self, request: ApiRequest) -> TransportFuture<'_>;
}
impl<T> Transport for Arc<T>
where
	T: ?Sized + Transport,
{
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		(**self).send(request)
	}
}

/// Outgoing request whose headers can be replaced individually before it is sent.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Absolute request URL.
	pub url: Url,
	/// Request headers.
	pub headers: HeaderMap,
	/// Raw request body; empty means no body.
	pub body: Vec<u8>,
}
impl ApiRequest {
	/// Creates a request without headers or body.
	pub fn new(method: Method, url: Url) -> Self {
		Self { method, url, headers: HeaderMap::new(), body: Vec::new() }
	}

	/// Sets a header, replacing every existing value under the same name.
	pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
		self.headers.insert(name, value);
	}

	/// Removes every value stored under `name`.
	pub fn remove_header(&mut self, name: &HeaderName) -> Option<HeaderValue> {
		self.headers.remove(name)
	}

	/// The `Authorization` header this request was signed with, if any.
	pub fn authorization(&self) -> Option<&HeaderValue> {
		self.headers.get(header::AUTHORIZATION)
	}
}

/// Raw response plus the request that produced it and the response it retried.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw response body.
	pub body: Vec<u8>,
	/// Request that produced this response, exactly as sent.
	pub request: ApiRequest,
	/// Response that this attempt retried, if any.
	pub prior: Option<Box<ApiResponse>>,
}
impl ApiResponse {
	/// Creates a response without a prior link.
	pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>, request: ApiRequest) -> Self {
		Self { status, headers, body, request, prior: None }
	}

	/// Links the response this attempt retried.
	pub fn with_prior(mut self, prior: ApiResponse) -> Self {
		self.prior = Some(Box::new(prior));

		self
	}

	/// Number of responses in the chain, this one included.
	pub fn response_count(&self) -> usize {
		let mut count = 1;
		let mut cursor = self.prior.as_deref();

		while let Some(prior) = cursor {
			count += 1;
			cursor = prior.prior.as_deref();
		}

		count
	}

	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Returns `true` for 401 and 403.
	pub fn is_authorization_failure(&self) -> bool {
		matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
	}

	/// Body as lossy UTF-8.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Deserializes the body, reporting the JSON path of any mismatch.
	pub fn json<T>(&self) -> Result<T, serde_path_to_error::Error<serde_json::Error>>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
	}
}

/// [`Transport`] backed by reqwest.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestTransport(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Builds a transport that does not follow redirects.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Builds a transport with connect and total timeouts.
	///
	/// The same timeouts govern API calls and refresh calls; a timed-out call surfaces as
	/// [`TransportError::Timeout`].
	pub fn with_timeouts(
		connect: std::time::Duration,
		total: std::time::Duration,
	) -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.connect_timeout(connect)
			.timeout(total)
			.build()?;

		Ok(Self(client))
	}

	/// Wraps an existing client. Configure it to not follow redirects.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Transport for ReqwestTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let mut builder = self
				.0
				.request(request.method.clone(), request.url.clone())
				.headers(request.headers.clone());

			if !request.body.is_empty() {
				builder = builder.body(request.body.clone());
			}

			let response = builder.send().await?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await?.to_vec();

			Ok(ApiResponse::new(status, headers, body, request))
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn request() -> ApiRequest {
		ApiRequest::new(
			Method::GET,
			Url::parse("https://api.uber.com/v1.2/me").expect("Fixture URL should parse."),
		)
	}

	fn response(status: u16) -> ApiResponse {
		ApiResponse::new(
			StatusCode::from_u16(status).expect("Fixture status should be valid."),
			HeaderMap::new(),
			Vec::new(),
			request(),
		)
	}

	#[test]
	fn set_header_replaces_existing_values() {
		let mut request = request();

		request.headers.append(header::AUTHORIZATION, HeaderValue::from_static("Bearer old"));
		request.headers.append(header::AUTHORIZATION, HeaderValue::from_static("Bearer older"));
		request.set_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer new"));

		assert_eq!(request.headers.get_all(header::AUTHORIZATION).iter().count(), 1);
		assert_eq!(request.authorization(), Some(&HeaderValue::from_static("Bearer new")));
		assert!(request.remove_header(&header::AUTHORIZATION).is_some());
		assert!(request.authorization().is_none());
	}

	#[test]
	fn response_count_follows_prior_chain() {
		let first = response(401);
		let second = response(401).with_prior(first);
		let third = response(200).with_prior(second);

		assert_eq!(third.response_count(), 3);
		assert!(third.is_success());
		assert!(third.prior.as_deref().is_some_and(ApiResponse::is_authorization_failure));
	}

	#[test]
	fn json_reports_paths() {
		#[derive(Debug, Deserialize)]
		struct Profile {
			#[allow(dead_code)]
			rider_id: String,
		}

		let mut response = response(200);

		response.body = br#"{"rider_id":42}"#.to_vec();

		let err = response.json::<Profile>().expect_err("Numeric rider ids must fail.");

		assert_eq!(err.path().to_string(), "rider_id");
	}
}
