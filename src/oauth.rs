//! Glue that lets the `oauth2` crate drive token requests through any [`Transport`].
//!
//! Every token call gets a fresh [`ResponseMetadataSlot`]. The adapter records the status and
//! body of the token endpoint response there, so error mapping can report the exact failure
//! even when `oauth2` only hands back a parse error.

pub use oauth2;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, AuthUrl, ClientId as OAuthClientId, ClientSecret, EndpointNotSet,
	EndpointSet, HttpClientError, HttpRequest, HttpResponse, RedirectUrl, RequestTokenError,
	TokenResponse, TokenUrl,
	basic::{BasicClient, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{Credential, ScopeSet, TokenSecret},
	config::SessionConfiguration,
	error::{ConfigError, TokenEndpointFailure, TransportError},
	http::{ApiRequest, Transport},
	obs::FlowKind,
};

/// `oauth2` client with the authorization and token endpoints set.
pub(crate) type ConfiguredClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Metadata captured from the most recent token endpoint response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the token endpoint, if available.
	pub status: Option<u16>,
	/// Raw response body.
	pub body: Vec<u8>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between the adapter and error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// [`AsyncHttpClient`] handle that forwards `oauth2` requests to a [`Transport`].
pub(crate) struct TokenEndpointClient<T>
where
	T: ?Sized + Transport,
{
	transport: Arc<T>,
	slot: ResponseMetadataSlot,
}
impl<T> TokenEndpointClient<T>
where
	T: ?Sized + Transport,
{
	pub(crate) fn new(transport: Arc<T>, slot: ResponseMetadataSlot) -> Self {
		Self { transport, slot }
	}
}
impl<'c, T> AsyncHttpClient<'c> for TokenEndpointClient<T>
where
	T: ?Sized + Transport,
{
	type Error = HttpClientError<TransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let (parts, body) = request.into_parts();
			let url = Url::parse(&parts.uri.to_string())
				.map_err(|e| HttpClientError::Other(format!("Token endpoint URI is invalid: {e}.")))?;
			let api_request = ApiRequest { method: parts.method, url, headers: parts.headers, body };
			let response =
				self.transport.send(api_request).await.map_err(|e| HttpClientError::Reqwest(Box::new(e)))?;

			self.slot.store(ResponseMetadata {
				status: Some(response.status.as_u16()),
				body: response.body.clone(),
			});

			let mut http_response = HttpResponse::new(response.body);

			*http_response.status_mut() = response.status;
			*http_response.headers_mut() = response.headers;

			Ok(http_response)
		})
	}
}

/// Builds the `oauth2` client for a session configuration.
///
/// Client credentials travel in the form body (`client_id` + `client_secret`), which is what the
/// token endpoint expects.
pub(crate) fn configured_client(config: &SessionConfiguration) -> Result<ConfiguredClient> {
	let auth_url = AuthUrl::from_url(config.authorize_url().clone());
	let token_url = TokenUrl::from_url(config.token_url().clone());
	let mut client = BasicClient::new(OAuthClientId::new(config.client_id().to_string()))
		.set_auth_uri(auth_url)
		.set_token_uri(token_url)
		.set_auth_type(AuthType::RequestBody);

	if let Some(secret) = config.client_secret() {
		client = client.set_client_secret(ClientSecret::new(secret.expose().to_owned()));
	}
	if let Some(redirect) = config.redirect_uri() {
		client = client.set_redirect_uri(RedirectUrl::from_url(redirect.clone()));
	}

	Ok(client)
}

/// Converts a successful token response into a [`Credential`].
///
/// `previous_refresh` is kept only when the server omitted a refresh token.
pub(crate) fn credential_from_response(
	response: &BasicTokenResponse,
	previous_refresh: Option<&TokenSecret>,
) -> Result<Credential> {
	let issued_at = OffsetDateTime::now_utc();
	let scope = match response.scopes() {
		Some(scopes) => ScopeSet::new(scopes.iter().map(|scope| scope.as_str())).map_err(ConfigError::from)?,
		None => ScopeSet::default(),
	};
	let mut builder = Credential::builder()
		.access_token(response.access_token().secret().to_owned())
		.token_type(token_type_label(response.token_type().as_ref()))
		.scope(scope)
		.issued_at(issued_at);

	if let Some(expires_in) = response.expires_in() {
		let seconds =
			i64::try_from(expires_in.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

		builder = builder.expires_in(Duration::seconds(seconds));
	}

	match (response.refresh_token(), previous_refresh) {
		(Some(fresh), _) => builder = builder.refresh_token(fresh.secret().to_owned()),
		(None, Some(previous)) => builder = builder.refresh_token(previous.expose()),
		(None, None) => {},
	}

	Ok(builder.build().map_err(ConfigError::from)?)
}

/// Maps an `oauth2` request failure into the crate error for the given flow.
pub(crate) fn map_request_error(
	kind: FlowKind,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<TransportError>>,
) -> Error {
	let status = meta.as_ref().and_then(|meta| meta.status);

	match err {
		RequestTokenError::Request(error) => map_transport_error(error),
		RequestTokenError::Parse(source, _) if status == Some(200) =>
			Error::TokenResponse { source, status },
		RequestTokenError::ServerResponse(_)
		| RequestTokenError::Parse(_, _)
		| RequestTokenError::Other(_) => {
			let meta = meta.unwrap_or_default();
			let failure = TokenEndpointFailure::new(
				meta.status.unwrap_or_default(),
				String::from_utf8_lossy(&meta.body),
			);

			rejection(kind, failure)
		},
	}
}

fn rejection(kind: FlowKind, failure: TokenEndpointFailure) -> Error {
	match kind {
		FlowKind::Refresh => Error::RefreshFailed(failure),
		_ => Error::ExchangeFailed(failure),
	}
}

fn map_transport_error(err: HttpClientError<TransportError>) -> Error {
	match err {
		HttpClientError::Reqwest(inner) => Error::Transport(*inner),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => TransportError::network(std::io::Error::other(message)).into(),
		_ => TransportError::network(std::io::Error::other("unknown token transport failure")).into(),
	}
}

fn token_type_label(raw: &str) -> String {
	if raw.eq_ignore_ascii_case("bearer") { "Bearer".into() } else { raw.to_owned() }
}
