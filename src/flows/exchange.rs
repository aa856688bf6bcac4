//! Authorization-code and client-credentials grants.
//!
//! The browser redirect itself is the caller's business. This module builds the authorize URL,
//! validates the returned `state`, and turns the resulting code into a [`Credential`].

// crates.io
use oauth2::{AuthorizationCode, Scope as OAuthScope};
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKey},
	config::SessionConfiguration,
	error::ConfigError,
	http::Transport,
	oauth::{self, ConfiguredClient, ResponseMetadataSlot, TokenEndpointClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};

const STATE_LEN: usize = 32;

/// Authorize URL plus the `state` value that must round-trip through the redirect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationRequest {
	/// URL the user should be sent to.
	pub url: Url,
	/// Opaque anti-forgery value embedded in `url`.
	pub state: String,
}
impl AuthorizationRequest {
	/// Rejects a redirect whose `state` does not match.
	pub fn validate_state(&self, returned: &str) -> Result<(), ConfigError> {
		if self.state == returned { Ok(()) } else { Err(ConfigError::StateMismatch) }
	}
}

/// Creates credentials from an authorization code or the client-credentials grant.
pub struct TokenExchange<T>
where
	T: ?Sized + Transport,
{
	config: SessionConfiguration,
	client: ConfiguredClient,
	transport: Arc<T>,
}
impl<T> TokenExchange<T>
where
	T: ?Sized + Transport,
{
	/// Builds an exchange helper for the provided configuration.
	pub fn new(config: SessionConfiguration, transport: impl Into<Arc<T>>) -> Result<Self> {
		let client = oauth::configured_client(&config)?;

		Ok(Self { config, client, transport: transport.into() })
	}

	/// Builds the authorize URL with a fresh random `state`.
	pub fn authorization_request(&self) -> Result<AuthorizationRequest, ConfigError> {
		let redirect_uri = self.config.redirect_uri().ok_or(ConfigError::MissingRedirectUri)?;
		let state = random_string(STATE_LEN);
		let mut url = self.config.authorize_url().clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", self.config.client_id());
		pairs.append_pair("redirect_uri", redirect_uri.as_str());

		if !self.config.scopes().is_empty() {
			pairs.append_pair("scope", &self.config.scopes().normalized());
		}

		pairs.append_pair("state", &state);

		drop(pairs);

		Ok(AuthorizationRequest { url, state })
	}

	/// Exchanges an authorization code for a credential.
	pub async fn exchange_authorization_code(&self, code: &str) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::AuthorizationCode;

		if self.config.redirect_uri().is_none() {
			return Err(ConfigError::MissingRedirectUri.into());
		}

		let span = FlowSpan::new(KIND, "exchange_authorization_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let slot = ResponseMetadataSlot::default();
				let http = TokenEndpointClient::new(Arc::clone(&self.transport), slot.clone());

				match self
					.client
					.exchange_code(AuthorizationCode::new(code.to_owned()))
					.request_async(&http)
					.await
				{
					Ok(response) => oauth::credential_from_response(&response, None),
					Err(e) => Err(oauth::map_request_error(KIND, slot.take(), e)),
				}
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Runs the client-credentials grant for the configured scopes.
	pub async fn client_credentials(&self) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::ClientCredentials;

		if self.config.client_secret().is_none() {
			return Err(ConfigError::MissingClientSecret { grant: "client_credentials" }.into());
		}

		let span = FlowSpan::new(KIND, "client_credentials");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let slot = ResponseMetadataSlot::default();
				let http = TokenEndpointClient::new(Arc::clone(&self.transport), slot.clone());
				let mut request = self.client.exchange_client_credentials();

				for scope in self.config.scopes().iter() {
					request = request.add_scope(OAuthScope::new(scope.to_owned()));
				}

				match request.request_async(&http).await {
					Ok(response) => oauth::credential_from_response(&response, None),
					Err(e) => Err(oauth::map_request_error(KIND, slot.take(), e)),
				}
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Exchanges `code` and stores the credential under `key`.
	pub async fn authorize<S>(&self, code: &str, store: &S, key: &CredentialKey) -> Result<Credential>
	where
		S: ?Sized + CredentialStore,
	{
		let credential = self.exchange_authorization_code(code).await?;

		store.store(key, credential.clone())?;

		Ok(credential)
	}
}
impl<T> Debug for TokenExchange<T>
where
	T: ?Sized + Transport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchange").field("config", &self.config).finish_non_exhaustive()
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
