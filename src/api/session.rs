// crates.io
use tokio::runtime::Handle;
// self
use crate::{
	_prelude::*,
	api::{ApiClient, BlockingRidesService, CallbackRidesService, RidesService},
	auth::CredentialKey,
	authenticator::{Authenticator, OAuth2Authenticator, ServerTokenAuthenticator},
	config::SessionConfiguration,
	error::ConfigError,
	flows::OAuthTokenRefresher,
	http::Transport,
	store::CredentialStore,
};

/// One authenticated session: configuration, authenticator, and transport behind an [`ApiClient`].
///
/// A session authenticates with exactly one of an OAuth credential or a server token.
#[derive(Clone, Debug)]
pub struct Session {
	client: Arc<ApiClient>,
	oauth: Option<Arc<OAuth2Authenticator>>,
}
impl Session {
	/// Session signed with the configuration's server token.
	pub fn with_server_token(
		config: SessionConfiguration,
		transport: Arc<dyn Transport>,
	) -> Result<Self> {
		let token = config.server_token().ok_or(ConfigError::MissingAuthentication)?;
		let authenticator = ServerTokenAuthenticator::new(token)?;

		Ok(Self { client: Arc::new(ApiClient::new(config, Arc::new(authenticator), transport)), oauth: None })
	}

	/// Session signed with the OAuth credential stored under `key`.
	///
	/// Fails when the configuration also carries a server token, or when no credential is stored.
	pub fn with_credentials(
		config: SessionConfiguration,
		store: Arc<dyn CredentialStore>,
		key: CredentialKey,
		transport: Arc<dyn Transport>,
	) -> Result<Self> {
		if config.server_token().is_some() {
			return Err(ConfigError::AmbiguousAuthentication.into());
		}
		if store.load(&key)?.is_none() {
			return Err(ConfigError::MissingCredential { key: key.to_string() }.into());
		}

		let refresher = OAuthTokenRefresher::<dyn Transport>::new(&config, Arc::clone(&transport))?;
		let authenticator = Arc::new(OAuth2Authenticator::new(store, key, Arc::new(refresher)));
		let client = ApiClient::new(config, authenticator.clone(), transport);

		Ok(Self { client: Arc::new(client), oauth: Some(authenticator) })
	}

	/// Session backed by a caller-supplied authenticator.
	pub fn with_authenticator(
		config: SessionConfiguration,
		authenticator: Arc<dyn Authenticator>,
		transport: Arc<dyn Transport>,
	) -> Self {
		Self { client: Arc::new(ApiClient::new(config, authenticator, transport)), oauth: None }
	}

	/// Shared dispatch pipeline.
	pub fn client(&self) -> &Arc<ApiClient> {
		&self.client
	}

	/// Session configuration.
	pub fn config(&self) -> &SessionConfiguration {
		self.client.config()
	}

	/// OAuth authenticator, when the session was built from stored credentials.
	pub fn oauth_authenticator(&self) -> Option<&Arc<OAuth2Authenticator>> {
		self.oauth.as_ref()
	}

	/// Refreshes the stored credential when it is about to expire.
	///
	/// Always `Ok(false)` for sessions without an OAuth credential.
	pub async fn refresh_credential_if_needed(&self) -> Result<bool> {
		match &self.oauth {
			Some(authenticator) => authenticator.refresh_credential_if_needed().await,
			None => Ok(false),
		}
	}

	/// Async facade.
	pub fn rides_service(&self) -> RidesService {
		RidesService::new(Arc::clone(&self.client))
	}

	/// Callback facade running on `handle`.
	pub fn callback_service(&self, handle: Handle) -> CallbackRidesService {
		CallbackRidesService::new(Arc::clone(&self.client), handle)
	}

	/// Blocking facade driven by `handle`.
	pub fn blocking_service(&self, handle: Handle) -> BlockingRidesService {
		BlockingRidesService::new(Arc::clone(&self.client), handle)
	}
}
