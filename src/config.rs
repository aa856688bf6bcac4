//! Immutable session configuration and its validating builder.

mod builder;

pub use builder::SessionConfigurationBuilder;

// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Locale sent in `Accept-Language` when none is configured.
pub const DEFAULT_LOCALE: &str = "en-US";
/// Production API host.
pub const PRODUCTION_API_HOST: &str = "https://api.uber.com";
/// Sandbox API host.
pub const SANDBOX_API_HOST: &str = "https://sandbox-api.uber.com";
/// Authorization server host.
pub const AUTH_HOST: &str = "https://login.uber.com";
/// Token endpoint path on the authorization server.
pub const TOKEN_PATH: &str = "/oauth/v2/token";
/// Authorization endpoint path on the authorization server.
pub const AUTHORIZE_PATH: &str = "/oauth/v2/authorize";

/// API environment a session talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
	/// Live environment; sandbox-only operations are rejected.
	#[default]
	Production,
	/// Sandbox environment for integration testing.
	Sandbox,
}
impl Environment {
	/// Default API host for the environment.
	pub const fn default_api_host(self) -> &'static str {
		match self {
			Environment::Production => PRODUCTION_API_HOST,
			Environment::Sandbox => SANDBOX_API_HOST,
		}
	}

	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			Environment::Production => "PRODUCTION",
			Environment::Sandbox => "SANDBOX",
		}
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Validated, immutable session settings.
///
/// Built once through [`SessionConfiguration::builder`]; use [`SessionConfiguration::derive`] to
/// obtain a modified copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfiguration {
	pub(crate) client_id: ClientId,
	pub(crate) client_secret: Option<TokenSecret>,
	pub(crate) server_token: Option<TokenSecret>,
	pub(crate) redirect_uri: Option<Url>,
	pub(crate) scopes: ScopeSet,
	pub(crate) locale: HeaderValue,
	pub(crate) environment: Environment,
	pub(crate) api_host: Url,
	pub(crate) api_host_overridden: bool,
	pub(crate) auth_host: Url,
	pub(crate) token_url: Url,
	pub(crate) authorize_url: Url,
}
impl SessionConfiguration {
	/// Starts a builder for the provided client id.
	pub fn builder(client_id: impl Into<String>) -> SessionConfigurationBuilder {
		SessionConfigurationBuilder::new(client_id)
	}

	/// Returns a builder pre-populated from this configuration. `self` is left untouched.
	pub fn derive(&self) -> SessionConfigurationBuilder {
		SessionConfigurationBuilder::from_configuration(self)
	}

	/// OAuth client identifier.
	pub fn client_id(&self) -> &ClientId {
		&self.client_id
	}

	/// Client secret, absent for public clients.
	pub fn client_secret(&self) -> Option<&TokenSecret> {
		self.client_secret.as_ref()
	}

	/// Application server token, if configured.
	pub fn server_token(&self) -> Option<&TokenSecret> {
		self.server_token.as_ref()
	}

	/// Redirect URI registered for the authorization-code flow.
	pub fn redirect_uri(&self) -> Option<&Url> {
		self.redirect_uri.as_ref()
	}

	/// Scopes requested during authorization.
	pub fn scopes(&self) -> &ScopeSet {
		&self.scopes
	}

	/// Locale string used for `Accept-Language`.
	pub fn locale(&self) -> &str {
		self.locale.to_str().unwrap_or(DEFAULT_LOCALE)
	}

	/// Pre-validated `Accept-Language` header value.
	pub fn locale_header(&self) -> &HeaderValue {
		&self.locale
	}

	/// Active environment.
	pub fn environment(&self) -> Environment {
		self.environment
	}

	/// API host requests are sent to.
	pub fn api_host(&self) -> &Url {
		&self.api_host
	}

	/// Authorization server host.
	pub fn auth_host(&self) -> &Url {
		&self.auth_host
	}

	/// Absolute token endpoint URL.
	pub fn token_url(&self) -> &Url {
		&self.token_url
	}

	/// Absolute authorization endpoint URL.
	pub fn authorize_url(&self) -> &Url {
		&self.authorize_url
	}

	/// Joins an API path onto the configured host.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		Ok(self.api_host.join(path)?)
	}
}
