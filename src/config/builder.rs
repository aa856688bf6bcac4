// self
use crate::{
	_prelude::*,
	auth::{ClientId, ScopeSet, TokenSecret},
	config::{
		AUTH_HOST, AUTHORIZE_PATH, DEFAULT_LOCALE, Environment, SessionConfiguration, TOKEN_PATH,
	},
	error::ConfigError,
};

/// Builder for [`SessionConfiguration`]; all validation happens in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct SessionConfigurationBuilder {
	client_id: String,
	client_secret: Option<String>,
	server_token: Option<String>,
	redirect_uri: Option<Url>,
	scopes: Vec<String>,
	locale: Option<String>,
	environment: Environment,
	api_host: Option<Url>,
	auth_host: Option<Url>,
}
impl SessionConfigurationBuilder {
	/// Creates a builder seeded with the provided client id.
	pub fn new(client_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			server_token: None,
			redirect_uri: None,
			scopes: Vec::new(),
			locale: None,
			environment: Environment::default(),
			api_host: None,
			auth_host: None,
		}
	}

	pub(crate) fn from_configuration(config: &SessionConfiguration) -> Self {
		Self {
			client_id: config.client_id.to_string(),
			client_secret: config.client_secret.as_ref().map(|s| s.expose().to_owned()),
			server_token: config.server_token.as_ref().map(|s| s.expose().to_owned()),
			redirect_uri: config.redirect_uri.clone(),
			scopes: config.scopes.as_slice().to_vec(),
			locale: Some(config.locale().to_owned()),
			environment: config.environment,
			api_host: config.api_host_overridden.then(|| config.api_host.clone()),
			auth_host: Some(config.auth_host.clone()),
		}
	}

	/// Sets the client secret (confidential clients only).
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Clears the client secret.
	pub fn without_client_secret(mut self) -> Self {
		self.client_secret = None;

		self
	}

	/// Sets the application server token.
	pub fn server_token(mut self, token: impl Into<String>) -> Self {
		self.server_token = Some(token.into());

		self
	}

	/// Clears the server token.
	pub fn without_server_token(mut self) -> Self {
		self.server_token = None;

		self
	}

	/// Sets the redirect URI used by the authorization-code flow.
	pub fn redirect_uri(mut self, uri: Url) -> Self {
		self.redirect_uri = Some(uri);

		self
	}

	/// Replaces the requested scopes.
	pub fn scopes<I, S>(mut self, scopes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scopes = scopes.into_iter().map(Into::into).collect();

		self
	}

	/// Overrides the `Accept-Language` locale.
	pub fn locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = Some(locale.into());

		self
	}

	/// Selects the API environment.
	pub fn environment(mut self, environment: Environment) -> Self {
		self.environment = environment;

		self
	}

	/// Overrides the API host regardless of environment.
	pub fn api_host(mut self, host: Url) -> Self {
		self.api_host = Some(host);

		self
	}

	/// Overrides the authorization server host.
	pub fn auth_host(mut self, host: Url) -> Self {
		self.auth_host = Some(host);

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<SessionConfiguration, ConfigError> {
		let client_id = ClientId::new(&self.client_id).map_err(ConfigError::InvalidClientId)?;
		let client_secret = non_empty_secret("client secret", self.client_secret)?;
		let server_token = non_empty_secret("server token", self.server_token)?;
		let scopes = ScopeSet::new(self.scopes)?;
		let locale_raw = self.locale.unwrap_or_else(|| DEFAULT_LOCALE.to_owned());

		if locale_raw.trim().is_empty() {
			return Err(ConfigError::EmptySecret { field: "locale" });
		}

		let locale = HeaderValue::from_str(&locale_raw)
			.map_err(|source| ConfigError::InvalidHeader { name: "Accept-Language", source })?;
		let api_host_overridden = self.api_host.is_some();
		let api_host = match self.api_host {
			Some(host) => host,
			None => Url::parse(self.environment.default_api_host())?,
		};
		let auth_host = match self.auth_host {
			Some(host) => host,
			None => Url::parse(AUTH_HOST)?,
		};

		validate_host("api", &api_host)?;
		validate_host("auth", &auth_host)?;

		if let Some(redirect) = self.redirect_uri.as_ref().filter(|uri| uri.cannot_be_a_base()) {
			return Err(ConfigError::InvalidHost { name: "redirect", url: redirect.to_string() });
		}

		let token_url = auth_host.join(TOKEN_PATH)?;
		let authorize_url = auth_host.join(AUTHORIZE_PATH)?;

		Ok(SessionConfiguration {
			client_id,
			client_secret,
			server_token,
			redirect_uri: self.redirect_uri,
			scopes,
			locale,
			environment: self.environment,
			api_host,
			api_host_overridden,
			auth_host,
			token_url,
			authorize_url,
		})
	}
}

fn non_empty_secret(
	field: &'static str,
	value: Option<String>,
) -> Result<Option<TokenSecret>, ConfigError> {
	match value {
		Some(value) if value.is_empty() => Err(ConfigError::EmptySecret { field }),
		Some(value) => Ok(Some(TokenSecret::new(value))),
		None => Ok(None),
	}
}

fn validate_host(name: &'static str, url: &Url) -> Result<(), ConfigError> {
	if matches!(url.scheme(), "http" | "https") && url.has_host() {
		Ok(())
	} else {
		Err(ConfigError::InvalidHost { name, url: url.to_string() })
	}
}
