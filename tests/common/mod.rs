//! Shared fixtures: an in-process token endpoint + API double and credential helpers.

#![allow(dead_code)]

// std
use std::{
	sync::{
		Arc, Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use time::Duration;
// self
use rides_auth::{
	auth::{Credential, CredentialKey},
	config::{Environment, SessionConfiguration},
	error::TransportError,
	http::{ApiRequest, ApiResponse, Transport, TransportFuture},
	oauth::oauth2::http::{HeaderMap, HeaderValue, StatusCode, header},
	retry::MISSING_SCOPES_HEADER,
	store::MemoryStore,
};

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";
pub const TOKEN_PATH: &str = "/oauth/v2/token";

/// Token endpoint and API in one `Transport`.
///
/// API calls succeed only when signed with the currently accepted `Authorization` value. Every
/// successful refresh issues `accessToken{n + 1}` and makes `Bearer accessToken{n + 1}` the
/// accepted value.
#[derive(Default)]
pub struct ScriptedTransport {
	accepted: Mutex<Option<String>>,
	token_calls: AtomicUsize,
	api_calls: AtomicUsize,
	token_bodies: Mutex<Vec<String>>,
	token_delay: Option<StdDuration>,
	token_failure: Option<(u16, &'static str)>,
	token_timeout: bool,
	missing_scopes: bool,
	always_unauthorized: bool,
	network_down: AtomicBool,
}
impl ScriptedTransport {
	pub fn accepting(value: &str) -> Self {
		Self { accepted: Mutex::new(Some(value.to_owned())), ..Default::default() }
	}

	pub fn rejecting_everything() -> Self {
		Self { always_unauthorized: true, ..Default::default() }
	}

	pub fn with_token_delay(mut self, delay: StdDuration) -> Self {
		self.token_delay = Some(delay);

		self
	}

	pub fn with_token_failure(mut self, status: u16, body: &'static str) -> Self {
		self.token_failure = Some((status, body));

		self
	}

	pub fn with_token_timeout(mut self) -> Self {
		self.token_timeout = true;

		self
	}

	pub fn with_missing_scopes(mut self) -> Self {
		self.missing_scopes = true;

		self
	}

	pub fn go_offline(&self) {
		self.network_down.store(true, Ordering::SeqCst);
	}

	pub fn token_calls(&self) -> usize {
		self.token_calls.load(Ordering::SeqCst)
	}

	pub fn api_calls(&self) -> usize {
		self.api_calls.load(Ordering::SeqCst)
	}

	pub fn token_bodies(&self) -> Vec<String> {
		self.token_bodies.lock().expect("Token body log should not be poisoned.").clone()
	}

	async fn token(&self, request: ApiRequest) -> ApiResponse {
		let call = self.token_calls.fetch_add(1, Ordering::SeqCst) + 1;

		self.token_bodies
			.lock()
			.expect("Token body log should not be poisoned.")
			.push(String::from_utf8_lossy(&request.body).into_owned());

		if let Some(delay) = self.token_delay {
			tokio::time::sleep(delay).await;
		}
		if let Some((status, body)) = self.token_failure {
			return json_response(status, body.as_bytes().to_vec(), request);
		}

		let access = format!("accessToken{}", call + 1);
		let body = format!(
			"{{\"access_token\":\"{access}\",\"refresh_token\":\"refreshToken{}\",\"token_type\":\"Bearer\",\"expires_in\":2592000,\"scope\":\"profile request\"}}",
			call + 1
		);

		*self.accepted.lock().expect("Accepted header should not be poisoned.") = Some(format!("Bearer {access}"));

		json_response(200, body.into_bytes(), request)
	}

	fn api(&self, request: ApiRequest) -> ApiResponse {
		self.api_calls.fetch_add(1, Ordering::SeqCst);

		if request.url.path().contains("/missing") {
			return json_response(404, br#"{"code":"not_found","message":"Resource not found."}"#.to_vec(), request);
		}

		let signed = request.authorization().and_then(|value| value.to_str().ok()).map(str::to_owned);
		let accepted = self.accepted.lock().expect("Accepted header should not be poisoned.").clone();

		if !self.always_unauthorized && signed.is_some() && signed == accepted {
			return json_response(200, br#"{"ok":true}"#.to_vec(), request);
		}

		let mut response = json_response(
			401,
			br#"{"errors":[{"status":401,"code":"unauthorized","title":"Invalid OAuth 2.0 credentials provided."}]}"#
				.to_vec(),
			request,
		);

		if self.missing_scopes {
			response.headers.insert(MISSING_SCOPES_HEADER, HeaderValue::from_static("request"));
		}

		response
	}
}
impl Transport for ScriptedTransport {
	fn send(&self, request: ApiRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			if self.network_down.load(Ordering::SeqCst) {
				return Err(TransportError::network(std::io::Error::new(
					std::io::ErrorKind::ConnectionReset,
					"connection reset by peer",
				)));
			}
			if request.url.path() == TOKEN_PATH && self.token_timeout {
				self.token_calls.fetch_add(1, Ordering::SeqCst);

				return Err(TransportError::timeout(std::io::Error::new(
					std::io::ErrorKind::TimedOut,
					"token endpoint timed out",
				)));
			}
			if request.url.path() == TOKEN_PATH {
				Ok(self.token(request).await)
			} else {
				Ok(self.api(request))
			}
		})
	}
}

fn json_response(status: u16, body: Vec<u8>, request: ApiRequest) -> ApiResponse {
	let mut headers = HeaderMap::new();

	headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

	ApiResponse::new(
		StatusCode::from_u16(status).expect("Scripted status should be valid."),
		headers,
		body,
		request,
	)
}

pub fn key() -> CredentialKey {
	CredentialKey::new("rider-1").expect("Credential key fixture should be valid.")
}

pub fn configuration(environment: Environment) -> SessionConfiguration {
	SessionConfiguration::builder(CLIENT_ID)
		.client_secret(CLIENT_SECRET)
		.scopes(["profile", "request"])
		.environment(environment)
		.build()
		.expect("Configuration fixture should build.")
}

pub fn credential(access: &str, expires_in: Duration) -> Credential {
	Credential::builder()
		.access_token(access)
		.refresh_token("refreshToken")
		.expires_in(expires_in)
		.build()
		.expect("Credential fixture should build.")
}

pub fn store_with(access: &str, expires_in: Duration) -> Arc<MemoryStore> {
	Arc::new(MemoryStore::with_credential(key(), credential(access, expires_in)))
}

/// Reqwest transport that trusts the self-signed certificates served by `httpmock`.
#[cfg(feature = "reqwest")]
pub fn insecure_transport(timeout: Option<StdDuration>) -> rides_auth::http::ReqwestTransport {
	let mut builder = rides_auth::reqwest::Client::builder()
		.danger_accept_invalid_certs(true)
		.danger_accept_invalid_hostnames(true)
		.redirect(rides_auth::reqwest::redirect::Policy::none());

	if let Some(timeout) = timeout {
		builder = builder.connect_timeout(timeout).timeout(timeout);
	}

	rides_auth::http::ReqwestTransport::with_client(
		builder.build().expect("Failed to build insecure Reqwest client for tests."),
	)
}
