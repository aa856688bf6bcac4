//! Three call styles over one operation registry. Each one gates through
//! [`ApiClient::prepare`] before anything is spawned, awaited, or blocked on.

// crates.io
use tokio::{runtime::Handle, task::JoinHandle};
// self
use crate::{
	_prelude::*,
	api::{ApiCall, ApiClient},
	http::ApiResponse,
};

/// Async call style.
#[derive(Clone, Debug)]
pub struct RidesService {
	client: Arc<ApiClient>,
}
impl RidesService {
	/// Wraps a shared client.
	pub fn new(client: Arc<ApiClient>) -> Self {
		Self { client }
	}

	/// Dispatches any call.
	pub async fn call(&self, call: ApiCall) -> Result<ApiResponse> {
		let request = self.client.prepare(&call)?;

		self.client.dispatch(request).await
	}

	/// Rider profile.
	pub async fn user_profile(&self) -> Result<ApiResponse> {
		self.call(ApiCall::user_profile()).await
	}

	/// Products available at a location.
	pub async fn products(&self, latitude: f64, longitude: f64) -> Result<ApiResponse> {
		self.call(ApiCall::products(latitude, longitude)).await
	}

	/// Forces a sandbox ride into `status`. Rejected in production.
	pub async fn update_sandbox_ride(&self, request_id: &str, status: &str) -> Result<ApiResponse> {
		self.call(ApiCall::update_sandbox_ride(request_id, status)?).await
	}

	/// Sets sandbox product state. Rejected in production.
	pub async fn update_sandbox_product(
		&self,
		product_id: &str,
		surge_multiplier: Option<f64>,
		drivers_available: Option<bool>,
	) -> Result<ApiResponse> {
		self.call(ApiCall::update_sandbox_product(product_id, surge_multiplier, drivers_available)?)
			.await
	}
}

/// Callback call style: the gate runs on the caller's thread, the dispatch on `handle`.
#[derive(Clone, Debug)]
pub struct CallbackRidesService {
	client: Arc<ApiClient>,
	handle: Handle,
}
impl CallbackRidesService {
	/// Wraps a shared client and the runtime that drives callbacks.
	pub fn new(client: Arc<ApiClient>, handle: Handle) -> Self {
		Self { client, handle }
	}

	/// Dispatches `call` and invokes `callback` with the outcome.
	///
	/// Gate and signing failures are returned immediately and the callback is never invoked.
	pub fn call<F>(&self, call: ApiCall, callback: F) -> Result<JoinHandle<()>>
	where
		F: 'static + Send + FnOnce(Result<ApiResponse>),
	{
		let request = self.client.prepare(&call)?;
		let client = Arc::clone(&self.client);

		Ok(self.handle.spawn(async move { callback(client.dispatch(request).await) }))
	}

	/// Rider profile.
	pub fn user_profile<F>(&self, callback: F) -> Result<JoinHandle<()>>
	where
		F: 'static + Send + FnOnce(Result<ApiResponse>),
	{
		self.call(ApiCall::user_profile(), callback)
	}

	/// Forces a sandbox ride into `status`. Rejected in production.
	pub fn update_sandbox_ride<F>(
		&self,
		request_id: &str,
		status: &str,
		callback: F,
	) -> Result<JoinHandle<()>>
	where
		F: 'static + Send + FnOnce(Result<ApiResponse>),
	{
		self.call(ApiCall::update_sandbox_ride(request_id, status)?, callback)
	}

	/// Sets sandbox product state. Rejected in production.
	pub fn update_sandbox_product<F>(
		&self,
		product_id: &str,
		surge_multiplier: Option<f64>,
		drivers_available: Option<bool>,
		callback: F,
	) -> Result<JoinHandle<()>>
	where
		F: 'static + Send + FnOnce(Result<ApiResponse>),
	{
		self.call(
			ApiCall::update_sandbox_product(product_id, surge_multiplier, drivers_available)?,
			callback,
		)
	}
}

/// Blocking call style. Must not be used from inside an async context.
#[derive(Clone, Debug)]
pub struct BlockingRidesService {
	client: Arc<ApiClient>,
	handle: Handle,
}
impl BlockingRidesService {
	/// Wraps a shared client and the runtime used to block on dispatches.
	pub fn new(client: Arc<ApiClient>, handle: Handle) -> Self {
		Self { client, handle }
	}

	/// Dispatches any call and blocks until it completes.
	pub fn call(&self, call: ApiCall) -> Result<ApiResponse> {
		let request = self.client.prepare(&call)?;

		self.handle.block_on(self.client.dispatch(request))
	}

	/// Rider profile.
	pub fn user_profile(&self) -> Result<ApiResponse> {
		self.call(ApiCall::user_profile())
	}

	/// Forces a sandbox ride into `status`. Rejected in production.
	pub fn update_sandbox_ride(&self, request_id: &str, status: &str) -> Result<ApiResponse> {
		self.call(ApiCall::update_sandbox_ride(request_id, status)?)
	}

	/// Sets sandbox product state. Rejected in production.
	pub fn update_sandbox_product(
		&self,
		product_id: &str,
		surge_multiplier: Option<f64>,
		drivers_available: Option<bool>,
	) -> Result<ApiResponse> {
		self.call(ApiCall::update_sandbox_product(product_id, surge_multiplier, drivers_available)?)
	}
}
