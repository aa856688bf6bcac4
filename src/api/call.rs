// self
use crate::{
	_prelude::*, api::Operation, config::SessionConfiguration, error::ConfigError,
	http::ApiRequest,
};

/// One invocation of an [`Operation`]: path parameters, query pairs, and an optional JSON body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiCall {
	operation: Operation,
	path_params: Vec<String>,
	query: Vec<(String, String)>,
	body: Option<Vec<u8>>,
}
impl ApiCall {
	/// Starts a call for `operation`.
	pub fn new(operation: Operation) -> Self {
		Self { operation, path_params: Vec::new(), query: Vec::new(), body: None }
	}

	/// Operation this call dispatches.
	pub fn operation(&self) -> Operation {
		self.operation
	}

	/// Appends the next path parameter. Values are percent-encoded as one segment.
	pub fn path_param(mut self, value: impl Into<String>) -> Self {
		self.path_params.push(value.into());

		self
	}

	/// Appends a query pair.
	pub fn query(mut self, name: impl Into<String>, value: impl Display) -> Self {
		self.query.push((name.into(), value.to_string()));

		self
	}

	/// Serializes `body` as the JSON request body.
	pub fn json<B>(mut self, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body).map_err(ConfigError::RequestBody)?);

		Ok(self)
	}

	/// Builds the unsigned request against the configuration's API host.
	pub fn build(&self, config: &SessionConfiguration) -> Result<ApiRequest, ConfigError> {
		let expected = self.operation.path_parameter_count();

		if expected != self.path_params.len() {
			return Err(ConfigError::PathParameters {
				operation: self.operation.name(),
				expected,
				actual: self.path_params.len(),
			});
		}

		let mut url = config.api_host().clone();

		{
			let mut segments = url.path_segments_mut().map_err(|_| ConfigError::InvalidHost {
				name: "api",
				url: config.api_host().to_string(),
			})?;
			let mut params = self.path_params.iter();

			// Keeps any base path of an overridden host.
			segments.pop_if_empty();

			for segment in self.operation.path_template().trim_start_matches('/').split('/') {
				let value = if segment.starts_with('{') { params.next() } else { None };

				segments.push(value.map_or(segment, String::as_str));
			}
		}

		if !self.query.is_empty() {
			url.query_pairs_mut().extend_pairs(self.query.iter());
		}

		let mut request = ApiRequest::new(self.operation.method(), url);

		if let Some(body) = &self.body {
			request.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
			request.body = body.clone();
		}

		Ok(request)
	}

	/// Products available at a location.
	pub fn products(latitude: f64, longitude: f64) -> Self {
		Self::new(Operation::GetProducts).query("latitude", latitude).query("longitude", longitude)
	}

	/// One product by id.
	pub fn product(product_id: impl Into<String>) -> Self {
		Self::new(Operation::GetProduct).path_param(product_id)
	}

	/// Price estimates between two points.
	pub fn price_estimates(start: (f64, f64), end: (f64, f64)) -> Self {
		Self::new(Operation::GetPriceEstimates)
			.query("start_latitude", start.0)
			.query("start_longitude", start.1)
			.query("end_latitude", end.0)
			.query("end_longitude", end.1)
	}

	/// Pickup time estimates at a location.
	pub fn time_estimates(latitude: f64, longitude: f64) -> Self {
		Self::new(Operation::GetTimeEstimates)
			.query("start_latitude", latitude)
			.query("start_longitude", longitude)
	}

	/// Rider profile.
	pub fn user_profile() -> Self {
		Self::new(Operation::GetUserProfile)
	}

	/// Rider trip history page.
	pub fn user_activity(offset: u32, limit: u32) -> Self {
		Self::new(Operation::GetUserActivity).query("offset", offset).query("limit", limit)
	}

	/// Rider payment methods.
	pub fn payment_methods() -> Self {
		Self::new(Operation::GetPaymentMethods)
	}

	/// Saved place (`home` or `work`).
	pub fn place(place_id: impl Into<String>) -> Self {
		Self::new(Operation::GetPlace).path_param(place_id)
	}

	/// Updates the address of a saved place.
	pub fn update_place(place_id: impl Into<String>, address: &str) -> Result<Self, ConfigError> {
		Self::new(Operation::UpdatePlace)
			.path_param(place_id)
			.json(&serde_json::json!({ "address": address }))
	}

	/// Fare estimate for a prospective ride.
	pub fn estimate_ride<B>(body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		Self::new(Operation::EstimateRide).json(body)
	}

	/// Requests a ride.
	pub fn request_ride<B>(body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		Self::new(Operation::RequestRide).json(body)
	}

	/// Current ride.
	pub fn current_ride() -> Self {
		Self::new(Operation::GetCurrentRide)
	}

	/// One ride by id.
	pub fn ride_details(request_id: impl Into<String>) -> Self {
		Self::new(Operation::GetRideDetails).path_param(request_id)
	}

	/// Updates a ride.
	pub fn update_ride<B>(request_id: impl Into<String>, body: &B) -> Result<Self, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		Self::new(Operation::UpdateRide).path_param(request_id).json(body)
	}

	/// Cancels a ride by id.
	pub fn cancel_ride(request_id: impl Into<String>) -> Self {
		Self::new(Operation::CancelRide).path_param(request_id)
	}

	/// Cancels the current ride.
	pub fn cancel_current_ride() -> Self {
		Self::new(Operation::CancelCurrentRide)
	}

	/// Map of a ride.
	pub fn ride_map(request_id: impl Into<String>) -> Self {
		Self::new(Operation::GetRideMap).path_param(request_id)
	}

	/// Receipt of a ride.
	pub fn ride_receipt(request_id: impl Into<String>) -> Self {
		Self::new(Operation::GetRideReceipt).path_param(request_id)
	}

	/// Forces a sandbox ride into `status` (for example `accepted` or `completed`).
	pub fn update_sandbox_ride(
		request_id: impl Into<String>,
		status: &str,
	) -> Result<Self, ConfigError> {
		Self::new(Operation::UpdateSandboxRide)
			.path_param(request_id)
			.json(&serde_json::json!({ "status": status }))
	}

	/// Sets sandbox surge and driver availability for a product.
	pub fn update_sandbox_product(
		product_id: impl Into<String>,
		surge_multiplier: Option<f64>,
		drivers_available: Option<bool>,
	) -> Result<Self, ConfigError> {
		let mut body = serde_json::Map::new();

		if let Some(surge) = surge_multiplier {
			body.insert("surge_multiplier".into(), surge.into());
		}
		if let Some(available) = drivers_available {
			body.insert("drivers_available".into(), available.into());
		}

		Self::new(Operation::UpdateSandboxProduct).path_param(product_id).json(&body)
	}
}
