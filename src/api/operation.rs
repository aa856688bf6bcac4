// self
use crate::{_prelude::*, config::Environment, error::ConfigError};

/// Every API endpoint this crate can dispatch, with its method, path template, and sandbox tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Products available at a location.
	GetProducts,
	/// One product by id.
	GetProduct,
	/// Price estimates between two points.
	GetPriceEstimates,
	/// Pickup time estimates at a location.
	GetTimeEstimates,
	/// Rider profile.
	GetUserProfile,
	/// Rider trip history.
	GetUserActivity,
	/// Rider payment methods.
	GetPaymentMethods,
	/// Saved place (home or work).
	GetPlace,
	/// Updates a saved place.
	UpdatePlace,
	/// Fare and pickup estimate for a prospective ride.
	EstimateRide,
	/// Requests a ride.
	RequestRide,
	/// Current ride of the rider.
	GetCurrentRide,
	/// One ride by id.
	GetRideDetails,
	/// Updates the destination of a ride.
	UpdateRide,
	/// Cancels a ride by id.
	CancelRide,
	/// Cancels the current ride.
	CancelCurrentRide,
	/// Map of a ride.
	GetRideMap,
	/// Receipt of a completed ride.
	GetRideReceipt,
	/// Forces a sandbox ride into a given status.
	UpdateSandboxRide,
	/// Sets sandbox surge and driver availability for a product.
	UpdateSandboxProduct,
}
impl Operation {
	/// HTTP method of the operation.
	pub fn method(self) -> Method {
		match self {
			Operation::GetProducts
			| Operation::GetProduct
			| Operation::GetPriceEstimates
			| Operation::GetTimeEstimates
			| Operation::GetUserProfile
			| Operation::GetUserActivity
			| Operation::GetPaymentMethods
			| Operation::GetPlace
			| Operation::GetCurrentRide
			| Operation::GetRideDetails
			| Operation::GetRideMap
			| Operation::GetRideReceipt => Method::GET,
			Operation::EstimateRide | Operation::RequestRide => Method::POST,
			Operation::UpdatePlace | Operation::UpdateSandboxRide | Operation::UpdateSandboxProduct =>
				Method::PUT,
			Operation::UpdateRide => Method::PATCH,
			Operation::CancelRide | Operation::CancelCurrentRide => Method::DELETE,
		}
	}

	/// Path template; `{name}` segments are filled in order from path parameters.
	pub const fn path_template(self) -> &'static str {
		match self {
			Operation::GetProducts => "/v1.2/products",
			Operation::GetProduct => "/v1.2/products/{product_id}",
			Operation::GetPriceEstimates => "/v1.2/estimates/price",
			Operation::GetTimeEstimates => "/v1.2/estimates/time",
			Operation::GetUserProfile => "/v1.2/me",
			Operation::GetUserActivity => "/v1.2/history",
			Operation::GetPaymentMethods => "/v1.2/payment-methods",
			Operation::GetPlace | Operation::UpdatePlace => "/v1.2/places/{place_id}",
			Operation::EstimateRide => "/v1.2/requests/estimate",
			Operation::RequestRide => "/v1.2/requests",
			Operation::GetCurrentRide | Operation::CancelCurrentRide => "/v1.2/requests/current",
			Operation::GetRideDetails | Operation::UpdateRide | Operation::CancelRide =>
				"/v1.2/requests/{request_id}",
			Operation::GetRideMap => "/v1.2/requests/{request_id}/map",
			Operation::GetRideReceipt => "/v1.2/requests/{request_id}/receipt",
			Operation::UpdateSandboxRide => "/v1.2/sandbox/requests/{request_id}",
			Operation::UpdateSandboxProduct => "/v1.2/sandbox/products/{product_id}",
		}
	}

	/// Number of `{name}` segments in the path template.
	pub fn path_parameter_count(self) -> usize {
		self.path_template().split('/').filter(|segment| segment.starts_with('{')).count()
	}

	/// Returns `true` for operations rejected in production.
	pub const fn is_sandbox_only(self) -> bool {
		matches!(self, Operation::UpdateSandboxRide | Operation::UpdateSandboxProduct)
	}

	/// Stable operation name used in errors and logs.
	pub const fn name(self) -> &'static str {
		match self {
			Operation::GetProducts => "get_products",
			Operation::GetProduct => "get_product",
			Operation::GetPriceEstimates => "get_price_estimates",
			Operation::GetTimeEstimates => "get_time_estimates",
			Operation::GetUserProfile => "get_user_profile",
			Operation::GetUserActivity => "get_user_activity",
			Operation::GetPaymentMethods => "get_payment_methods",
			Operation::GetPlace => "get_place",
			Operation::UpdatePlace => "update_place",
			Operation::EstimateRide => "estimate_ride",
			Operation::RequestRide => "request_ride",
			Operation::GetCurrentRide => "get_current_ride",
			Operation::GetRideDetails => "get_ride_details",
			Operation::UpdateRide => "update_ride",
			Operation::CancelRide => "cancel_ride",
			Operation::CancelCurrentRide => "cancel_current_ride",
			Operation::GetRideMap => "get_ride_map",
			Operation::GetRideReceipt => "get_ride_receipt",
			Operation::UpdateSandboxRide => "update_sandbox_ride",
			Operation::UpdateSandboxProduct => "update_sandbox_product",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.name())
	}
}

/// Rejects sandbox-only operations in production before any request is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvironmentGate {
	environment: Environment,
}
impl EnvironmentGate {
	/// Gate for the provided environment.
	pub fn new(environment: Environment) -> Self {
		Self { environment }
	}

	/// Environment the gate enforces.
	pub fn environment(&self) -> Environment {
		self.environment
	}

	/// Fails with [`ConfigError::SandboxOnly`] for sandbox-only operations in production.
	pub fn check(&self, operation: Operation) -> Result<(), ConfigError> {
		if operation.is_sandbox_only() && self.environment == Environment::Production {
			return Err(ConfigError::SandboxOnly { operation: operation.name() });
		}

		Ok(())
	}
}
