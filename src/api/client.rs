// self
use crate::{
	_prelude::*,
	api::{ApiCall, EnvironmentGate},
	authenticator::Authenticator,
	config::SessionConfiguration,
	error::{ApiFailure, AuthorizationFailure},
	http::{ApiRequest, ApiResponse, Transport},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	retry::{AuthenticationAttempt, RetryCoordinator, RetryDecision},
	signing::RequestSigningInterceptor,
};

/// Gate, sign, send, and repair authorization failures for one session.
pub struct ApiClient {
	config: SessionConfiguration,
	gate: EnvironmentGate,
	interceptor: RequestSigningInterceptor,
	coordinator: RetryCoordinator,
	transport: Arc<dyn Transport>,
}
impl ApiClient {
	/// Creates a client with the default retry ceiling.
	pub fn new(
		config: SessionConfiguration,
		authenticator: Arc<dyn Authenticator>,
		transport: Arc<dyn Transport>,
	) -> Self {
		Self {
			gate: EnvironmentGate::new(config.environment()),
			interceptor: RequestSigningInterceptor::new(&config, authenticator),
			coordinator: RetryCoordinator::default(),
			config,
			transport,
		}
	}

	/// Replaces the retry coordinator.
	pub fn with_coordinator(mut self, coordinator: RetryCoordinator) -> Self {
		self.coordinator = coordinator;

		self
	}

	/// Session configuration.
	pub fn config(&self) -> &SessionConfiguration {
		&self.config
	}

	/// Authenticator used for signing and refreshing.
	pub fn authenticator(&self) -> &Arc<dyn Authenticator> {
		self.interceptor.authenticator()
	}

	/// Runs the environment gate, builds the request, and signs it. Never touches the network.
	pub fn prepare(&self, call: &ApiCall) -> Result<ApiRequest> {
		self.gate.check(call.operation())?;

		let mut request = call.build(&self.config)?;

		self.interceptor.intercept(&mut request)?;

		Ok(request)
	}

	/// Sends a prepared request and applies the retry policy to 401/403 responses.
	///
	/// Returns the first 2xx response. A 401/403 the coordinator gives up on becomes
	/// [`Error::Authorization`] with that response attached; any other status becomes
	/// [`Error::Api`]. Transport failures are never retried.
	pub async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Dispatch;

		let span = FlowSpan::new(KIND, "dispatch");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.dispatch_inner(request)).await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// [`prepare`](Self::prepare) followed by [`dispatch`](Self::dispatch).
	pub async fn execute(&self, call: &ApiCall) -> Result<ApiResponse> {
		let request = self.prepare(call)?;

		self.dispatch(request).await
	}

	async fn dispatch_inner(&self, request: ApiRequest) -> Result<ApiResponse> {
		let mut response = self.transport.send(request).await?;

		loop {
			if response.is_success() {
				return Ok(response);
			}
			if !response.is_authorization_failure() {
				return Err(ApiFailure::from_response(&response).into());
			}

			let decision = {
				let attempt = AuthenticationAttempt::new(&response);

				self.coordinator.decide(self.authenticator().as_ref(), &attempt).await?
			};

			match decision {
				RetryDecision::Retry(retry) => {
					#[cfg(feature = "tracing")]
					tracing::debug!(
						url = %response.request.url,
						attempts = response.response_count(),
						"retrying re-signed request"
					);

					let next = self.transport.send(retry).await?;

					response = next.with_prior(response);
				},
				RetryDecision::GiveUp(reason) => {
					#[cfg(feature = "tracing")]
					tracing::debug!(
						url = %response.request.url,
						attempts = response.response_count(),
						%reason,
						"giving up on authorization failure"
					);

					return Err(AuthorizationFailure { reason, response: Box::new(response) }.into());
				},
			}
		}
	}
}
impl Debug for ApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("config", &self.config)
			.field("gate", &self.gate)
			.field("coordinator", &self.coordinator)
			.finish_non_exhaustive()
	}
}
