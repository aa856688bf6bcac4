//! Policy for 401/403 responses: give up, re-sign, or refresh then re-sign.

// self
use crate::{
	_prelude::*,
	authenticator::Authenticator,
	http::{ApiRequest, ApiResponse},
};

/// Maximum number of responses in one logical call's chain.
pub const MAX_ATTEMPTS: usize = 3;
/// Response header that marks a non-refreshable authorization failure.
pub const MISSING_SCOPES_HEADER: &str = "x-uber-missing-scopes";

/// One authorization failure under evaluation. Never persisted.
#[derive(Clone, Copy, Debug)]
pub struct AuthenticationAttempt<'a> {
	response: &'a ApiResponse,
}
impl<'a> AuthenticationAttempt<'a> {
	/// Wraps a failed response.
	pub fn new(response: &'a ApiResponse) -> Self {
		Self { response }
	}

	/// The failed response.
	pub fn response(&self) -> &'a ApiResponse {
		self.response
	}

	/// The request that was rejected, exactly as sent.
	pub fn request(&self) -> &'a ApiRequest {
		&self.response.request
	}

	/// `Authorization` value the rejected request was signed with.
	pub fn signed_with(&self) -> Option<&'a HeaderValue> {
		self.response.request.authorization()
	}

	/// Responses in the chain, this one included.
	pub fn response_count(&self) -> usize {
		self.response.response_count()
	}

	/// Scopes named by the missing-scopes header, or `None` when the header is absent.
	pub fn missing_scopes(&self) -> Option<Vec<String>> {
		let value = self.response.headers.get(MISSING_SCOPES_HEADER)?;
		let scopes = String::from_utf8_lossy(value.as_bytes())
			.split(|c: char| c == ',' || c.is_whitespace())
			.filter(|scope| !scope.is_empty())
			.map(str::to_owned)
			.collect();

		Some(scopes)
	}
}

/// Why the coordinator stopped retrying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthorizationFailureReason {
	/// The server reported missing scopes; a refresh cannot add them.
	MissingScopes(Vec<String>),
	/// The chain reached [`MAX_ATTEMPTS`].
	AttemptsExhausted {
		/// Responses in the chain.
		attempts: usize,
	},
	/// The authenticator has nothing to refresh with.
	NotRefreshable,
}
impl Display for AuthorizationFailureReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::MissingScopes(scopes) if scopes.is_empty() => f.write_str("missing scopes"),
			Self::MissingScopes(scopes) => write!(f, "missing scopes {}", scopes.join(", ")),
			Self::AttemptsExhausted { attempts } => write!(f, "gave up after {attempts} attempts"),
			Self::NotRefreshable => f.write_str("credential cannot be refreshed"),
		}
	}
}

/// Outcome of [`RetryCoordinator::decide`].
#[derive(Clone, Debug)]
pub enum RetryDecision {
	/// Send this re-signed request.
	Retry(ApiRequest),
	/// Surface the failed response to the caller.
	GiveUp(AuthorizationFailureReason),
}

/// Applies the retry policy to authorization failures.
///
/// The check order is fixed: missing scopes, then the ceiling, then the authenticator. The
/// authenticator serializes concurrent callers, so the coordinator itself holds no state.
#[derive(Clone, Copy, Debug)]
pub struct RetryCoordinator {
	max_attempts: usize,
}
impl RetryCoordinator {
	/// Coordinator with a custom ceiling (clamped to at least one attempt).
	pub fn with_max_attempts(max_attempts: usize) -> Self {
		Self { max_attempts: max_attempts.max(1) }
	}

	/// Configured ceiling.
	pub fn max_attempts(&self) -> usize {
		self.max_attempts
	}

	/// Decides what to do with one failed response.
	///
	/// Refresh failures propagate as errors; they are never turned into a retry.
	pub async fn decide<A>(
		&self,
		authenticator: &A,
		attempt: &AuthenticationAttempt<'_>,
	) -> Result<RetryDecision>
	where
		A: ?Sized + Authenticator,
	{
		if let Some(scopes) = attempt.missing_scopes() {
			return Ok(RetryDecision::GiveUp(AuthorizationFailureReason::MissingScopes(scopes)));
		}

		let attempts = attempt.response_count();

		if attempts >= self.max_attempts {
			return Ok(RetryDecision::GiveUp(AuthorizationFailureReason::AttemptsExhausted {
				attempts,
			}));
		}

		Ok(match authenticator.refresh(attempt).await? {
			Some(request) => RetryDecision::Retry(request),
			None => RetryDecision::GiveUp(AuthorizationFailureReason::NotRefreshable),
		})
	}
}
impl Default for RetryCoordinator {
	fn default() -> Self {
		Self { max_attempts: MAX_ATTEMPTS }
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::authenticator::AuthFuture;

	#[derive(Default)]
	struct AlwaysRefreshes {
		calls: AtomicUsize,
	}
	impl Authenticator for AlwaysRefreshes {
		fn authorization_header(&self) -> Result<HeaderValue> {
			Ok(HeaderValue::from_static("Bearer current"))
		}

		fn is_refreshable(&self) -> bool {
			true
		}

		fn refresh<'a>(
			&'a self,
			attempt: &'a AuthenticationAttempt<'a>,
		) -> AuthFuture<'a, Option<ApiRequest>> {
			Box::pin(async move {
				self.calls.fetch_add(1, Ordering::SeqCst);

				let mut request = attempt.request().clone();

				self.sign(&mut request)?;

				Ok(Some(request))
			})
		}
	}

	fn failure(headers: HeaderMap) -> ApiResponse {
		ApiResponse::new(
			StatusCode::UNAUTHORIZED,
			headers,
			Vec::new(),
			ApiRequest::new(
				Method::GET,
				Url::parse("https://api.uber.com/v1.2/me").expect("Fixture URL should parse."),
			),
		)
	}

	fn chain(length: usize) -> ApiResponse {
		(1..length).fold(failure(HeaderMap::new()), |prior, _| failure(HeaderMap::new()).with_prior(prior))
	}

	#[tokio::test]
	async fn missing_scopes_never_refresh() {
		let authenticator = AlwaysRefreshes::default();
		let mut headers = HeaderMap::new();

		headers.insert(HeaderName::from_static(MISSING_SCOPES_HEADER), HeaderValue::from_static("request, places"));

		let response = failure(headers);
		let decision = RetryCoordinator::default()
			.decide(&authenticator, &AuthenticationAttempt::new(&response))
			.await
			.expect("Decision should succeed.");

		assert!(matches!(
			decision,
			RetryDecision::GiveUp(AuthorizationFailureReason::MissingScopes(ref scopes))
				if scopes == &["request".to_owned(), "places".to_owned()]
		));
		assert_eq!(authenticator.calls.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn ceiling_stops_at_three_responses() {
		let authenticator = AlwaysRefreshes::default();
		let coordinator = RetryCoordinator::default();

		for length in 1..MAX_ATTEMPTS {
			let response = chain(length);
			let decision = coordinator
				.decide(&authenticator, &AuthenticationAttempt::new(&response))
				.await
				.expect("Decision should succeed.");

			assert!(matches!(decision, RetryDecision::Retry(_)), "Chain of {length} should retry.");
		}
		for length in MAX_ATTEMPTS..MAX_ATTEMPTS + 3 {
			let response = chain(length);
			let decision = coordinator
				.decide(&authenticator, &AuthenticationAttempt::new(&response))
				.await
				.expect("Decision should succeed.");

			assert!(matches!(
				decision,
				RetryDecision::GiveUp(AuthorizationFailureReason::AttemptsExhausted { attempts }) if attempts == length
			));
		}

		assert_eq!(authenticator.calls.load(Ordering::SeqCst), MAX_ATTEMPTS - 1);
	}

	#[test]
	fn attempt_exposes_signature() {
		let mut response = failure(HeaderMap::new());

		response.request.set_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer stale"));

		let attempt = AuthenticationAttempt::new(&response);

		assert_eq!(attempt.signed_with(), Some(&HeaderValue::from_static("Bearer stale")));
		assert_eq!(attempt.response_count(), 1);
		assert!(attempt.missing_scopes().is_none());
		assert_eq!(RetryCoordinator::with_max_attempts(0).max_attempts(), 1);
	}
}
