mod common;

// std
use std::sync::{Arc, mpsc};
// crates.io
use time::Duration;
use tokio::runtime::{Builder, Handle};
// self
use common::ScriptedTransport;
use rides_auth::{
	api::{ApiCall, Operation, Session},
	config::Environment,
	error::{ConfigError, Error, ErrorKind},
};

fn session(transport: &Arc<ScriptedTransport>, environment: Environment) -> Session {
	Session::with_credentials(
		common::configuration(environment),
		common::store_with("accessToken", Duration::days(30)),
		common::key(),
		transport.clone(),
	)
	.expect("OAuth session should build.")
}

fn assert_sandbox_only(result: Result<impl std::fmt::Debug, Error>, operation: Operation) {
	let err = result.expect_err("Sandbox-only operation must be rejected in production.");

	assert_eq!(err.kind(), ErrorKind::Configuration);
	assert!(
		matches!(err, Error::Config(ConfigError::SandboxOnly { operation: rejected }) if rejected == operation.name()),
		"Unexpected error: {err:?}.",
	);
}

#[tokio::test]
async fn async_facade_blocks_sandbox_operations_in_production() {
	let transport = Arc::new(ScriptedTransport::accepting("Bearer accessToken"));
	let service = session(&transport, Environment::Production).rides_service();

	assert_sandbox_only(
		service.update_sandbox_ride("ride-1", "accepted").await,
		Operation::UpdateSandboxRide,
	);
	assert_sandbox_only(
		service.update_sandbox_product("product-1", Some(2.0), None).await,
		Operation::UpdateSandboxProduct,
	);
	assert_eq!(transport.api_calls(), 0, "Gated calls never reach the network.");

	service.user_profile().await.expect("Regular operations still work in production.");

	assert_eq!(transport.api_calls(), 1);
}

#[tokio::test]
async fn callback_facade_rejects_before_spawning() {
	let transport = Arc::new(ScriptedTransport::accepting("Bearer accessToken"));
	let service = session(&transport, Environment::Production).callback_service(Handle::current());
	let (tx, rx) = mpsc::channel::<()>();
	let result = service.update_sandbox_ride("ride-1", "accepted", move |_| {
		let _ = tx.send(());
	});

	assert_sandbox_only(result, Operation::UpdateSandboxRide);
	assert!(rx.try_recv().is_err(), "Callback must not run for a gated call.");
	assert_eq!(transport.api_calls(), 0);
}

#[tokio::test]
async fn callback_facade_delivers_sandbox_results() {
	let transport = Arc::new(ScriptedTransport::accepting("Bearer accessToken"));
	let service = session(&transport, Environment::Sandbox).callback_service(Handle::current());
	let (tx, rx) = mpsc::channel();
	let handle = service
		.update_sandbox_product("product-1", None, Some(false), move |result| {
			let _ = tx.send(result.map(|response| response.request.url.to_string()));
		})
		.expect("Sandbox call should be accepted.");

	handle.await.expect("Callback task should not panic.");

	let url = rx
		.recv()
		.expect("Callback should have run.")
		.expect("Sandbox call should succeed.");

	assert_eq!(url, "https://sandbox-api.uber.com/v1.2/sandbox/products/product-1");
}

#[test]
fn blocking_facade_blocks_sandbox_operations_in_production() {
	let runtime = Builder::new_multi_thread()
		.worker_threads(2)
		.enable_all()
		.build()
		.expect("Runtime should build.");
	let transport = Arc::new(ScriptedTransport::accepting("Bearer accessToken"));
	let service = session(&transport, Environment::Production).blocking_service(runtime.handle().clone());

	assert_sandbox_only(
		service.update_sandbox_ride("ride-1", "accepted"),
		Operation::UpdateSandboxRide,
	);
	assert_sandbox_only(
		service.call(ApiCall::update_sandbox_product("product-1", Some(1.5), Some(true)).expect("Body should encode.")),
		Operation::UpdateSandboxProduct,
	);
	assert_eq!(transport.api_calls(), 0);

	let response = service.user_profile().expect("Blocking call should succeed.");

	assert_eq!(response.request.url.as_str(), "https://api.uber.com/v1.2/me");
	assert_eq!(transport.api_calls(), 1);
}
