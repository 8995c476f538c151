//! Common test utilities for btpay integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use btpay_gateway::mock::RecordingGateway;
use btpay_service::{create_router, AppState, ServiceConfig};

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The gateway behind the server, for inspecting calls.
    pub gateway: Arc<RecordingGateway>,
}

impl TestHarness {
    /// Harness with an empty gateway and default configuration.
    pub fn new() -> Self {
        Self::with_gateway(RecordingGateway::new())
    }

    /// Harness around a prepared gateway.
    pub fn with_gateway(gateway: RecordingGateway) -> Self {
        Self::build(gateway, test_config())
    }

    /// Harness with a prepared gateway and configuration.
    pub fn build(gateway: RecordingGateway, config: ServiceConfig) -> Self {
        let gateway = Arc::new(gateway);
        let state = AppState::new(gateway.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, gateway }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration used by the harness.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        merchant_id: Some("merchant".into()),
        public_key: Some("public".into()),
        private_key: Some("private".into()),
        ..ServiceConfig::default()
    }
}
