//! Braintree client tests against a mock HTTP server.

use serde_json::json;
use wiremock::{
    matchers::{basic_auth, body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use btpay_core::{
    Amount, ClientTokenRequest, CreditCard, CustomField, CustomerRequest, CustomerSearch,
    PaymentMethodRequest, PaymentSource, SubscriptionRequest, TransactionRequest,
};
use btpay_gateway::{
    BraintreeClient, BraintreeCredentials, ClientOptions, Environment, GatewayError,
    PaymentGateway, DEFAULT_API_VERSION,
};

fn client_for(server: &MockServer) -> BraintreeClient {
    BraintreeClient::with_options(
        Environment::Sandbox,
        BraintreeCredentials::new("merchant", "public_key", "private_key"),
        ClientOptions::with_endpoint(format!("{}/graphql", server.uri())),
    )
    .unwrap()
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": data }))
}

// ============================================================================
// Client tokens
// ============================================================================

#[tokio::test]
async fn generic_client_token_sends_auth_and_version() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(basic_auth("public_key", "private_key"))
        .and(header("Braintree-Version", DEFAULT_API_VERSION))
        .and(body_partial_json(json!({
            "operationName": "CreateClientToken",
            "variables": {}
        })))
        .respond_with(ok(json!({ "result": { "clientToken": "generic-token" } })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client_for(&server)
        .generate_client_token(&ClientTokenRequest::default())
        .await
        .unwrap();

    assert_eq!(token, "generic-token");
}

#[tokio::test]
async fn scoped_client_token_carries_customer_and_merchant() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "input": { "clientToken": {
                "customerId": "cust_1",
                "merchantAccountId": "usd_account"
            } } }
        })))
        .respond_with(ok(json!({ "result": { "clientToken": "scoped-token" } })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ClientTokenRequest {
        customer_id: Some("cust_1".parse().unwrap()),
        merchant_account_id: Some("usd_account".parse().unwrap()),
    };
    let token = client_for(&server)
        .generate_client_token(&request)
        .await
        .unwrap();

    assert_eq!(token, "scoped-token");
}

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
async fn search_customers_by_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "SearchCustomers",
            "variables": { "input": { "email": { "is": "a@example.com" } } }
        })))
        .respond_with(ok(json!({
            "search": { "customers": { "edges": [
                { "node": { "id": "cust_1", "email": "a@example.com" } },
                { "node": { "id": "cust_2", "email": "a@example.com" } }
            ] } }
        })))
        .mount(&server)
        .await;

    let customers = client_for(&server)
        .search_customers(&CustomerSearch::by_email("a@example.com"))
        .await
        .unwrap();

    let ids: Vec<_> = customers.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["cust_1", "cust_2"]);
}

#[tokio::test]
async fn find_customer_maps_not_found_to_none() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "result": null },
            "errors": [{
                "message": "An object with this ID was not found.",
                "extensions": { "errorClass": "NOT_FOUND" }
            }]
        })))
        .mount(&server)
        .await;

    let found = client_for(&server)
        .find_customer(&"missing".parse().unwrap())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn find_customer_returns_payment_methods() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "variables": { "id": "cust_1" } })))
        .respond_with(ok(json!({ "result": {
            "id": "cust_1",
            "defaultPaymentMethod": { "id": "pm_1" },
            "paymentMethods": { "edges": [ { "node": { "id": "pm_1" } } ] }
        } })))
        .mount(&server)
        .await;

    let customer = client_for(&server)
        .find_customer(&"cust_1".parse().unwrap())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(customer.payment_methods.len(), 1);
    assert!(customer.payment_methods[0].is_default);
}

#[tokio::test]
async fn create_customer_sends_custom_fields() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "input": { "customer": {
                "firstName": "John",
                "lastName": "Doe1",
                "email": "john@example.com",
                "customFields": [ { "name": "userid", "value": "1234" } ]
            } } }
        })))
        .respond_with(ok(json!({ "result": { "customer": {
            "id": "cust_9", "email": "john@example.com"
        } } })))
        .expect(1)
        .mount(&server)
        .await;

    let request = CustomerRequest {
        first_name: Some("John".into()),
        last_name: Some("Doe1".into()),
        email: Some("john@example.com".into()),
        custom_fields: vec![CustomField::new("userid", "1234")],
    };
    let customer = client_for(&server).create_customer(&request).await.unwrap();

    assert_eq!(customer.id.as_str(), "cust_9");
}

// ============================================================================
// Payment methods, transactions, subscriptions
// ============================================================================

#[tokio::test]
async fn vault_payment_method_omits_verify_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "VaultPaymentMethod",
            "variables": { "input": { "paymentMethodId": "fake-nonce", "customerId": "cust_1" } }
        })))
        .respond_with(ok(json!({ "result": { "paymentMethod": { "id": "pm_7" } } })))
        .mount(&server)
        .await;

    let request = PaymentMethodRequest {
        customer_id: "cust_1".parse().unwrap(),
        nonce: "fake-nonce".into(),
        verify_card: false,
    };
    let method = client_for(&server)
        .create_payment_method(&request)
        .await
        .unwrap();

    assert_eq!(method.token.as_str(), "pm_7");

    let received = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    assert!(body["variables"]["input"].get("verify").is_none());
}

#[tokio::test]
async fn card_transaction_tokenizes_then_authorizes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "TokenizeCreditCard",
            "variables": { "input": { "creditCard": {
                "number": "4111111111111111",
                "expirationMonth": "12",
                "expirationYear": "2030",
                "cvv": "123"
            } } }
        })))
        .respond_with(ok(json!({ "result": { "paymentMethod": { "id": "single_use_1" } } })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "AuthorizePaymentMethod",
            "variables": { "input": {
                "paymentMethodId": "single_use_1",
                "transaction": { "amount": "1.00" }
            } }
        })))
        .respond_with(ok(json!({ "result": { "transaction": {
            "id": "tx_1", "status": "AUTHORIZED", "amount": { "value": "1.00", "currencyCode": "USD" }
        } } })))
        .expect(1)
        .mount(&server)
        .await;

    let card = CreditCard {
        number: "4111111111111111".into(),
        cvv: "123".into(),
        expiration_month: "12".into(),
        expiration_year: "2030".into(),
    };
    let request = TransactionRequest::sale(Amount::from_minor(100).unwrap(), PaymentSource::Card(card));
    let tx = client_for(&server).create_transaction(&request).await.unwrap();

    assert_eq!(tx.id.as_str(), "tx_1");
    assert_eq!(tx.status, "AUTHORIZED");
}

#[tokio::test]
async fn settled_transaction_uses_charge() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "operationName": "ChargePaymentMethod",
            "variables": { "input": {
                "paymentMethodId": "pm_1",
                "transaction": { "amount": "55.55", "orderId": "234234" }
            } }
        })))
        .respond_with(ok(json!({ "result": { "transaction": {
            "id": "tx_2", "status": "SUBMITTED_FOR_SETTLEMENT", "orderId": "234234"
        } } })))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = TransactionRequest::sale(
        Amount::from_minor(5555).unwrap(),
        PaymentSource::Token("pm_1".parse().unwrap()),
    )
    .with_order_id("234234");
    request.submit_for_settlement = true;

    let tx = client_for(&server).create_transaction(&request).await.unwrap();
    assert_eq!(tx.order_id.as_deref(), Some("234234"));
}

#[tokio::test]
async fn create_subscription_counts_transactions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "variables": { "input": { "paymentMethodId": "pm_1", "planId": "subscriptionED" } }
        })))
        .respond_with(ok(json!({ "result": { "subscription": {
            "id": "sub_1", "status": "ACTIVE",
            "transactions": { "edges": [ { "node": { "id": "tx_1" } } ] }
        } } })))
        .mount(&server)
        .await;

    let request = SubscriptionRequest {
        plan_id: "subscriptionED".parse().unwrap(),
        payment_method_token: "pm_1".parse().unwrap(),
    };
    let subscription = client_for(&server)
        .create_subscription(&request)
        .await
        .unwrap();

    assert_eq!(subscription.id.as_str(), "sub_1");
    assert_eq!(subscription.transaction_count, 1);
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn graphql_errors_become_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "errors": [{
                "message": "Amount must be greater than zero.",
                "extensions": { "errorClass": "VALIDATION" }
            }]
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_client_token(&ClientTokenRequest::default())
        .await
        .unwrap_err();

    match err {
        GatewayError::Api {
            message,
            error_class,
        } => {
            assert!(message.contains("greater than zero"));
            assert_eq!(error_class.as_deref(), Some("VALIDATION"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_without_body_is_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_client_token(&ClientTokenRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Status { status: 401 }));
}

#[tokio::test]
async fn missing_data_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "result": null } })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .generate_client_token(&ClientTokenRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Decode(_)));
}
