//! Braintree GraphQL documents and wire types.
//!
//! Every mutation is aliased to `result` so one envelope type decodes them all.

use serde::{Deserialize, Serialize};

use btpay_core::{Amount, CustomField, Customer, PaymentMethod, Subscription, Transaction};

use crate::error::GatewayError;

pub(crate) const CUSTOMER_FIELDS: &str = "
fragment CustomerFields on Customer {
  id
  legacyId
  email
  firstName
  lastName
  defaultPaymentMethod { id }
  paymentMethods { edges { node { id details { __typename ... on CreditCardDetails { brandCode } } } } }
}";

pub(crate) const CREATE_CLIENT_TOKEN: &str = "
mutation CreateClientToken($input: CreateClientTokenInput) {
  result: createClientToken(input: $input) { clientToken }
}";

pub(crate) const SEARCH_CUSTOMERS: &str = "
query SearchCustomers($input: CustomerSearchInput!) {
  search { customers(input: $input) { edges { node { ...CustomerFields } } } }
}";

pub(crate) const FIND_CUSTOMER: &str = "
query FindCustomer($id: ID!) {
  result: node(id: $id) { ... on Customer { ...CustomerFields } }
}";

pub(crate) const CREATE_CUSTOMER: &str = "
mutation CreateCustomer($input: CreateCustomerInput!) {
  result: createCustomer(input: $input) { customer { ...CustomerFields } }
}";

pub(crate) const VAULT_PAYMENT_METHOD: &str = "
mutation VaultPaymentMethod($input: VaultPaymentMethodInput!) {
  result: vaultPaymentMethod(input: $input) { paymentMethod { id } }
}";

pub(crate) const TOKENIZE_CREDIT_CARD: &str = "
mutation TokenizeCreditCard($input: TokenizeCreditCardInput!) {
  result: tokenizeCreditCard(input: $input) { paymentMethod { id } }
}";

pub(crate) const AUTHORIZE_PAYMENT_METHOD: &str = "
mutation AuthorizePaymentMethod($input: AuthorizePaymentMethodInput!) {
  result: authorizePaymentMethod(input: $input) { transaction { ...TransactionFields } }
}";

pub(crate) const CHARGE_PAYMENT_METHOD: &str = "
mutation ChargePaymentMethod($input: ChargePaymentMethodInput!) {
  result: chargePaymentMethod(input: $input) { transaction { ...TransactionFields } }
}";

pub(crate) const TRANSACTION_FIELDS: &str = "
fragment TransactionFields on Transaction {
  id
  status
  orderId
  amount { value currencyCode }
}";

pub(crate) const CREATE_SUBSCRIPTION: &str = "
mutation CreateSubscription($input: CreateSubscriptionInput!) {
  result: createSubscription(input: $input) {
    subscription { id status transactions { edges { node { id } } } }
  }
}";

/// Request envelope.
#[derive(Debug, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: String,
    pub variables: serde_json::Value,
    #[serde(rename = "operationName")]
    pub operation_name: &'a str,
}

/// Response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GraphQlErrorExtensions {
    #[serde(default)]
    pub error_class: Option<String>,
}

/// `{ result: T }` for aliased operations.
#[derive(Debug, Deserialize)]
pub(crate) struct Aliased<T> {
    pub result: Option<T>,
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Connection<T> {
    #[serde(default)]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Edge<T> {
    pub node: T,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|e| e.node)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientTokenPayload {
    pub client_token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchData {
    pub search: CustomerSearchResults,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerSearchResults {
    pub customers: Connection<CustomerNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CustomerNode {
    pub id: String,
    #[serde(default)]
    pub legacy_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub default_payment_method: Option<IdNode>,
    #[serde(default)]
    pub payment_methods: Option<Connection<PaymentMethodNode>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdNode {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PaymentMethodNode {
    pub id: String,
    #[serde(default)]
    pub details: Option<PaymentMethodDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentMethodDetails {
    #[serde(default)]
    pub brand_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomerPayload {
    pub customer: CustomerNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaymentMethodPayload {
    pub payment_method: PaymentMethodNode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionPayload {
    pub transaction: TransactionNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransactionNode {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: Option<MoneyNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoneyNode {
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionPayload {
    pub subscription: SubscriptionNode,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionNode {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub transactions: Option<Connection<IdNode>>,
}

/// Card brand image served by the provider's asset host.
fn brand_image_url(brand_code: &str) -> String {
    format!(
        "https://assets.braintreegateway.com/payment_method_logo/{}.png",
        brand_code.to_ascii_lowercase()
    )
}

impl TryFrom<CustomerNode> for Customer {
    type Error = GatewayError;

    fn try_from(node: CustomerNode) -> Result<Self, Self::Error> {
        let default_id = node.default_payment_method.map(|pm| pm.id);
        let payment_methods = node
            .payment_methods
            .map(|conn| {
                conn.into_nodes()
                    .map(|pm| {
                        let is_default = default_id.as_deref() == Some(pm.id.as_str());
                        to_payment_method(pm, is_default)
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            id: node.id.parse()?,
            legacy_id: node.legacy_id,
            email: node.email,
            first_name: node.first_name,
            last_name: node.last_name,
            payment_methods,
        })
    }
}

pub(crate) fn to_payment_method(
    node: PaymentMethodNode,
    is_default: bool,
) -> Result<PaymentMethod, GatewayError> {
    Ok(PaymentMethod {
        token: node.id.parse()?,
        image_url: node
            .details
            .and_then(|d| d.brand_code)
            .map(|code| brand_image_url(&code)),
        is_default,
    })
}

impl TryFrom<TransactionNode> for Transaction {
    type Error = GatewayError;

    fn try_from(node: TransactionNode) -> Result<Self, Self::Error> {
        let amount = node
            .amount
            .map(|m| m.value.parse::<Amount>())
            .transpose()?;
        Ok(Self {
            id: node.id.parse()?,
            status: node.status,
            amount,
            order_id: node.order_id,
        })
    }
}

impl TryFrom<SubscriptionNode> for Subscription {
    type Error = GatewayError;

    fn try_from(node: SubscriptionNode) -> Result<Self, Self::Error> {
        Ok(Self {
            id: node.id.parse()?,
            status: node.status,
            transaction_count: node.transactions.map_or(0, |t| t.edges.len()),
        })
    }
}

/// Wire shape of a custom field input.
pub(crate) fn custom_fields_json(fields: &[CustomField]) -> serde_json::Value {
    serde_json::Value::Array(
        fields
            .iter()
            .map(|f| serde_json::json!({ "name": f.name, "value": f.value }))
            .collect(),
    )
}
