//! HTML pages served by the demo.
//!
//! Pages are small enough to build with `format!`. Interpolated values go
//! through [`escape`], or [`js_string`] inside `<script>`.

use std::fmt::Write;

/// Braintree drop-in UI script.
pub const DROPIN_SCRIPT_URL: &str = "https://js.braintreegateway.com/web/dropin/1.33.0/js/dropin.min.js";

/// Escape text for use in HTML element content and quoted attributes.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Failure body for any request that went wrong.
#[must_use]
pub fn failure(message: &str) -> String {
    format!("<h1>Something went wrong: {}</h1>", escape(message))
}

/// Success body for `/createtransaction`.
pub const TRANSACTION_SUCCESS: &str = "<h1>Success!</h1>";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n\
         <script src=\"{DROPIN_SCRIPT_URL}\"></script>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape(title)
    )
}

/// Drop-in container plus the script that fills `paymentMethodNonce` on submit.
fn dropin(client_token: &str, form_id: &str) -> String {
    format!(
        r##"<div id="dropin-container" data-client-token="{token}"></div>
<input type="hidden" id="nonce" name="paymentMethodNonce">
<script>
  var form = document.getElementById("{form_id}");
  braintree.dropin.create({{
    authorization: {js_token},
    container: "#dropin-container"
  }}, function (err, instance) {{
    if (err) {{ console.error(err); return; }}
    form.addEventListener("submit", function (event) {{
      event.preventDefault();
      instance.requestPaymentMethod(function (err, payload) {{
        if (err) {{ console.error(err); return; }}
        document.getElementById("nonce").value = payload.nonce;
        form.submit();
      }});
    }});
  }});
</script>
"##,
        token = escape(client_token),
        js_token = js_string(client_token),
    )
}

/// Quote text as a JavaScript string literal safe inside a `<script>` block.
#[must_use]
pub fn js_string(raw: &str) -> String {
    serde_json::to_string(raw)
        .unwrap_or_else(|_| String::from("\"\""))
        .replace('<', "\\u003c")
}

/// Raw card form posting to `/createtransaction`.
#[must_use]
pub fn payment_form(client_token: &str) -> String {
    let body = format!(
        r#"<h1>Pay $1.00</h1>
<form id="payment-form" method="post" action="/createtransaction" data-client-token="{}">
  <label>Card number <input type="text" name="number" autocomplete="cc-number"></label>
  <label>CVV <input type="text" name="cvv" autocomplete="cc-csc"></label>
  <label>Month <input type="text" name="month" placeholder="MM"></label>
  <label>Year <input type="text" name="year" placeholder="YYYY"></label>
  <button type="submit">Pay</button>
</form>
"#,
        escape(client_token)
    );
    page("Payment", &body)
}

/// Drop-in form posting a nonce to `/checkout`.
#[must_use]
pub fn subscription_form(client_token: &str) -> String {
    let mut body = String::from(
        "<h1>Subscribe</h1>\n<form id=\"subscription-form\" method=\"post\" action=\"/checkout\">\n",
    );
    body.push_str(&dropin(client_token, "subscription-form"));
    body.push_str("<button type=\"submit\">Subscribe</button>\n</form>\n");
    page("Subscription", &body)
}

/// Drop-in form posting a nonce, payment method index, customer ID and email
/// to `/createusersubscription`.
#[must_use]
pub fn user_subscription_form(client_token: &str, client_id: &str, email: &str) -> String {
    let mut body = String::from(
        "<h1>Subscribe</h1>\n<form id=\"user-subscription-form\" method=\"post\" action=\"/createusersubscription\">\n",
    );
    body.push_str(&dropin(client_token, "user-subscription-form"));
    // Infallible for String.
    let _ = write!(
        body,
        r#"<input type="hidden" name="clientId" value="{}">
<input type="hidden" name="email" value="{}">
<label>Payment method <input type="number" name="paymentMethodIndex" value="0" min="0"></label>
<button type="submit">Pay</button>
</form>
"#,
        escape(client_id),
        escape(email)
    );
    page("Your subscription", &body)
}

/// Email form that opens the user subscription form.
#[must_use]
pub fn login_form() -> String {
    page(
        "Login",
        r#"<h1>Login</h1>
<form method="get" action="/c">
  <label>Email <input type="email" name="email"></label>
  <button type="submit">Continue</button>
</form>
"#,
    )
}
