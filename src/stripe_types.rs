use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct CreateCustomerForm<'a> {
    pub email: &'a str,
    /// Card token collected client side.
    pub source: &'a str,
}

#[derive(Serialize, Debug)]
pub struct CreateSubscriptionForm<'a> {
    pub customer: &'a str,
    #[serde(rename = "items[0][price]")]
    pub price: &'a str,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Customer {
    pub id: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Subscription {
    pub id: String,
    pub status: String,
}

#[derive(Deserialize, Debug)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Deserialize, Debug)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}
