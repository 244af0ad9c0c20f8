use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Customer;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub membership: Option<String>,
}

/// Query for `/customers/me`: an anonymous cart token to claim on login.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MeQuery {
    pub cart_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerProfile {
    pub customer: Customer,
    pub cart_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct CustomerList {
    #[schema(value_type = Vec<Customer>)]
    pub items: Vec<Customer>,
}
