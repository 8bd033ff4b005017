//! Wire types for the Open Platform v2 order endpoints.
//!
//! Upstream omits most optional fields rather than sending nulls, so
//! nearly everything here carries `#[serde(default)]`. Records that
//! arrive without a substructure (no address on an unpaid order, no
//! packages before arrangement) must still deserialize.

use serde::Deserialize;

use crate::error::{Error, Result};

/// Which order timestamp a listing range filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRangeField {
    CreateTime,
    UpdateTime,
}

impl TimeRangeField {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRangeField::CreateTime => "create_time",
            TimeRangeField::UpdateTime => "update_time",
        }
    }
}

/// Standard v2 response envelope. `error` is empty on success.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub message: String,
    pub response: Option<T>,
}

impl<T> Envelope<T> {
    /// Payload on success, upstream application error otherwise.
    pub fn into_result(self) -> Result<Option<T>> {
        if self.error.is_empty() {
            Ok(self.response)
        } else {
            Err(Error::Api {
                code: self.error,
                message: self.message,
            })
        }
    }
}

/// One page of `get_order_list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderListPage {
    pub more: bool,
    pub next_cursor: String,
    pub order_list: Vec<OrderListEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderListEntry {
    pub order_sn: String,
}

/// Response body of `get_order_detail`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderDetailPage {
    pub order_list: Vec<OrderDetail>,
}

/// One full order as upstream reports it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderDetail {
    pub order_sn: String,
    pub order_status: String,
    pub create_time: i64,
    pub update_time: i64,
    pub pay_time: Option<i64>,
    pub pickup_done_time: Option<i64>,
    pub total_amount: f64,
    pub estimated_shipping_fee: f64,
    pub actual_shipping_fee: f64,
    pub actual_shipping_fee_confirmed: bool,
    pub order_chargeable_weight_gram: i64,
    pub buyer_user_id: i64,
    pub buyer_username: String,
    pub recipient_address: Option<RecipientAddress>,
    pub item_list: Vec<ItemDetail>,
    pub package_list: Vec<PackageDetail>,
    pub shipping_carrier: String,
    pub tracking_no: String,
    pub note: String,
    pub cancel_by: String,
    pub cancel_reason: String,
    pub edt: Option<EdtRange>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecipientAddress {
    pub name: String,
    pub phone: String,
    pub town: String,
    pub district: String,
    pub city: String,
    pub state: String,
    pub region: String,
    pub zipcode: String,
    pub full_address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemDetail {
    pub item_id: i64,
    pub item_name: String,
    pub item_sku: String,
    pub model_id: i64,
    pub model_name: String,
    pub model_sku: String,
    pub model_quantity_purchased: i64,
    pub model_original_price: f64,
    pub model_discounted_price: f64,
    pub weight: f64,
    pub promotion_type: String,
    pub promotion_id: i64,
    pub image_info: Option<ImageInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageInfo {
    pub image_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageDetail {
    pub package_number: String,
    pub logistics_status: String,
    pub shipping_carrier: String,
    pub item_list: Vec<PackageItemDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PackageItemDetail {
    pub item_id: i64,
    pub model_id: i64,
    pub model_quantity: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EdtRange {
    pub edt_from: i64,
    pub edt_to: i64,
}

/// Body of `auth/token/get`. Unlike order endpoints this comes back
/// flat, with the error fields beside the payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TokenResponse {
    pub request_id: String,
    pub error: String,
    pub message: String,
    pub access_token: String,
    pub refresh_token: String,
    pub expire_in: i64,
}

/// Response body of `get_shipping_document_parameter`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShippingDocumentPage {
    pub result_list: Vec<ShippingDocumentResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShippingDocumentResult {
    pub order_sn: String,
    pub suggest_shipping_document_type: String,
    pub selectable_shipping_document_type: Vec<String>,
    pub fail_error: String,
    pub fail_message: String,
}
