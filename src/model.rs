//! Canonical order records as they live in the local mirror.
//!
//! These are the normalized shapes produced by the transform stage.
//! Upstream wire types live in `api::types`; everything here is
//! upstream-agnostic and serializes cleanly for storage.

use serde::{Deserialize, Serialize};

/// One order, keyed by its unique `order_sn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_sn: String,
    pub order_status: String,
    /// Epoch seconds the order was placed.
    pub create_time: i64,
    /// Epoch seconds of the last upstream modification.
    pub update_time: i64,
    pub pay_time: Option<i64>,
    pub pickup_done_time: Option<i64>,
    pub total_amount: f64,
    pub estimated_shipping_fee: f64,
    pub actual_shipping_fee: f64,
    pub actual_shipping_fee_confirmed: bool,
    pub chargeable_weight_gram: i64,
    pub buyer: Buyer,
    pub recipient: Recipient,
    pub items: Vec<LineItem>,
    pub packages: Vec<Package>,
    pub shipping_carrier: String,
    pub tracking_no: String,
    pub note: String,
    pub cancel_by: String,
    pub cancel_reason: String,
    pub edt: Option<DeliveryEstimate>,
    /// Epoch seconds this record last passed through a sync run.
    pub synced_at: i64,
}

impl Order {
    pub fn is_cancelled(&self) -> bool {
        self.order_status == "CANCELLED"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
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

/// One purchased item variant within an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: i64,
    pub model_id: i64,
    pub item_sku: String,
    pub model_sku: String,
    pub item_name: String,
    pub model_name: String,
    pub original_price: f64,
    pub discounted_price: f64,
    pub quantity: i64,
    pub weight: f64,
    pub promotion_type: String,
    pub promotion_id: i64,
    pub image_url: String,
}

/// One shipment parcel. Orders split across parcels carry several.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub package_number: String,
    pub logistics_status: String,
    pub shipping_carrier: String,
    pub items: Vec<PackageItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageItem {
    pub item_id: i64,
    pub model_id: i64,
    pub quantity: i64,
}

/// Estimated delivery window, when upstream provides one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryEstimate {
    pub from: i64,
    pub to: i64,
}
