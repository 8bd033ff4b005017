//! Normalization of upstream order records into canonical ones.
//!
//! The mapping is total: any record get_order_detail can return
//! produces a canonical order. Absent substructures land as empty
//! values, never as failures.

use crate::api::types::{ItemDetail, OrderDetail, PackageDetail, RecipientAddress};
use crate::model::{
    Buyer, DeliveryEstimate, LineItem, Order, Package, PackageItem, Recipient,
};

/// Convert one upstream record into its canonical shape. `synced_at` is
/// the epoch second stamped on everything in the same run.
pub fn normalize_order(detail: OrderDetail, synced_at: i64) -> Order {
    Order {
        order_sn: detail.order_sn,
        order_status: detail.order_status,
        create_time: detail.create_time,
        update_time: detail.update_time,
        pay_time: detail.pay_time,
        pickup_done_time: detail.pickup_done_time,
        total_amount: detail.total_amount,
        estimated_shipping_fee: detail.estimated_shipping_fee,
        actual_shipping_fee: detail.actual_shipping_fee,
        actual_shipping_fee_confirmed: detail.actual_shipping_fee_confirmed,
        chargeable_weight_gram: detail.order_chargeable_weight_gram,
        buyer: Buyer {
            user_id: detail.buyer_user_id,
            username: detail.buyer_username,
        },
        recipient: detail
            .recipient_address
            .map(recipient_from)
            .unwrap_or_default(),
        items: detail.item_list.into_iter().map(line_item_from).collect(),
        packages: detail.package_list.into_iter().map(package_from).collect(),
        shipping_carrier: detail.shipping_carrier,
        tracking_no: detail.tracking_no,
        note: detail.note,
        cancel_by: detail.cancel_by,
        cancel_reason: detail.cancel_reason,
        edt: detail.edt.map(|e| DeliveryEstimate {
            from: e.edt_from,
            to: e.edt_to,
        }),
        synced_at,
    }
}

fn recipient_from(addr: RecipientAddress) -> Recipient {
    Recipient {
        name: addr.name,
        phone: addr.phone,
        town: addr.town,
        district: addr.district,
        city: addr.city,
        state: addr.state,
        region: addr.region,
        zipcode: addr.zipcode,
        full_address: addr.full_address,
    }
}

fn line_item_from(item: ItemDetail) -> LineItem {
    LineItem {
        item_id: item.item_id,
        model_id: item.model_id,
        item_sku: item.item_sku,
        model_sku: item.model_sku,
        item_name: item.item_name,
        model_name: item.model_name,
        original_price: item.model_original_price,
        discounted_price: item.model_discounted_price,
        quantity: item.model_quantity_purchased,
        weight: item.weight,
        promotion_type: item.promotion_type,
        promotion_id: item.promotion_id,
        image_url: item.image_info.map(|i| i.image_url).unwrap_or_default(),
    }
}

fn package_from(package: PackageDetail) -> Package {
    Package {
        package_number: package.package_number,
        logistics_status: package.logistics_status,
        shipping_carrier: package.shipping_carrier,
        items: package
            .item_list
            .into_iter()
            .map(|i| PackageItem {
                item_id: i.item_id,
                model_id: i.model_id,
                quantity: i.model_quantity,
            })
            .collect(),
    }
}
