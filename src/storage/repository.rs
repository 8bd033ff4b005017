use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::{Buyer, Order};

// ── Orders ─────────────────────────────────────────────────────────

/// Insert or fully overwrite one order row. Replaying the same record
/// is a no-op apart from `synced_at`.
pub fn upsert_order(conn: &Connection, order: &Order) -> Result<(), rusqlite::Error> {
    let recipient = to_json(&order.recipient)?;
    let items = to_json(&order.items)?;
    let packages = to_json(&order.packages)?;
    let edt = order.edt.as_ref().map(to_json).transpose()?;

    conn.execute(
        "INSERT INTO orders (
            order_sn, order_status, create_time, update_time,
            pay_time, pickup_done_time,
            total_amount, estimated_shipping_fee, actual_shipping_fee,
            actual_shipping_fee_confirmed, chargeable_weight_gram,
            buyer_user_id, buyer_username,
            recipient, items, packages,
            shipping_carrier, tracking_no, note,
            cancel_by, cancel_reason, edt, synced_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23
        )
        ON CONFLICT(order_sn) DO UPDATE SET
            order_status=excluded.order_status, create_time=excluded.create_time,
            update_time=excluded.update_time, pay_time=excluded.pay_time,
            pickup_done_time=excluded.pickup_done_time,
            total_amount=excluded.total_amount,
            estimated_shipping_fee=excluded.estimated_shipping_fee,
            actual_shipping_fee=excluded.actual_shipping_fee,
            actual_shipping_fee_confirmed=excluded.actual_shipping_fee_confirmed,
            chargeable_weight_gram=excluded.chargeable_weight_gram,
            buyer_user_id=excluded.buyer_user_id, buyer_username=excluded.buyer_username,
            recipient=excluded.recipient, items=excluded.items, packages=excluded.packages,
            shipping_carrier=excluded.shipping_carrier, tracking_no=excluded.tracking_no,
            note=excluded.note, cancel_by=excluded.cancel_by,
            cancel_reason=excluded.cancel_reason, edt=excluded.edt,
            synced_at=excluded.synced_at",
        params![
            order.order_sn,
            order.order_status,
            order.create_time,
            order.update_time,
            order.pay_time,
            order.pickup_done_time,
            order.total_amount,
            order.estimated_shipping_fee,
            order.actual_shipping_fee,
            order.actual_shipping_fee_confirmed as i32,
            order.chargeable_weight_gram,
            order.buyer.user_id,
            order.buyer.username,
            recipient,
            items,
            packages,
            order.shipping_carrier,
            order.tracking_no,
            order.note,
            order.cancel_by,
            order.cancel_reason,
            edt,
            order.synced_at,
        ],
    )?;
    Ok(())
}

/// Status of the mirrored order, if the mirror has seen it.
pub fn find_order_status(
    conn: &Connection,
    order_sn: &str,
) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT order_status FROM orders WHERE order_sn = ?1",
        params![order_sn],
        |row| row.get(0),
    )
    .optional()
}

pub fn get_order(conn: &Connection, order_sn: &str) -> Result<Option<Order>, rusqlite::Error> {
    conn.query_row(
        "SELECT order_sn, order_status, create_time, update_time,
                pay_time, pickup_done_time,
                total_amount, estimated_shipping_fee, actual_shipping_fee,
                actual_shipping_fee_confirmed, chargeable_weight_gram,
                buyer_user_id, buyer_username,
                recipient, items, packages,
                shipping_carrier, tracking_no, note,
                cancel_by, cancel_reason, edt, synced_at
         FROM orders WHERE order_sn = ?1",
        params![order_sn],
        order_from_row,
    )
    .optional()
}

fn order_from_row(row: &Row) -> Result<Order, rusqlite::Error> {
    let edt: Option<String> = row.get(21)?;
    Ok(Order {
        order_sn: row.get(0)?,
        order_status: row.get(1)?,
        create_time: row.get(2)?,
        update_time: row.get(3)?,
        pay_time: row.get(4)?,
        pickup_done_time: row.get(5)?,
        total_amount: row.get(6)?,
        estimated_shipping_fee: row.get(7)?,
        actual_shipping_fee: row.get(8)?,
        actual_shipping_fee_confirmed: row.get::<_, i32>(9)? != 0,
        chargeable_weight_gram: row.get(10)?,
        buyer: Buyer {
            user_id: row.get(11)?,
            username: row.get(12)?,
        },
        recipient: from_json(13, row.get(13)?)?,
        items: from_json(14, row.get(14)?)?,
        packages: from_json(15, row.get(15)?)?,
        shipping_carrier: row.get(16)?,
        tracking_no: row.get(17)?,
        note: row.get(18)?,
        cancel_by: row.get(19)?,
        cancel_reason: row.get(20)?,
        edt: edt.map(|raw| from_json(21, raw)).transpose()?,
        synced_at: row.get(22)?,
    })
}

// ── Mirror stats ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MirrorStats {
    pub orders: i64,
    pub last_synced_at: Option<i64>,
    pub by_status: Vec<(String, i64)>,
}

pub fn mirror_stats(conn: &Connection) -> Result<MirrorStats, rusqlite::Error> {
    let orders: i64 = conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
    let last_synced_at: Option<i64> =
        conn.query_row("SELECT MAX(synced_at) FROM orders", [], |row| row.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT order_status, COUNT(*) FROM orders
         GROUP BY order_status ORDER BY COUNT(*) DESC, order_status",
    )?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    let by_status = rows.collect::<Result<Vec<_>, _>>()?;

    Ok(MirrorStats {
        orders,
        last_synced_at,
        by_status,
    })
}

// ── JSON columns ───────────────────────────────────────────────────

fn to_json<T: Serialize>(value: &T) -> Result<String, rusqlite::Error> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn from_json<T: DeserializeOwned>(column: usize, raw: String) -> Result<T, rusqlite::Error> {
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Buyer, DeliveryEstimate, LineItem, Package, PackageItem, Recipient};
    use crate::storage::Database;

    fn sample_order(sn: &str) -> Order {
        Order {
            order_sn: sn.to_string(),
            order_status: "READY_TO_SHIP".to_string(),
            create_time: 1_754_000_000,
            update_time: 1_754_100_000,
            pay_time: Some(1_754_000_600),
            pickup_done_time: None,
            total_amount: 145.5,
            estimated_shipping_fee: 10.0,
            actual_shipping_fee: 9.5,
            actual_shipping_fee_confirmed: true,
            chargeable_weight_gram: 400,
            buyer: Buyer {
                user_id: 700123,
                username: "b*****y".to_string(),
            },
            recipient: Recipient {
                name: "B. Uyer".to_string(),
                phone: "******88".to_string(),
                city: "Bandung".to_string(),
                full_address: "Jl. Braga No. 9".to_string(),
                ..Default::default()
            },
            items: vec![LineItem {
                item_id: 42,
                model_id: 4242,
                item_name: "Tote Bag".to_string(),
                quantity: 1,
                discounted_price: 145.5,
                ..Default::default()
            }],
            packages: vec![Package {
                package_number: "PKG42".to_string(),
                logistics_status: "LOGISTICS_READY".to_string(),
                shipping_carrier: "SiCepat".to_string(),
                items: vec![PackageItem {
                    item_id: 42,
                    model_id: 4242,
                    quantity: 1,
                }],
            }],
            shipping_carrier: "SiCepat".to_string(),
            tracking_no: "SC0001".to_string(),
            note: String::new(),
            cancel_by: String::new(),
            cancel_reason: String::new(),
            edt: Some(DeliveryEstimate {
                from: 1_754_200_000,
                to: 1_754_400_000,
            }),
            synced_at: 1_754_150_000,
        }
    }

    #[tokio::test]
    async fn test_order_round_trip() {
        let db = Database::open_memory().await.unwrap();
        let order = sample_order("2508ROUND001");

        let (expected, stored) = db
            .writer()
            .call(move |conn| {
                upsert_order(conn, &order)?;
                let stored = get_order(conn, "2508ROUND001")?;
                Ok::<_, rusqlite::Error>((order, stored))
            })
            .await
            .unwrap();

        assert_eq!(stored.as_ref(), Some(&expected));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let db = Database::open_memory().await.unwrap();

        let (count, first, second) = db
            .writer()
            .call(|conn| {
                let order = sample_order("2508IDEM0001");
                upsert_order(conn, &order)?;
                let first = get_order(conn, "2508IDEM0001")?;
                upsert_order(conn, &order)?;
                let second = get_order(conn, "2508IDEM0001")?;
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;
                Ok::<_, rusqlite::Error>((count, first, second))
            })
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_every_field() {
        let db = Database::open_memory().await.unwrap();

        let (expected, stored) = db
            .writer()
            .call(|conn| {
                upsert_order(conn, &sample_order("2508OVER0001"))?;

                let mut changed = sample_order("2508OVER0001");
                changed.order_status = "SHIPPED".to_string();
                changed.items.push(LineItem {
                    item_id: 43,
                    item_name: "Sticker Pack".to_string(),
                    quantity: 3,
                    ..Default::default()
                });
                changed.edt = None;
                changed.synced_at = 1_754_260_000;
                upsert_order(conn, &changed)?;

                let stored = get_order(conn, "2508OVER0001")?;
                Ok::<_, rusqlite::Error>((changed, stored))
            })
            .await
            .unwrap();

        assert_eq!(stored.as_ref(), Some(&expected));
    }

    #[tokio::test]
    async fn test_find_order_status() {
        let db = Database::open_memory().await.unwrap();

        db.writer()
            .call(|conn| {
                upsert_order(conn, &sample_order("2508STAT0001"))?;
                assert_eq!(
                    find_order_status(conn, "2508STAT0001")?,
                    Some("READY_TO_SHIP".to_string())
                );
                assert_eq!(find_order_status(conn, "2508MISSING1")?, None);
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_mirror_stats() {
        let db = Database::open_memory().await.unwrap();

        let stats = db
            .writer()
            .call(|conn| {
                let mut a = sample_order("2508STATS001");
                a.synced_at = 100;
                upsert_order(conn, &a)?;
                let mut b = sample_order("2508STATS002");
                b.order_status = "COMPLETED".to_string();
                b.synced_at = 300;
                upsert_order(conn, &b)?;
                let mut c = sample_order("2508STATS003");
                c.order_status = "COMPLETED".to_string();
                c.synced_at = 200;
                upsert_order(conn, &c)?;
                mirror_stats(conn)
            })
            .await
            .unwrap();

        assert_eq!(stats.orders, 3);
        assert_eq!(stats.last_synced_at, Some(300));
        assert_eq!(
            stats.by_status,
            vec![
                ("COMPLETED".to_string(), 2),
                ("READY_TO_SHIP".to_string(), 1)
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_mirror_stats() {
        let db = Database::open_memory().await.unwrap();

        let stats = db.reader().call(|conn| mirror_stats(conn)).await.unwrap();
        assert_eq!(stats.orders, 0);
        assert_eq!(stats.last_synced_at, None);
        assert!(stats.by_status.is_empty());
    }
}
