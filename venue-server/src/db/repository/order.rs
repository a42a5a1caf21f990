//! Order Repository
//!
//! Every persist path runs the billing recompute first, so a stored order's
//! `total` can never drift from its item lines (see [`crate::billing`]).

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::billing::ledger;
use crate::db::models::{Order, OrderStatus};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "venue_order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All orders, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM venue_order ORDER BY start_time DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let rid = parse_id(TABLE, id)?;
        let order: Option<Order> = self.base.db().select(rid).await?;
        Ok(order)
    }

    /// Orders for one table, newest first. Record links are stored in
    /// their `"table:id"` string form, so the match is on that form.
    pub async fn find_by_table(&self, table_id: &str) -> RepoResult<Vec<Order>> {
        let rid = parse_id("venue_table", table_id)?;
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM venue_order WHERE table = $table ORDER BY start_time DESC")
            .bind(("table", rid.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders in one lifecycle status, newest first
    pub async fn find_by_status(&self, status: OrderStatus) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM venue_order WHERE status = $status ORDER BY start_time DESC")
            .bind(("status", status))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Create a new order. Items are validated and the total recomputed
    /// before the document is written.
    pub async fn create(&self, mut order: Order) -> RepoResult<Order> {
        ledger::validate_items(&order.items).map_err(RepoError::Validation)?;
        ledger::recalculate_total(&mut order);

        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Conditional full-document write with billing recompute. Only lands if
    /// the stored revision still matches; bumps the revision on success.
    pub async fn save(&self, order: Order) -> RepoResult<Order> {
        let rid = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Validation("order has no id".to_string()))?;
        let expected = order.revision;

        let mut content = order;
        ledger::validate_items(&content.items).map_err(RepoError::Validation)?;
        ledger::recalculate_total(&mut content);
        content.id = None;
        content.revision = expected + 1;

        let updated: Option<Order> = self
            .base
            .db()
            .query("UPDATE $id CONTENT $data WHERE revision = $expected RETURN AFTER")
            .bind(("id", rid.clone()))
            .bind(("data", content))
            .bind(("expected", expected))
            .await?
            .take(0)?;

        updated.ok_or_else(|| {
            RepoError::Conflict(format!("order {} was modified concurrently", rid))
        })
    }

    /// Hard delete an order
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let rid = parse_id(TABLE, id)?;
        let deleted: Option<Order> = self.base.db().delete(rid).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Order {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::OrderItem;
    use rust_decimal_macros::dec;
    use surrealdb::RecordId;

    async fn repo() -> OrderRepository {
        let svc = DbService::memory().await.expect("memory db");
        OrderRepository::new(svc.db)
    }

    fn order(items: Vec<OrderItem>) -> Order {
        Order {
            id: None,
            table: RecordId::from(("venue_table", "t1")),
            served_by: RecordId::from(("user", "u1")),
            items,
            song_requests: Vec::new(),
            status: OrderStatus::Pending,
            total: dec!(0),
            start_time: chrono::Utc::now(),
            end_time: None,
            payment: None,
            revision: 0,
        }
    }

    fn item(qty: u32, price: rust_decimal::Decimal) -> OrderItem {
        OrderItem {
            product: RecordId::from(("product", "p1")),
            quantity: qty,
            price,
        }
    }

    #[tokio::test]
    async fn create_recomputes_total() {
        let repo = repo().await;
        let mut o = order(vec![item(2, dec!(3.50)), item(1, dec!(1.00))]);
        o.total = dec!(999); // any incoming total is overwritten
        let created = repo.create(o).await.expect("create");
        assert_eq!(created.total, dec!(8.00));
    }

    #[tokio::test]
    async fn save_with_empty_items_keeps_previous_total() {
        let repo = repo().await;
        let created = repo
            .create(order(vec![item(2, dec!(3.50))]))
            .await
            .expect("create");
        assert_eq!(created.total, dec!(7.00));

        let mut cleared = created;
        cleared.items.clear();
        let saved = repo.save(cleared).await.expect("save");
        assert_eq!(saved.total, dec!(7.00));
    }

    #[tokio::test]
    async fn zero_quantity_item_is_rejected() {
        let repo = repo().await;
        let err = repo
            .create(order(vec![item(0, dec!(3.50))]))
            .await
            .expect_err("invalid item");
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn stale_save_is_a_conflict() {
        let repo = repo().await;
        let created = repo
            .create(order(vec![item(1, dec!(2.00))]))
            .await
            .expect("create");

        let copy_a = created.clone();
        let copy_b = created;
        repo.save(copy_a).await.expect("first save");
        let err = repo.save(copy_b).await.expect_err("stale save");
        assert!(matches!(err, RepoError::Conflict(_)));
    }
}
