//! Billing service
//!
//! Orchestrates the mutations that touch money: appending order lines to a
//! table, settling table and order accounts, and writing the closing record
//! that makes a settlement auditable. Closing records are written after the
//! account mutation lands; the account itself is the source of truth and the
//! record is the audit trail.

use super::ledger;
use crate::auth::CurrentUser;
use crate::db::models::{
    AccountClosing, ClosedBy, ClosingRecord, LineState, Order, OrderCloseRequest, OrderLine,
    OrderLineCreate, OrderPayment, OrderStatus, PaymentMethod, ProductSnapshot, ServerRef,
    TableState, VenueTable,
};
use crate::db::repository::{
    ClosingHistoryRepository, OrderRepository, ProductRepository, RepoError, TableRepository,
};
use crate::utils::{AppError, AppResult, new_order_code};
use tracing::info;

#[derive(Clone)]
pub struct BillingService {
    tables: TableRepository,
    orders: OrderRepository,
    products: ProductRepository,
    closings: ClosingHistoryRepository,
}

impl BillingService {
    pub fn new(
        tables: TableRepository,
        orders: OrderRepository,
        products: ProductRepository,
        closings: ClosingHistoryRepository,
    ) -> Self {
        Self {
            tables,
            orders,
            products,
            closings,
        }
    }

    /// Record a product request against a table. Snapshots the product at
    /// current catalog values and moves the running bill forward in the same
    /// write. An available table flips to occupied on its first line.
    pub async fn append_order_line(
        &self,
        table_id: &str,
        payload: OrderLineCreate,
        server: &CurrentUser,
    ) -> AppResult<VenueTable> {
        if payload.quantity == 0 {
            return Err(AppError::validation("quantity must be at least 1"));
        }

        let product = self
            .products
            .find_by_id(&payload.product)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::not_found(format!("Product {} not found", payload.product)))?;
        if !product.is_available() {
            return Err(AppError::business_rule(format!(
                "product '{}' is not available",
                product.name
            )));
        }

        let snapshot = ProductSnapshot {
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            image_url: product.image_url.clone(),
        };
        let server_ref = ServerRef {
            user_id: server.id.clone(),
            name: server.username.clone(),
        };

        let updated = self
            .tables
            .mutate(table_id, |table| {
                if table.is_closed() {
                    return Err(RepoError::Validation(
                        "account is closed; reset the table first".to_string(),
                    ));
                }
                let line = OrderLine {
                    product: snapshot.clone(),
                    quantity: payload.quantity,
                    state: LineState::pending(),
                    server: server_ref.clone(),
                    note: payload.note.clone(),
                    at: chrono::Utc::now(),
                    code: new_order_code(),
                };
                ledger::apply_line(table, line);
                if table.state == TableState::available() {
                    table.state = TableState::occupied();
                }
                Ok(())
            })
            .await?;

        info!(
            table = table_id,
            product = %snapshot.name,
            quantity = payload.quantity,
            total = %updated.accumulated_total.total,
            "order line appended"
        );
        Ok(updated)
    }

    /// Change the state of one order line and rebuild the running bill, so
    /// a cancellation stops billing the line.
    pub async fn set_line_state(
        &self,
        table_id: &str,
        index: usize,
        state: LineState,
    ) -> AppResult<VenueTable> {
        let updated = self
            .tables
            .mutate(table_id, |table| {
                if table.is_closed() {
                    return Err(RepoError::Validation(
                        "account is closed; reset the table first".to_string(),
                    ));
                }
                let line = table.order_lines.get_mut(index).ok_or_else(|| {
                    RepoError::NotFound(format!("order line {} not found", index))
                })?;
                line.state = state.clone();
                ledger::rebuild_accumulated(table);
                Ok(())
            })
            .await?;
        Ok(updated)
    }

    /// Settle a table's account. Writes the closing snapshot onto the table
    /// and appends the immutable closing record. The snapshot amount is the
    /// accumulated total at the moment of closing.
    pub async fn close_table(
        &self,
        table_id: &str,
        method: PaymentMethod,
        comment: Option<String>,
        closed_by: &CurrentUser,
    ) -> AppResult<(VenueTable, ClosingRecord)> {
        let closed_at = chrono::Utc::now();

        let updated = self
            .tables
            .mutate(table_id, |table| {
                if table.is_closed() {
                    return Err(RepoError::Validation(
                        "account is already closed".to_string(),
                    ));
                }
                table.closing = Some(AccountClosing {
                    paid: true,
                    paid_at: closed_at,
                    method,
                    total_amount: table.accumulated_total.total,
                });
                Ok(())
            })
            .await?;

        let closing = match &updated.closing {
            Some(c) => c,
            None => return Err(AppError::internal("closing snapshot missing after close")),
        };

        let record = self
            .closings
            .create(ClosingRecord {
                id: None,
                closed_at,
                grand_total: closing.total_amount,
                comment,
                user: ClosedBy {
                    user_id: closed_by.id.clone(),
                    user_name: closed_by.username.clone(),
                },
            })
            .await
            .map_err(AppError::from)?;

        info!(
            table = table_id,
            total = %record.grand_total,
            closed_by = %record.user.user_name,
            "table account closed"
        );
        Ok((updated, record))
    }

    /// Return a settled table to service: empty queues, zero bill, no
    /// closing snapshot. The closing record written at settlement survives.
    pub async fn reset_table(&self, table_id: &str) -> AppResult<VenueTable> {
        let updated = self
            .tables
            .mutate(table_id, |table| {
                if !table.is_closed() {
                    return Err(RepoError::Validation(
                        "account must be closed before reset".to_string(),
                    ));
                }
                table.songs.clear();
                table.order_lines.clear();
                table.accumulated_total = crate::db::models::AccumulatedTotal::zero();
                table.closing = None;
                table.state = TableState::available();
                Ok(())
            })
            .await?;

        info!(table = table_id, "table reset to service");
        Ok(updated)
    }

    /// Settle an order. Marks it paid and completed, stamps the end time,
    /// and appends the closing record for its recomputed total.
    pub async fn close_order(
        &self,
        order_id: &str,
        req: OrderCloseRequest,
        closed_by: &CurrentUser,
    ) -> AppResult<(Order, ClosingRecord)> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", order_id)))?;

        if order.is_paid() {
            return Err(AppError::business_rule("order is already paid"));
        }

        let closed_at = chrono::Utc::now();
        order.status = OrderStatus::Completed;
        order.end_time = Some(closed_at);
        order.payment = Some(OrderPayment {
            paid: true,
            paid_at: closed_at,
            method: req.method,
            payment_reference: req.payment_reference,
        });

        let saved = self.orders.save(order).await.map_err(AppError::from)?;

        let record = self
            .closings
            .create(ClosingRecord {
                id: None,
                closed_at,
                grand_total: saved.total,
                comment: req.comment,
                user: ClosedBy {
                    user_id: closed_by.id.clone(),
                    user_name: closed_by.username.clone(),
                },
            })
            .await
            .map_err(AppError::from)?;

        info!(
            order = order_id,
            total = %record.grand_total,
            "order account closed"
        );
        Ok((saved, record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::{AccumulatedTotal, Product, STATUS_AVAILABLE};
    use rust_decimal_macros::dec;

    async fn service() -> (BillingService, TableRepository, ProductRepository) {
        let svc = DbService::memory().await.expect("memory db");
        let tables = TableRepository::new(svc.db.clone());
        let orders = OrderRepository::new(svc.db.clone());
        let products = ProductRepository::new(svc.db.clone());
        let closings = ClosingHistoryRepository::new(svc.db.clone());
        (
            BillingService::new(tables.clone(), orders, products.clone(), closings),
            tables,
            products,
        )
    }

    fn staff() -> CurrentUser {
        CurrentUser {
            id: "user:staff1".to_string(),
            username: "maria".to_string(),
            role_id: crate::auth::roles::ROLE_STAFF,
            role_name: "staff".to_string(),
        }
    }

    async fn seeded_table(tables: &TableRepository) -> String {
        let created = tables
            .create(VenueTable {
                id: None,
                table_number: 1,
                capacity: 4,
                special_status: false,
                state: TableState::available(),
                credential: "cred-1".to_string(),
                songs: Vec::new(),
                order_lines: Vec::new(),
                accumulated_total: AccumulatedTotal::zero(),
                closing: None,
                created_at: chrono::Utc::now(),
                revision: 0,
            })
            .await
            .expect("table");
        created.id.expect("id").to_string()
    }

    async fn seeded_product(products: &ProductRepository, name: &str, price: &str) -> String {
        let created = products
            .create(Product {
                id: None,
                name: name.to_string(),
                category: "drinks".to_string(),
                price: price.parse().expect("price"),
                image_url: None,
                stock: 10,
                status: STATUS_AVAILABLE.to_string(),
                created_at: chrono::Utc::now(),
            })
            .await
            .expect("product");
        created.id.expect("id").to_string()
    }

    #[tokio::test]
    async fn appending_lines_accumulates_and_occupies() {
        let (service, tables, products) = service().await;
        let table_id = seeded_table(&tables).await;
        let product_id = seeded_product(&products, "Agua", "1.50").await;

        service
            .append_order_line(
                &table_id,
                OrderLineCreate {
                    product: product_id.clone(),
                    quantity: 2,
                    note: None,
                },
                &staff(),
            )
            .await
            .expect("first line");
        let updated = service
            .append_order_line(
                &table_id,
                OrderLineCreate {
                    product: product_id,
                    quantity: 1,
                    note: Some("no ice".to_string()),
                },
                &staff(),
            )
            .await
            .expect("second line");

        assert_eq!(updated.accumulated_total.total, dec!(4.50));
        assert_eq!(updated.order_lines.len(), 2);
        assert_eq!(updated.state, TableState::occupied());
    }

    #[tokio::test]
    async fn close_then_reset_round_trip() {
        let (service, tables, products) = service().await;
        let table_id = seeded_table(&tables).await;
        let product_id = seeded_product(&products, "Cerveza", "3.00").await;

        service
            .append_order_line(
                &table_id,
                OrderLineCreate {
                    product: product_id,
                    quantity: 2,
                    note: None,
                },
                &staff(),
            )
            .await
            .expect("line");

        let (closed, record) = service
            .close_table(&table_id, PaymentMethod::Cash, None, &staff())
            .await
            .expect("close");
        assert!(closed.is_closed());
        assert_eq!(record.grand_total, dec!(6.00));
        assert_eq!(record.user.user_name, "maria");

        // Closed account accepts no further lines
        let err = service
            .append_order_line(
                &table_id,
                OrderLineCreate {
                    product: "product:missing".to_string(),
                    quantity: 1,
                    note: None,
                },
                &staff(),
            )
            .await
            .expect_err("closed");
        assert!(matches!(err, AppError::NotFound(_) | AppError::Validation(_)));

        let reset = service.reset_table(&table_id).await.expect("reset");
        assert!(reset.order_lines.is_empty());
        assert_eq!(reset.accumulated_total.total, dec!(0));
        assert!(reset.closing.is_none());
        assert_eq!(reset.state, TableState::available());
    }

    #[tokio::test]
    async fn double_close_is_rejected() {
        let (service, tables, _) = service().await;
        let table_id = seeded_table(&tables).await;

        service
            .close_table(&table_id, PaymentMethod::Card, None, &staff())
            .await
            .expect("first close");
        let err = service
            .close_table(&table_id, PaymentMethod::Card, None, &staff())
            .await
            .expect_err("second close");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn cancelling_a_line_reduces_the_bill() {
        let (service, tables, products) = service().await;
        let table_id = seeded_table(&tables).await;
        let product_id = seeded_product(&products, "Nachos", "5.00").await;

        service
            .append_order_line(
                &table_id,
                OrderLineCreate {
                    product: product_id.clone(),
                    quantity: 1,
                    note: None,
                },
                &staff(),
            )
            .await
            .expect("line 0");
        service
            .append_order_line(
                &table_id,
                OrderLineCreate {
                    product: product_id,
                    quantity: 2,
                    note: None,
                },
                &staff(),
            )
            .await
            .expect("line 1");

        let updated = service
            .set_line_state(&table_id, 1, LineState::cancelled())
            .await
            .expect("cancel");
        assert_eq!(updated.accumulated_total.total, dec!(5.00));
    }
}
