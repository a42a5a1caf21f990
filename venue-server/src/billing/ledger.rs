//! Billing ledger arithmetic
//!
//! Pure functions over in-memory documents. The repositories call
//! [`recalculate_total`] on every order persist; the service layer uses the
//! table helpers when appending lines or settling an account. All money math
//! is `Decimal`, never floats.

use crate::db::models::{Order, OrderItem, OrderLine, VenueTable};
use rust_decimal::Decimal;

/// Recompute `order.total` from the item lines.
///
/// An empty item list leaves the stored total untouched. Clearing the lines
/// of a partially-served order must not silently zero the bill; the total
/// only moves when there are lines to derive it from.
pub fn recalculate_total(order: &mut Order) {
    if order.items.is_empty() {
        return;
    }
    order.total = order.items.iter().map(OrderItem::amount).sum();
}

/// Reject item lines a bill can never be derived from
pub fn validate_items(items: &[OrderItem]) -> Result<(), String> {
    for item in items {
        if item.quantity == 0 {
            return Err("item quantity must be at least 1".to_string());
        }
        if item.price < Decimal::ZERO {
            return Err("item price must not be negative".to_string());
        }
    }
    Ok(())
}

/// Sum of all billable lines on a table. Cancelled lines do not bill.
pub fn order_lines_total(lines: &[OrderLine]) -> Decimal {
    lines
        .iter()
        .filter(|l| l.state.state_name != "cancelled")
        .map(OrderLine::amount)
        .sum()
}

/// Append a line to the table and move the running bill forward in the same
/// step. The accumulated total is maintained eagerly, never derived at read
/// time.
pub fn apply_line(table: &mut VenueTable, line: OrderLine) {
    table.accumulated_total.total += line.amount();
    table.accumulated_total.as_of = line.at;
    table.order_lines.push(line);
}

/// Rebuild the running bill from the lines currently on the table. Used
/// after a line-state change (a cancellation stops billing the line).
pub fn rebuild_accumulated(table: &mut VenueTable) {
    table.accumulated_total.total = order_lines_total(&table.order_lines);
    table.accumulated_total.as_of = chrono::Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        AccumulatedTotal, LineState, OrderStatus, ProductSnapshot, ServerRef, TableState,
    };
    use rust_decimal_macros::dec;
    use surrealdb::RecordId;

    fn order_with(items: Vec<OrderItem>, total: Decimal) -> Order {
        Order {
            id: None,
            table: RecordId::from(("venue_table", "t1")),
            served_by: RecordId::from(("user", "u1")),
            items,
            song_requests: Vec::new(),
            status: OrderStatus::Pending,
            total,
            start_time: chrono::Utc::now(),
            end_time: None,
            payment: None,
            revision: 0,
        }
    }

    fn line(price: Decimal, quantity: u32, state: LineState) -> OrderLine {
        OrderLine {
            product: ProductSnapshot {
                name: "Agua".to_string(),
                category: "drinks".to_string(),
                price,
                image_url: None,
            },
            quantity,
            state,
            server: ServerRef {
                user_id: "user:u1".to_string(),
                name: "Maria".to_string(),
            },
            note: None,
            at: chrono::Utc::now(),
            code: "P-TEST0001".to_string(),
        }
    }

    fn empty_table() -> VenueTable {
        VenueTable {
            id: None,
            table_number: 1,
            capacity: 4,
            special_status: false,
            state: TableState::occupied(),
            credential: "cred-1".to_string(),
            songs: Vec::new(),
            order_lines: Vec::new(),
            accumulated_total: AccumulatedTotal::zero(),
            closing: None,
            created_at: chrono::Utc::now(),
            revision: 0,
        }
    }

    #[test]
    fn total_is_sum_of_price_times_quantity() {
        let mut order = order_with(
            vec![
                OrderItem {
                    product: RecordId::from(("product", "p1")),
                    quantity: 3,
                    price: dec!(2.50),
                },
                OrderItem {
                    product: RecordId::from(("product", "p2")),
                    quantity: 1,
                    price: dec!(10.00),
                },
            ],
            dec!(0),
        );
        recalculate_total(&mut order);
        assert_eq!(order.total, dec!(17.50));
    }

    #[test]
    fn empty_items_leave_total_untouched() {
        let mut order = order_with(Vec::new(), dec!(42.00));
        recalculate_total(&mut order);
        assert_eq!(order.total, dec!(42.00));
    }

    #[test]
    fn apply_line_moves_the_running_bill() {
        let mut table = empty_table();
        apply_line(&mut table, line(dec!(3.00), 2, LineState::pending()));

        let second = line(dec!(1.50), 1, LineState::pending());
        let stamp = second.at;
        apply_line(&mut table, second);

        assert_eq!(table.accumulated_total.total, dec!(7.50));
        assert_eq!(table.order_lines.len(), 2);
        // the running bill's timestamp follows the newest line
        assert_eq!(table.accumulated_total.as_of, stamp);
    }

    #[test]
    fn cancelled_lines_do_not_bill() {
        let mut table = empty_table();
        apply_line(&mut table, line(dec!(3.00), 2, LineState::pending()));
        apply_line(&mut table, line(dec!(5.00), 1, LineState::pending()));

        table.order_lines[1].state = LineState::cancelled();
        rebuild_accumulated(&mut table);
        assert_eq!(table.accumulated_total.total, dec!(6.00));
    }

    #[test]
    fn negative_price_fails_validation() {
        let items = vec![OrderItem {
            product: RecordId::from(("product", "p1")),
            quantity: 1,
            price: dec!(-0.01),
        }];
        assert!(validate_items(&items).is_err());
    }
}
