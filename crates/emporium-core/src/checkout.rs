//! # Checkout Planning
//!
//! Pure part of order placement: given a snapshot of the cart joined with
//! current catalog data, decide whether the order can be placed and what it
//! looks like. The database layer executes the resulting plan inside one
//! transaction.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CartSnapshotLine[] (cart lines + price + stock, read in the txn)       │
//! │       │                                                                 │
//! │       ├── empty? ─────────────────────────────► CoreError::EmptyCart    │
//! │       ▼                                                                 │
//! │  aggregate_demand()   Σ quantity per distinct product                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  verify_stock()       all-or-nothing                                    │
//! │       ├── any requested > available ──────► CoreError::InsufficientStock│
//! │       ▼                                                                 │
//! │  materialize_lines()  overflowing line or total ──► CoreError::Overflow │
//! │       ▼                                                                 │
//! │  CheckoutPlan                                                           │
//! │   ├── lines       one OrderLine per cart line, price frozen             │
//! │   ├── total       Σ unit_price × quantity                               │
//! │   └── demand      stock decrements to apply                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::OrderLine;

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// One cart line as read inside the checkout transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshotLine {
    pub product_id: String,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// Product stock at read time.
    pub available_stock: i64,
}

/// Total units requested for one distinct product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDemand {
    pub product_id: String,
    pub product_name: String,
    pub requested: i64,
    pub available: i64,
}

impl ProductDemand {
    #[inline]
    pub fn is_satisfiable(&self) -> bool {
        self.requested <= self.available
    }
}

/// Everything needed to persist an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPlan {
    pub lines: Vec<OrderLine>,
    pub total: Money,
    /// One entry per distinct product, in first-seen cart order.
    pub demand: Vec<ProductDemand>,
}

// =============================================================================
// Planning
// =============================================================================

/// Sums requested quantity per distinct product, keeping first-seen order.
///
/// Saturates rather than wrapping; a saturated demand can never be met by
/// stock, so it surfaces as `InsufficientStock`.
pub fn aggregate_demand(lines: &[CartSnapshotLine]) -> Vec<ProductDemand> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut demand: Vec<ProductDemand> = Vec::new();

    for line in lines {
        match index.get(line.product_id.as_str()) {
            Some(&pos) => {
                demand[pos].requested = demand[pos].requested.saturating_add(line.quantity)
            }
            None => {
                index.insert(line.product_id.as_str(), demand.len());
                demand.push(ProductDemand {
                    product_id: line.product_id.clone(),
                    product_name: line.product_name.clone(),
                    requested: line.quantity,
                    available: line.available_stock,
                });
            }
        }
    }

    demand
}

/// Fails on the first product whose demand exceeds its stock.
pub fn verify_stock(demand: &[ProductDemand]) -> CoreResult<()> {
    match demand.iter().find(|d| !d.is_satisfiable()) {
        Some(short) => Err(CoreError::InsufficientStock {
            product: short.product_name.clone(),
            requested: short.requested,
            available: short.available,
        }),
        None => Ok(()),
    }
}

/// Freezes each cart line into an order line.
pub fn materialize_lines(lines: &[CartSnapshotLine]) -> CoreResult<Vec<OrderLine>> {
    lines
        .iter()
        .map(|line| {
            let line_total = Money::from_cents(line.unit_price_cents)
                .checked_multiply_quantity(line.quantity)
                .ok_or_else(|| {
                    CoreError::overflow(format!("line total for {}", line.product_name))
                })?;

            Ok(OrderLine {
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                unit_price_cents: line.unit_price_cents,
                quantity: line.quantity,
                line_total_cents: line_total.cents(),
            })
        })
        .collect()
}

/// Validates a cart snapshot and builds the order plan.
///
/// ## Example
/// ```rust
/// use emporium_core::checkout::{plan_checkout, CartSnapshotLine};
///
/// let lines = vec![CartSnapshotLine {
///     product_id: "p1".into(),
///     product_name: "Widget".into(),
///     unit_price_cents: 1000,
///     quantity: 2,
///     available_stock: 5,
/// }];
/// let plan = plan_checkout(&lines).unwrap();
/// assert_eq!(plan.total.cents(), 2000);
/// ```
pub fn plan_checkout(lines: &[CartSnapshotLine]) -> CoreResult<CheckoutPlan> {
    if lines.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let demand = aggregate_demand(lines);
    verify_stock(&demand)?;

    let lines = materialize_lines(lines)?;
    let total = Money::checked_sum(lines.iter().map(OrderLine::line_total))
        .ok_or_else(|| CoreError::overflow("order total"))?;

    Ok(CheckoutPlan {
        lines,
        total,
        demand,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
