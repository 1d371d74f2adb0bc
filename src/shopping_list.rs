// ABOUTME: Shopping list aggregation across all recipes in a user's cart
// ABOUTME: Groups line items by ingredient identity, sums quantities, and renders the export
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Shopping List Aggregation
//!
//! The one genuinely interesting transformation in the backend: roll up
//! every line item across the recipes in a user's cart into one total per
//! ingredient identity.
//!
//! Grouping key is the exact `(name, measurement_unit)` pair. Comparison
//! is case-sensitive with no unit normalization, so "g" and "kg" lines for
//! the same ingredient name stay separate. Sums use exact integer
//! arithmetic and the output is ordered byte-wise by name (then unit), so
//! repeated exports of an unchanged cart are byte-identical.
//!
//! Aggregation is a pure read: no caching, no side effects, safe under
//! concurrent calls. A concurrent cart mutation may land before or after
//! the read; the export is a point-in-time snapshot, not a transactional
//! guarantee.

use crate::database::{CartLineItem, Database};
use crate::errors::{AppError, AppResult};
use crate::models::AggregatedLine;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::debug;
use uuid::Uuid;

/// Shopping list aggregator over the cart and recipe stores
#[derive(Clone)]
pub struct ShoppingListAggregator {
    database: Database,
}

impl ShoppingListAggregator {
    /// Create an aggregator backed by the given database
    #[must_use]
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Aggregate the user's cart into ordered per-ingredient totals
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` when the user has no cart entries, so the
    /// boundary layer can distinguish "no cart" from "no ingredients"
    /// instead of emitting an empty document.
    pub async fn aggregate(&self, user_id: Uuid) -> AppResult<Vec<AggregatedLine>> {
        let entries = self.database.count_cart_entries(user_id).await?;
        if entries == 0 {
            return Err(AppError::empty_cart().with_user_id(user_id));
        }

        let items = self.database.cart_line_items(user_id).await?;
        let lines = consolidate(items);

        debug!(
            user_id = %user_id,
            cart_entries = entries,
            distinct_ingredients = lines.len(),
            "Aggregated shopping list"
        );

        Ok(lines)
    }
}

/// Group line items by ingredient identity and sum their quantities
///
/// One output line per distinct `(name, measurement_unit)` pair, ordered
/// byte-wise ascending by name, ties broken by unit. The `BTreeMap` keyed
/// on the identity pair provides both the grouping and the deterministic
/// ordinal ordering.
#[must_use]
pub fn consolidate(items: Vec<CartLineItem>) -> Vec<AggregatedLine> {
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();

    for item in items {
        *totals
            .entry((item.name, item.measurement_unit))
            .or_insert(0) += item.amount;
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), amount)| AggregatedLine {
            name,
            amount,
            measurement_unit,
        })
        .collect()
}

/// Render aggregated lines as the plain-text download document
///
/// The date goes in the header only; line order and formatting depend
/// solely on the aggregate, keeping same-day repeat exports byte-identical.
#[must_use]
pub fn render_text(lines: &[AggregatedLine], date: NaiveDate) -> String {
    let mut out = format!("Shopping list for {}\n\n", date.format("%d-%m-%Y"));

    for line in lines {
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "\u{2022} {} ({}) - {}",
            line.name, line.measurement_unit, line.amount
        );
    }

    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn item(name: &str, unit: &str, amount: i64) -> CartLineItem {
        CartLineItem {
            name: name.into(),
            measurement_unit: unit.into(),
            amount,
        }
    }

    #[test]
    fn test_consolidate_merges_matching_identities() {
        // Cart: Recipe A (salt 10g, pepper 5g) and Recipe B (salt 20g, sugar 15g)
        let lines = consolidate(vec![
            item("salt", "g", 10),
            item("pepper", "g", 5),
            item("salt", "g", 20),
            item("sugar", "g", 15),
        ]);

        assert_eq!(
            lines,
            vec![
                AggregatedLine {
                    name: "pepper".into(),
                    amount: 5,
                    measurement_unit: "g".into()
                },
                AggregatedLine {
                    name: "salt".into(),
                    amount: 30,
                    measurement_unit: "g".into()
                },
                AggregatedLine {
                    name: "sugar".into(),
                    amount: 15,
                    measurement_unit: "g".into()
                },
            ]
        );
    }

    #[test]
    fn test_consolidate_never_merges_different_units() {
        let lines = consolidate(vec![item("flour", "g", 500), item("flour", "kg", 2)]);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].measurement_unit, "g");
        assert_eq!(lines[0].amount, 500);
        assert_eq!(lines[1].measurement_unit, "kg");
        assert_eq!(lines[1].amount, 2);
    }

    #[test]
    fn test_consolidate_is_case_sensitive() {
        let lines = consolidate(vec![item("Salt", "g", 10), item("salt", "g", 20)]);

        assert_eq!(lines.len(), 2);
        // Ordinal comparison puts uppercase first
        assert_eq!(lines[0].name, "Salt");
        assert_eq!(lines[1].name, "salt");
    }

    #[test]
    fn test_consolidate_empty_input_yields_empty_output() {
        assert!(consolidate(vec![]).is_empty());
    }

    #[test]
    fn test_consolidate_is_deterministic() {
        let input = || {
            vec![
                item("onion", "pcs", 3),
                item("salt", "g", 10),
                item("onion", "pcs", 2),
                item("butter", "g", 50),
            ]
        };

        assert_eq!(consolidate(input()), consolidate(input()));
    }

    #[test]
    fn test_render_text_output_shape() {
        let lines = vec![
            AggregatedLine {
                name: "pepper".into(),
                amount: 5,
                measurement_unit: "g".into(),
            },
            AggregatedLine {
                name: "salt".into(),
                amount: 30,
                measurement_unit: "g".into(),
            },
        ];

        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        let text = render_text(&lines, date);

        assert!(text.starts_with("Shopping list for 14-03-2025\n\n"));
        assert!(text.contains("\u{2022} pepper (g) - 5\n"));
        assert!(text.contains("\u{2022} salt (g) - 30\n"));
        // Repeat renders are byte-identical
        assert_eq!(text, render_text(&lines, date));
    }
}
