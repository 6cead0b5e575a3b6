//! Chart data for the days-until-expiration bar chart.
//!
//! This crate contains the pure transformation from stored products to
//! renderer-ready data points (no IO, no rendering).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelflife_core::{Clock, Product};

/// Series label shown by the renderer.
pub const DEFAULT_LABEL: &str = "消費期限までの日数";

/// One bar: input position and days remaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Zero-based index in the input sequence.
    pub position: usize,
    /// Days remaining; negative for expired products.
    pub value: i64,
}

impl ChartPoint {
    /// `(x, y)` pair in the float shape bar-chart renderers expect.
    pub fn as_bar_entry(&self) -> (f32, f32) {
        (self.position as f32, self.value as f32)
    }
}

/// Labelled series handed to the chart renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<ChartPoint>,
}

/// One point per product, in input order. Nothing is filtered out.
pub fn chart_points(products: &[Product], today: NaiveDate) -> Vec<ChartPoint> {
    products
        .iter()
        .enumerate()
        .map(|(position, product)| ChartPoint {
            position,
            value: product.days_remaining(today),
        })
        .collect()
}

/// Builder reading "today" from a clock at build time.
#[derive(Debug, Clone)]
pub struct ExpirationChart<C> {
    clock: C,
    label: String,
}

impl<C: Clock> ExpirationChart<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            label: DEFAULT_LABEL.to_string(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn build(&self, products: &[Product]) -> ChartSeries {
        ChartSeries {
            label: self.label.clone(),
            points: chart_points(products, self.clock.today()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;
    use shelflife_core::{FixedClock, ProductId};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn product(id: i64, expiration: NaiveDate) -> Product {
        Product::new(ProductId::new(id), "p", expiration)
    }

    #[test]
    fn empty_input_yields_empty_series() {
        assert!(chart_points(&[], today()).is_empty());
    }

    #[test]
    fn expired_products_keep_negative_values() {
        let products = vec![
            product(1, today() - Days::new(2)),
            product(2, today()),
            product(3, today() + Days::new(9)),
        ];

        let points = chart_points(&products, today());

        assert_eq!(
            points,
            vec![
                ChartPoint { position: 0, value: -2 },
                ChartPoint { position: 1, value: 0 },
                ChartPoint { position: 2, value: 9 },
            ]
        );
        assert_eq!(points[0].as_bar_entry(), (0.0, -2.0));
    }

    #[test]
    fn series_uses_clock_date_and_label() {
        let products = vec![product(1, today() + Days::new(3))];

        let series = ExpirationChart::new(FixedClock(today())).build(&products);
        assert_eq!(series.label, DEFAULT_LABEL);
        assert_eq!(series.points[0].value, 3);

        let later = ExpirationChart::new(FixedClock(today() + Days::new(1)))
            .with_label("days")
            .build(&products);
        assert_eq!(later.label, "days");
        assert_eq!(later.points[0].value, 2);
    }

    #[test]
    fn series_serializes_for_the_renderer() {
        let series = ChartSeries {
            label: "days".to_string(),
            points: vec![ChartPoint { position: 0, value: 4 }],
        };

        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "label": "days", "points": [{ "position": 0, "value": 4 }] })
        );
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: N products give N points with positions 0..N in order.
            #[test]
            fn one_point_per_product_in_order(offsets in proptest::collection::vec(0u64..400, 0..50)) {
                let products: Vec<_> = offsets
                    .iter()
                    .enumerate()
                    .map(|(i, d)| product(i as i64, today() + Days::new(*d)))
                    .collect();

                let points = chart_points(&products, today());

                prop_assert_eq!(points.len(), products.len());
                for (i, point) in points.iter().enumerate() {
                    prop_assert_eq!(point.position, i);
                    prop_assert_eq!(point.value, offsets[i] as i64);
                }
            }
        }
    }
}
