//! Chart-ready aggregation of a month's transactions.
//!
//! Transactions are grouped by category label and summed; each group gets a
//! colour tag for the donut chart. The card projection formats single rows
//! for the list under the chart.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::Error;
use crate::model::Transaction;
use crate::month::MonthWindow;

/// Colours cycled by [`ColorStrategy::FixedPalette`] when none are given.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
];

/// How chart entries are coloured.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColorStrategy {
    /// Hues spread evenly around the wheel, one per entry.
    #[default]
    HueWheel,
    /// A fixed palette cycled by entry index.
    FixedPalette(Vec<String>),
}

impl ColorStrategy {
    pub fn default_palette() -> Self {
        ColorStrategy::FixedPalette(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }

    /// Colour for entry `index` out of `count`.
    pub fn color(&self, index: usize, count: usize) -> String {
        match self {
            ColorStrategy::HueWheel => {
                let hue = (index as f64 * 360.0) / count.max(1) as f64;
                format!("hsl({}, 70%, 50%)", hue)
            }
            ColorStrategy::FixedPalette(palette) if !palette.is_empty() => {
                palette[index % palette.len()].clone()
            }
            ColorStrategy::FixedPalette(_) => DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string(),
        }
    }
}

impl FromStr for ColorStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hue" => Ok(ColorStrategy::HueWheel),
            "fixed" => Ok(ColorStrategy::default_palette()),
            other => Err(Error::validation(
                "palette",
                format!("unknown palette {:?}, expected hue or fixed", other),
            )),
        }
    }
}

/// One slice of the donut chart
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub label: String,
    pub total: f64,
    pub color: String,
}

/// Group `transactions` by category label and sum their amounts.
///
/// Entries come out in the order their label first appears. Rows without a
/// category are grouped under [`crate::model::UNKNOWN_CATEGORY`].
pub fn aggregate(transactions: &[Transaction], colors: &ColorStrategy) -> Vec<CategoryTotal> {
    let mut order: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for transaction in transactions {
        let label = transaction.category_label();
        match index.get(label) {
            Some(&i) => order[i].1 += transaction.amount,
            None => {
                index.insert(label, order.len());
                order.push((label, transaction.amount));
            }
        }
    }

    let count = order.len();
    order
        .into_iter()
        .enumerate()
        .map(|(i, (label, total))| CategoryTotal {
            label: label.to_string(),
            total,
            color: colors.color(i, count),
        })
        .collect()
}

/// Sum of every entry's total
pub fn grand_total(totals: &[CategoryTotal]) -> f64 {
    totals.iter().map(|t| t.total).sum()
}

/// A transaction formatted for the list view
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionCard {
    pub id: String,
    pub amount: String,
    pub category: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Two-decimal currency display, e.g. `$12.50`
pub fn format_amount(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount)
    }
}

pub fn transaction_cards(transactions: &[Transaction]) -> Vec<TransactionCard> {
    transactions
        .iter()
        .map(|t| TransactionCard {
            id: t.id.clone(),
            amount: format_amount(t.amount),
            category: t.category_label().to_string(),
            date: t.date,
            description: t.description.clone(),
        })
        .collect()
}

/// Everything the dashboard shows for one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub window: MonthWindow,
    pub totals: Vec<CategoryTotal>,
    pub cards: Vec<TransactionCard>,
    pub grand_total: f64,
}

impl MonthSummary {
    pub fn build(window: MonthWindow, transactions: &[Transaction], colors: &ColorStrategy) -> Self {
        let totals = aggregate(transactions, colors);
        let grand_total = grand_total(&totals);
        Self {
            window,
            totals,
            cards: transaction_cards(transactions),
            grand_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
