//! Transaction and category records as stored in the backend tables

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// Label used wherever a transaction has no resolved category
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Columns requested for every transaction read, with the category joined in.
pub const TRANSACTION_COLUMNS: &str =
    "id,user_id,amount,type,date,description,category_id,category:category_id(id,name)";

/// Columns requested for category listings
pub const CATEGORY_COLUMNS: &str = "id,name";

/// Direction of a transaction.
///
/// Only `expense` rows are written by the app today; `income` is accepted on
/// read so older rows still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

/// A category row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// The category embedded in a transaction read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

impl From<Category> for CategoryRef {
    fn from(category: Category) -> Self {
        Self {
            id: Some(category.id),
            name: category.name,
        }
    }
}

/// A transaction row, as returned by the table store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    #[serde(rename = "type", default)]
    pub kind: TransactionKind,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "embedded_category")]
    pub category: Option<CategoryRef>,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

impl Transaction {
    /// The label this transaction is grouped and displayed under.
    pub fn category_label(&self) -> &str {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CATEGORY)
    }

    /// Merge `patch` over this entry, keeping fields the patch leaves unset.
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(category_id) = &patch.category_id {
            self.category_id = Some(category_id.clone());
        }
        if let Some(category) = &patch.category {
            self.category = category.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
    }
}

/// The embedded category arrives as an object, a zero-or-one element array,
/// or null depending on how the join was declared.
fn embedded_category<'de, D>(deserializer: D) -> std::result::Result<Option<CategoryRef>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Embedded {
        One(CategoryRef),
        Many(Vec<CategoryRef>),
    }

    Ok(
        match Option::<Embedded>::deserialize(deserializer)? {
            Some(Embedded::One(category)) => Some(category),
            Some(Embedded::Many(categories)) => categories.into_iter().next(),
            None => None,
        },
    )
}

/// Fields merged over a cached transaction; `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    pub category_id: Option<String>,
    pub category: Option<Option<CategoryRef>>,
    pub date: Option<NaiveDate>,
    pub description: Option<Option<String>>,
}

impl From<&Transaction> for TransactionPatch {
    /// A patch overwriting every mutable field with `row`'s values.
    fn from(row: &Transaction) -> Self {
        Self {
            amount: Some(row.amount),
            kind: Some(row.kind),
            category_id: row.category_id.clone(),
            category: Some(row.category.clone()),
            date: Some(row.date),
            description: Some(row.description.clone()),
        }
    }
}

/// User input for creating or overwriting a transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionInput {
    pub amount: Option<f64>,
    pub kind: TransactionKind,
    pub category_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
}

impl TransactionInput {
    pub fn new(amount: f64, category_id: &str) -> Self {
        Self {
            amount: Some(amount),
            category_id: Some(category_id.to_string()),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Check required fields and fill defaults; `today` stands in for a
    /// missing date.
    pub fn validate(&self, today: NaiveDate) -> Result<NewTransaction> {
        let amount = self
            .amount
            .ok_or_else(|| Error::validation("amount", "is required"))?;
        if !amount.is_finite() {
            return Err(Error::validation("amount", "must be a number"));
        }

        let category_id = self
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::validation("category_id", "is required"))?;

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        Ok(NewTransaction {
            amount,
            kind: self.kind,
            category_id: category_id.to_string(),
            date: self.date.unwrap_or(today),
            description,
        })
    }
}

/// A validated row body for insert and full-overwrite update.
///
/// `description` always serializes, so an update clears a removed
/// description instead of keeping the old one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category_id: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Insert body: the validated fields plus the owner.
#[derive(Debug, Serialize)]
pub(crate) struct OwnedRow<'a> {
    pub user_id: &'a str,
    #[serde(flatten)]
    pub fields: &'a NewTransaction,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn row(category: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "t1",
            "user_id": "u1",
            "amount": 12.5,
            "type": "expense",
            "date": "2024-05-03",
            "description": null,
            "category_id": "c1",
            "category": category
        })
    }

    #[test]
    fn embedded_category_as_object() {
        let t: Transaction = serde_json::from_value(row(json!({"id": "c1", "name": "Food"}))).unwrap();
        assert_eq!(t.category_label(), "Food");
        assert_eq!(t.date, date(2024, 5, 3));
    }

    #[test]
    fn embedded_category_as_array() {
        let t: Transaction = serde_json::from_value(row(json!([{"name": "Food"}]))).unwrap();
        assert_eq!(t.category_label(), "Food");

        let t: Transaction = serde_json::from_value(row(json!([]))).unwrap();
        assert_eq!(t.category, None);
        assert_eq!(t.category_label(), UNKNOWN_CATEGORY);
    }

    #[test]
    fn embedded_category_null_or_missing() {
        let t: Transaction = serde_json::from_value(row(json!(null))).unwrap();
        assert_eq!(t.category_label(), UNKNOWN_CATEGORY);

        let mut value = row(json!(null));
        value.as_object_mut().unwrap().remove("category");
        value.as_object_mut().unwrap().remove("type");
        let t: Transaction = serde_json::from_value(value).unwrap();
        assert_eq!(t.category, None);
        assert_eq!(t.kind, TransactionKind::Expense);
    }

    #[test]
    fn validate_requires_amount_and_category() {
        let today = date(2024, 5, 10);

        let missing_amount = TransactionInput {
            category_id: Some("c1".into()),
            ..Default::default()
        };
        assert!(matches!(
            missing_amount.validate(today),
            Err(Error::Validation { field: "amount", .. })
        ));

        let blank_category = TransactionInput::new(5.0, "  ");
        assert!(matches!(
            blank_category.validate(today),
            Err(Error::Validation { field: "category_id", .. })
        ));

        let nan = TransactionInput::new(f64::NAN, "c1");
        assert!(matches!(
            nan.validate(today),
            Err(Error::Validation { field: "amount", .. })
        ));
    }

    #[test]
    fn validate_defaults_date_to_today() {
        let today = date(2024, 5, 10);
        let valid = TransactionInput::new(5.0, "c1")
            .with_description("  ")
            .validate(today)
            .unwrap();
        assert_eq!(valid.date, today);
        assert_eq!(valid.description, None);
        assert_eq!(valid.kind, TransactionKind::Expense);

        let dated = TransactionInput::new(5.0, "c1")
            .with_date(date(2024, 4, 30))
            .validate(today)
            .unwrap();
        assert_eq!(dated.date, date(2024, 4, 30));
    }

    #[test]
    fn owned_row_serializes_date_only() {
        let fields = TransactionInput::new(9.99, "c1")
            .with_date(date(2024, 5, 1))
            .validate(date(2024, 5, 1))
            .unwrap();
        let body = serde_json::to_value(OwnedRow {
            user_id: "u1",
            fields: &fields,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "user_id": "u1",
                "amount": 9.99,
                "type": "expense",
                "category_id": "c1",
                "date": "2024-05-01",
                "description": null
            })
        );
    }

    #[test]
    fn apply_merges_only_set_fields() {
        let mut t: Transaction = serde_json::from_value(row(json!({"name": "Food"}))).unwrap();
        t.apply(&TransactionPatch {
            amount: Some(40.0),
            description: Some(Some("lunch".into())),
            ..Default::default()
        });
        assert_eq!(t.amount, 40.0);
        assert_eq!(t.description.as_deref(), Some("lunch"));
        assert_eq!(t.category_label(), "Food");
        assert_eq!(t.date, date(2024, 5, 3));
    }
}
