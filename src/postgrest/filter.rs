//! Filter operations for table queries

use std::fmt;

/// Operator for filter expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    /// Equal to
    Eq,

    /// Greater than or equal to
    Gte,

    /// Less than
    Lt,
}

impl FilterOperator {
    /// Convert the operator to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Gte => "gte",
            FilterOperator::Lt => "lt",
        }
    }
}

/// A single `column=op.value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn new<T: ToString>(column: &str, operator: FilterOperator, value: T) -> Self {
        Self {
            column: column.to_string(),
            operator,
            value: value.to_string(),
        }
    }

    /// The query parameter this filter is sent as
    pub fn to_param(&self) -> (String, String) {
        (
            self.column.clone(),
            format!("{}.{}", self.operator.as_str(), self.value),
        )
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (column, condition) = self.to_param();
        write!(f, "{}={}", column, condition)
    }
}

/// Sort direction for `order`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_param() {
        let filter = Filter::new("date", FilterOperator::Gte, "2024-05-01");
        assert_eq!(
            filter.to_param(),
            ("date".to_string(), "gte.2024-05-01".to_string())
        );
        assert_eq!(filter.to_string(), "date=gte.2024-05-01");
        assert_eq!(Filter::new("id", FilterOperator::Eq, 7).to_string(), "id=eq.7");
        assert_eq!(
            Filter::new("date", FilterOperator::Lt, "2024-06-01").to_string(),
            "date=lt.2024-06-01"
        );
        assert_eq!(SortOrder::Ascending.as_str(), "asc");
    }
}
