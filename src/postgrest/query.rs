//! Request builders for table reads and writes

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder};
use crate::postgrest::filter::*;

/// Connection details shared by every builder of one table
#[derive(Debug, Clone)]
pub(crate) struct Target {
    pub url: String,
    pub key: String,
    pub token: Option<String>,
    pub schema: String,
    pub client: Client,
}

impl Target {
    /// Attach key, bearer token and schema headers.
    ///
    /// Without a user token the anon key is sent as the bearer, which the
    /// row-level policies treat as a signed-out caller.
    fn authorize<'a>(&self, fetch: FetchBuilder<'a>, writes: bool) -> FetchBuilder<'a> {
        let fetch = fetch
            .header("apikey", &self.key)
            .bearer_auth(self.token.as_deref().unwrap_or(&self.key));
        if self.schema == "public" {
            fetch
        } else if writes {
            fetch.header("Content-Profile", &self.schema)
        } else {
            fetch.header("Accept-Profile", &self.schema)
        }
    }
}

/// Writes ask for the affected rows back so callers can count them
const RETURN_REPRESENTATION: &str = "return=representation";

/// Query parameters collected by a builder
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter to the query
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    pub fn add_filter(&mut self, filter: Filter) {
        self.params.push(filter.to_param());
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    target: Target,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(target: Target, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);
        Self { target, query }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.query
            .add_filter(Filter::new(column, FilterOperator::Eq, value));
        self
    }

    /// Filter rows where column is greater than or equal to a value
    pub fn gte<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.query
            .add_filter(Filter::new(column, FilterOperator::Gte, value));
        self
    }

    /// Filter rows where column is less than a value
    pub fn lt<T: ToString>(&mut self, column: &str, value: T) -> &mut Self {
        self.query
            .add_filter(Filter::new(column, FilterOperator::Lt, value));
        self
    }

    /// Order the results by a column
    pub fn order(&mut self, column: &str, order: SortOrder) -> &mut Self {
        self.query
            .add_param("order", &format!("{}.{}", column, order.as_str()));
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = Fetch::get(&self.target.client, &self.target.url)
            .query(self.query.get_params());
        self.target
            .authorize(fetch, false)
            .execute::<Vec<T>>()
            .await
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    target: Target,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self {
            target,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Columns of the returned representation
    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.query.add_param("select", columns);
        self
    }

    /// Execute the insert and return the created rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = Fetch::post(&self.target.client, &self.target.url)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(self.query.get_params())
            .json(&self.values)?;
        self.target
            .authorize(fetch, true)
            .execute::<Vec<R>>()
            .await
    }
}

/// Builder for UPDATE queries
pub struct UpdateBuilder<T: Serialize> {
    target: Target,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self {
            target,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.query
            .add_filter(Filter::new(column, FilterOperator::Eq, value));
        self
    }

    /// Columns of the returned representation
    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.query.add_param("select", columns);
        self
    }

    /// Execute the update and return the rows it touched
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = Fetch::patch(&self.target.client, &self.target.url)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(self.query.get_params())
            .json(&self.values)?;
        self.target
            .authorize(fetch, true)
            .execute::<Vec<R>>()
            .await
    }
}

/// Builder for DELETE queries
pub struct DeleteBuilder {
    target: Target,
    query: QueryBuilder,
}

impl DeleteBuilder {
    pub(crate) fn new(target: Target) -> Self {
        Self {
            target,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(&mut self, column: &str, value: V) -> &mut Self {
        self.query
            .add_filter(Filter::new(column, FilterOperator::Eq, value));
        self
    }

    /// Execute the delete and return the removed rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = Fetch::delete(&self.target.client, &self.target.url)
            .header("Prefer", RETURN_REPRESENTATION)
            .query(self.query.get_params());
        self.target
            .authorize(fetch, true)
            .execute::<Vec<R>>()
            .await
    }
}
