//! Row filters and select queries for the hosted data API.
//!
//! Queries are plain data so that the HTTP client can encode them as
//! PostgREST query parameters and the in-memory test store can evaluate them.

/// The collections (tables) the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Income and expense transactions.
    Expenses,
    /// Partner links between two users.
    Connections,
    /// Contributions towards the shared savings goal.
    MarriageSavings,
    /// Public user profiles, used to look up users by email.
    Profiles,
}

impl Collection {
    /// The table name used by the data API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Expenses => "expenses",
            Collection::Connections => "connections",
            Collection::MarriageSavings => "marriage_savings",
            Collection::Profiles => "profiles",
        }
    }
}

/// A condition that a row must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// The column equals the value.
    Eq(&'static str, String),
    /// The column equals the value, ignoring ASCII case.
    EqIgnoreCase(&'static str, String),
    /// The column is greater than or equal to the value.
    Gte(&'static str, String),
    /// The column is strictly less than the value.
    Lt(&'static str, String),
    /// At least one of the inner filters holds.
    AnyOf(Vec<Filter>),
}

impl Filter {
    /// Match rows where `column` equals `value`.
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Filter::Eq(column, value.to_string())
    }

    /// Match rows where `column` equals `value` ignoring case, e.g. emails.
    pub fn eq_ignore_case(column: &'static str, value: impl ToString) -> Self {
        Filter::EqIgnoreCase(column, value.to_string())
    }

    /// Match rows where `column` is at least `value`.
    pub fn gte(column: &'static str, value: impl ToString) -> Self {
        Filter::Gte(column, value.to_string())
    }

    /// Match rows where `column` is less than `value`.
    pub fn lt(column: &'static str, value: impl ToString) -> Self {
        Filter::Lt(column, value.to_string())
    }

    /// Match rows where any of `filters` holds.
    pub fn any_of(filters: Vec<Filter>) -> Self {
        Filter::AnyOf(filters)
    }

    /// Encode the filter as a single PostgREST query parameter.
    ///
    /// For example, `Filter::eq("id", 1)` becomes `("id", "eq.1")` and
    /// `Filter::any_of` becomes `("or", "(a.eq.x,b.eq.y)")`.
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(column, value) => (column.to_string(), format!("eq.{value}")),
            Filter::EqIgnoreCase(column, value) => (
                column.to_string(),
                format!("ilike.{}", escape_like_pattern(value)),
            ),
            Filter::Gte(column, value) => (column.to_string(), format!("gte.{value}")),
            Filter::Lt(column, value) => (column.to_string(), format!("lt.{value}")),
            Filter::AnyOf(filters) => {
                let inner = filters
                    .iter()
                    .map(Filter::to_nested_condition)
                    .collect::<Vec<_>>()
                    .join(",");

                ("or".to_owned(), format!("({inner})"))
            }
        }
    }

    fn to_nested_condition(&self) -> String {
        match self {
            Filter::Eq(column, value) => format!("{column}.eq.{}", quote_reserved(value)),
            Filter::EqIgnoreCase(column, value) => format!(
                "{column}.ilike.{}",
                quote_reserved(&escape_like_pattern(value))
            ),
            Filter::Gte(column, value) => format!("{column}.gte.{}", quote_reserved(value)),
            Filter::Lt(column, value) => format!("{column}.lt.{}", quote_reserved(value)),
            Filter::AnyOf(filters) => {
                let inner = filters
                    .iter()
                    .map(Filter::to_nested_condition)
                    .collect::<Vec<_>>()
                    .join(",");

                format!("or({inner})")
            }
        }
    }
}

/// Escape the wildcards of a LIKE pattern so that `value` only matches itself.
fn escape_like_pattern(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Values inside a logical filter must be double quoted when they contain
/// characters that PostgREST treats as separators.
fn quote_reserved(value: &str) -> String {
    if value.contains([',', '(', ')', '"', '\\']) {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    } else {
        value.to_owned()
    }
}

/// The sort order of a select query.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// The column to sort by.
    pub column: &'static str,
    /// Sort smallest first when true.
    pub ascending: bool,
}

/// A read query against a single collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    /// The collection to read from.
    pub collection: Collection,
    /// Rows must match all of these filters.
    pub filters: Vec<Filter>,
    /// The sort order, or the backend's default order if `None`.
    pub order: Option<Order>,
    /// The maximum number of rows to return.
    pub limit: Option<usize>,
}

impl Select {
    /// Select every row of `collection`.
    pub fn from(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Add a filter that rows must match.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sort by `column`, smallest first.
    pub fn order_asc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            ascending: true,
        });
        self
    }

    /// Sort by `column`, largest first.
    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            ascending: false,
        });
        self
    }

    /// Return at most `limit` rows.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The query parameters for a PostgREST `GET` request.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_owned(), "*".to_owned())];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));

        if let Some(order) = &self.order {
            let direction = if order.ascending { "asc" } else { "desc" };
            pairs.push(("order".to_owned(), format!("{}.{direction}", order.column)));
        }

        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }

        pairs
    }
}
