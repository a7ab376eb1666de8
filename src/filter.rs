//! Pagination and ordering filter with defaults.
//!
//! A [`Filter`] is the `(limit, offset, order)` triple applied to list queries.
//! It can be built directly or read from textual query parameters, and is
//! always normalized so that `limit` and `order` have sensible values.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use log::warn;
use sea_orm::sea_query::{Alias, Expr, SimpleExpr};
use sea_orm::{Order, QueryOrder, QuerySelect};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LIMIT, DEFAULT_ORDER, QUERY_LIMIT, QUERY_OFFSET, QUERY_ORDER};
use crate::error::{Error, Result};

/// Normalized pagination/order triple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Maximum number of rows
    pub limit: u64,
    /// Number of rows to skip
    pub offset: u64,
    /// Sort expression, e.g. `"name asc, id desc"`
    pub order: String,
}

impl Filter {
    pub fn new(limit: u64, offset: u64, order: impl Into<String>) -> Self {
        Self {
            limit,
            offset,
            order: order.into(),
        }
    }

    /// Fill unset fields with their defaults.
    ///
    /// A zero `limit` becomes 100 and an empty `order` becomes `"id desc"`,
    /// qualified as `"<prefix>.id desc"` when a prefix is given. `offset` is
    /// kept as is.
    pub fn with_defaults(mut self, prefix: Option<&str>) -> Self {
        if self.limit == 0 {
            self.limit = DEFAULT_LIMIT;
        }
        if self.order.is_empty() {
            self.order = qualify(prefix, DEFAULT_ORDER);
        }
        self
    }

    /// Read `limit`, `offset` and `order` from query parameters.
    ///
    /// Missing or empty `limit`/`offset` count as unset. A missing `order`
    /// becomes `"id desc"` before the prefix is applied, so a prefix always
    /// qualifies the resulting order.
    ///
    /// `limit` and `offset` must be non-negative integers: `-1` is rejected
    /// rather than read as "no limit". `order` must be a comma-separated list
    /// of `column [asc|desc]` terms, where a column is an identifier
    /// optionally qualified as `table.column`.
    ///
    /// # Errors
    /// Returns [`Error::BadRequest`] naming the offending parameter. No filter
    /// is produced in that case.
    pub fn from_query<Q>(params: &Q, prefix: Option<&str>) -> Result<Self>
    where
        Q: QueryParams + ?Sized,
    {
        let limit = parse_param(params, QUERY_LIMIT)?;
        let offset = parse_param(params, QUERY_OFFSET)?;

        let order = match params.query(QUERY_ORDER) {
            Some(order) if !order.is_empty() => order,
            _ => DEFAULT_ORDER,
        };

        let filter = Self::new(limit, offset, qualify(prefix, order)).with_defaults(None);
        order_terms(&filter.order)?;
        Ok(filter)
    }

    /// Apply limit, offset and order to a SeaORM query.
    ///
    /// Order columns are emitted as quoted identifiers. An order that does
    /// not parse is left out of the query entirely.
    pub fn apply<S>(&self, query: S) -> S
    where
        S: QuerySelect + QueryOrder,
    {
        let mut query = query.limit(self.limit).offset(self.offset);
        match order_terms(&self.order) {
            Ok(terms) => {
                for (column, order) in terms {
                    query = query.order_by(column, order);
                }
            }
            Err(e) => warn!("Ignoring filter order: {}", e),
        }
        query
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit={} offset={} order={}", self.limit, self.offset, self.order)
    }
}

/// Normalize a borrowed filter; see [`Filter::with_defaults`].
pub fn defaults_filter(filter: &Filter, prefix: Option<&str>) -> Filter {
    filter.clone().with_defaults(prefix)
}

/// Source of textual query parameters, such as an HTTP request's query string.
pub trait QueryParams {
    /// First value of `key`, if present.
    fn query(&self, key: &str) -> Option<&str>;
}

impl<S: BuildHasher> QueryParams for HashMap<String, String, S> {
    fn query(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

impl QueryParams for BTreeMap<String, String> {
    fn query(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }
}

/// Decoded `application/x-www-form-urlencoded` query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Parse a raw query string; a leading `?` is ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        Self {
            pairs: url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect(),
        }
    }
}

impl QueryParams for QueryString {
    fn query(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }
}

impl From<&str> for QueryString {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

fn parse_param<Q>(params: &Q, name: &'static str) -> Result<u64>
where
    Q: QueryParams + ?Sized,
{
    match params.query(name) {
        None | Some("") => Ok(0),
        Some(raw) => raw.parse().map_err(|_| Error::BadRequest {
            param: name,
            value: raw.to_string(),
        }),
    }
}

fn qualify(prefix: Option<&str>, order: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{}.{}", prefix, order),
        _ => order.to_string(),
    }
}

/// Split `"a asc, t.b desc, c"` into column/direction pairs.
fn order_terms(order: &str) -> Result<Vec<(SimpleExpr, Order)>> {
    let bad_order = || Error::BadRequest {
        param: QUERY_ORDER,
        value: order.to_string(),
    };

    order
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| {
            let mut words = term.split_whitespace();
            let column = words.next().and_then(column_expr).ok_or_else(bad_order)?;
            let direction = match words.next() {
                None => Order::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("asc") => Order::Asc,
                Some(dir) if dir.eq_ignore_ascii_case("desc") => Order::Desc,
                Some(_) => return Err(bad_order()),
            };
            if words.next().is_some() {
                return Err(bad_order());
            }
            Ok((column, direction))
        })
        .collect()
}

/// `column` or `table.column` as a quoted column reference.
fn column_expr(name: &str) -> Option<SimpleExpr> {
    let expr = match name.split_once('.') {
        Some((table, column)) if is_identifier(table) && is_identifier(column) => {
            Expr::col((Alias::new(table), Alias::new(column)))
        }
        None if is_identifier(name) => Expr::col(Alias::new(name)),
        _ => return None,
    };
    Some(expr.into())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
