//! The document store's query primitive.
//!
//! The store understands a deliberately small constraint language:
//! - equality and set-membership on any field
//! - `>=` / `<=` on at most ONE field per query
//! - a single ordering, with document id as the implicit tie-break
//! - an exclusive boundary that pages forward (`After`) or backward (`Before`)
//!
//! Anything richer (text search, array membership combined with other
//! constraints) has to happen after the records come back.

use crate::error::{Result, StoreError};
use crate::types::{Channel, ChannelId, Field, FieldValue, SortDirection, SortField};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::fmt;

/// Comparison operators the store can evaluate natively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    In,
    Gte,
    Lte,
}

impl Operator {
    /// Range operators count against the one-range-field limit
    pub fn is_range(&self) -> bool {
        matches!(self, Operator::Gte | Operator::Lte)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "==",
            Operator::In => "in",
            Operator::Gte => ">=",
            Operator::Lte => "<=",
        }
    }
}

/// One `(field, operator, value)` predicate of a store query
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub field: Field,
    pub op: Operator,
    pub value: FieldValue,
}

impl Constraint {
    pub fn equals(field: Field, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            op: Operator::Equals,
            value: value.into(),
        }
    }

    pub fn one_of(field: Field, values: Vec<String>) -> Self {
        Self {
            field,
            op: Operator::In,
            value: FieldValue::List(values),
        }
    }

    pub fn gte(field: Field, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            op: Operator::Gte,
            value: value.into(),
        }
    }

    pub fn lte(field: Field, value: impl Into<FieldValue>) -> Self {
        Self {
            field,
            op: Operator::Lte,
            value: value.into(),
        }
    }

    /// Evaluate this constraint against a document.
    ///
    /// Type mismatches never match; they are not errors.
    pub fn matches(&self, channel: &Channel) -> bool {
        let actual = channel.value(self.field);
        match self.op {
            Operator::Equals => actual == self.value,
            Operator::In => match (&actual, &self.value) {
                (FieldValue::Text(text), FieldValue::List(allowed)) => allowed.contains(text),
                _ => false,
            },
            Operator::Gte => match (actual.as_number(), self.value.as_number()) {
                (Some(a), Some(bound)) => a >= bound,
                _ => false,
            },
            Operator::Lte => match (actual.as_number(), self.value.as_number()) {
                (Some(a), Some(bound)) => a <= bound,
                _ => false,
            },
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op.as_str(), self.value)
    }
}

/// Check the store's structural rules on a constraint list.
///
/// Returns the single range-constrained field, if any.
pub fn validate_constraints(constraints: &[Constraint]) -> Result<Option<Field>> {
    let mut range_field: Option<Field> = None;
    for constraint in constraints {
        if constraint.op == Operator::In {
            match &constraint.value {
                FieldValue::List(values) if !values.is_empty() => {}
                _ => {
                    return Err(StoreError::InvalidQuery {
                        reason: format!("'in' on {} needs a non-empty list", constraint.field),
                    });
                }
            }
        }
        if !constraint.op.is_range() {
            continue;
        }
        match range_field {
            Some(existing) if existing != constraint.field => {
                return Err(StoreError::InvalidQuery {
                    reason: format!(
                        "range filters on both {} and {}; only one range field is allowed",
                        existing, constraint.field
                    ),
                });
            }
            _ => range_field = Some(constraint.field),
        }
    }
    Ok(range_field)
}

// =============================================================================
// Ordering and boundaries
// =============================================================================

/// Which side of the boundary a query reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    /// Records strictly after the boundary, first `limit` of them
    #[default]
    After,
    /// Records strictly before the boundary, LAST `limit` of them
    Before,
}

/// Position of a record in a sorted result: sort key plus id tie-break.
///
/// Store adapters rebuild their native cursor from this value.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub sort_value: f64,
    pub id: ChannelId,
}

impl Boundary {
    pub fn of(channel: &Channel, sort_field: SortField) -> Self {
        Self {
            sort_value: sort_field.key(channel),
            id: channel.id.clone(),
        }
    }
}

/// Compare two positions under an ordering.
///
/// Ties on the sort key fall back to the document id, in the same
/// direction as the sort.
pub fn compare_positions(a: &Boundary, b: &Boundary, direction: SortDirection) -> Ordering {
    let ascending = a
        .sort_value
        .total_cmp(&b.sort_value)
        .then_with(|| a.id.cmp(&b.id));
    match direction {
        SortDirection::Asc => ascending,
        SortDirection::Desc => ascending.reverse(),
    }
}

/// Everything one page query needs
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub collection: String,
    pub constraints: Vec<Constraint>,
    pub sort_field: SortField,
    pub direction: SortDirection,
    pub limit: usize,
    pub boundary: Option<Boundary>,
    pub mode: BoundaryMode,
}

impl PageQuery {
    pub fn new(collection: impl Into<String>, sort_field: SortField, direction: SortDirection) -> Self {
        Self {
            collection: collection.into(),
            constraints: Vec::new(),
            sort_field,
            direction,
            limit: 1,
            boundary: None,
            mode: BoundaryMode::After,
        }
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary, mode: BoundaryMode) -> Self {
        self.boundary = Some(boundary);
        self.mode = mode;
        self
    }
}

// =============================================================================
// Store trait
// =============================================================================

/// The two primitives every channel store adapter provides.
///
/// `Send + Sync` so one store can be shared behind an `Arc` by the page
/// fetch and the count query running concurrently.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    /// Ordered records matching the query, honouring `limit` and the boundary.
    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Channel>>;

    /// Number of records matching the constraints, ignoring limit and boundary.
    async fn count_matching(&self, collection: &str, constraints: &[Constraint]) -> Result<u64>;
}
