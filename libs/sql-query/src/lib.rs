// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

/// The core idea in this library is that of a [Select] tree, which along with its
/// [Filter] trees, allows declaring a query by composing nodes through a fluent API
/// instead of concatenating strings. A [Select] owns its own filter, its ordering,
/// grouping and paging, and a map of joined [Select]s (one per joined table), so
/// that a join graph is built incrementally and never references the same table
/// twice.
///
/// Turning a tree into SQL text is the job of a [Renderer]. All traversal logic is
/// shared; a dialect only decides how identifiers are quoted (see [MySqlRenderer]
/// and [PostgresRenderer]). The library never executes the generated SQL.
///
/// For example, the following builds a query over `orders` joined to `users`:
///
/// ```ignore
/// let mut select = Select::new(Table::new("orders"));
/// select.filter().equals("status", "paid")?;
/// select
///     .join("users", JoinSpec::new().on("user_id").references("id"))?
///     .add_column("name")?;
/// let sql = MySqlRenderer.render(&select);
/// ```
#[macro_use]
mod sql;
mod dialect;

pub mod query_error;

/// Public types at the root level of this crate
pub use dialect::DialectKind;
pub use query_error::{QueryError, QueryResult};

pub use sql::{
    ExpressionBuilder, SQLBuilder,
    column::{Column, IntoColumn, IntoColumns},
    filter::{
        Between, BooleanFlag, ComparisonOperator, Comparison, Conjunction, Filter, NullCheck,
    },
    filter_factory::{DefaultFilterFactory, FilterFactory},
    join::{JoinSpec, JoinType},
    limit::Limit,
    order::{OrderBy, Ordering},
    renderer::{GenericRenderer, MySqlRenderer, PostgresRenderer, Renderer},
    select::Select,
    sql_value::{Operand, SqlValue},
    table::{IntoTable, Table, TableKey},
};
