// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::sync::LazyLock;

use regex::Regex;

use crate::{QueryError, QueryResult};

use super::{ExpressionBuilder, SQLBuilder, table::Table};

static COLUMN_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?P<qualifier>[A-Za-z_][A-Za-z0-9_$]*)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_$]*|\*)(?:\s+AS\s+(?P<alias>[A-Za-z_][A-Za-z0-9_$]*))?\s*$",
    )
    .unwrap()
});

/// A column-like concept covering any usage where a table column could be used: in the
/// projection, in a predicate, in `ORDER BY` or `GROUP BY`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    /// A column of a table such as `orders.total`, optionally aliased in the projection
    Named {
        table: Table,
        name: String,
        alias: Option<String>,
    },
    /// All columns of a table. If the table is `None` translates to `*`, else `<table>.*`
    Star(Option<Table>),
    /// An SQL expression such as `COUNT(*)` or `1 AS tmp`, rendered verbatim
    Raw(String),
}

impl Column {
    pub fn new(table: Table, name: impl Into<String>) -> Self {
        Self::Named {
            table,
            name: name.into(),
            alias: None,
        }
    }

    pub fn raw(expression: impl Into<String>) -> Self {
        Self::Raw(expression.into())
    }

    pub fn star(table: Option<Table>) -> Self {
        Self::Star(table)
    }

    /// Alias a named column. Other kinds of columns are returned unchanged (a raw expression
    /// carries its own alias, if any).
    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Named { table, name, .. } => Self::Named {
                table,
                name,
                alias: Some(alias.into()),
            },
            other => other,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Named { alias, .. } => alias.as_deref(),
            _ => None,
        }
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Named { table, .. } => Some(table),
            Self::Star(table) => table.as_ref(),
            Self::Raw(_) => None,
        }
    }

    /// Resolve a reference of the form `[<qualifier>.]<name>[ AS <alias>]` (or `*`) against
    /// `table`. An unqualified name, or one qualified with the table's own qualifier, binds to
    /// `table`; any other qualifier names a table of its own.
    ///
    /// An expression such as `COUNT(*) AS n` or `LOWER(name)` (anything with a parenthesis and
    /// no `;`) becomes a [`Column::Raw`] and is rendered verbatim.
    pub fn resolve(reference: &str, table: &Table) -> QueryResult<Self> {
        let unresolvable = || {
            QueryError::UnresolvableReference(format!(
                "Cannot resolve column `{reference}` against table `{table}`"
            ))
        };

        let Some(captures) = COLUMN_REFERENCE.captures(reference) else {
            return if reference.contains('(') && !reference.contains(';') {
                Ok(Self::Raw(reference.trim().to_string()))
            } else {
                Err(unresolvable())
            };
        };

        let bound_table = match captures.name("qualifier").map(|m| m.as_str()) {
            None => table.clone(),
            Some(qualifier) if qualifier == table.qualifier() || qualifier == table.name() => {
                table.clone()
            }
            Some(qualifier) => Table::new(qualifier),
        };

        let name = &captures["name"];
        let alias = captures.name("alias").map(|m| m.as_str().to_string());

        if name == "*" {
            return match alias {
                Some(_) => Err(unresolvable()),
                None => Ok(Self::Star(Some(bound_table))),
            };
        }

        Ok(Self::Named {
            table: bound_table,
            name: name.to_string(),
            alias,
        })
    }
}

impl ExpressionBuilder for Column {
    /// Build a reference to the column (as used in predicates and `GROUP BY`). Aliases are
    /// rendered only in the projection.
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Column::Named { table, name, .. } => builder.push_column(table, name),
            Column::Star(table) => {
                if let Some(table) = table {
                    builder.push_table_qualifier(table);
                    builder.push('.');
                }
                builder.push('*');
            }
            Column::Raw(expression) => builder.push_str(expression),
        }
    }
}

/// A column as it appears in the `SELECT` list i.e. `<column>[ AS <alias>]`.
pub(crate) struct Projection<'a>(pub &'a Column);

impl ExpressionBuilder for Projection<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        self.0.build(builder);

        if let Some(alias) = self.0.alias() {
            builder.push_str(" AS ");
            builder.push_column_identifier(alias);
        }
    }
}

/// Resolve a loosely-typed column reference (a name, an already built [`Column`]) against a
/// table context.
pub trait IntoColumn {
    fn into_column(self, table: &Table) -> QueryResult<Column>;
}

impl IntoColumn for Column {
    fn into_column(self, _table: &Table) -> QueryResult<Column> {
        Ok(self)
    }
}

impl IntoColumn for &Column {
    fn into_column(self, _table: &Table) -> QueryResult<Column> {
        Ok(self.clone())
    }
}

impl IntoColumn for &str {
    fn into_column(self, table: &Table) -> QueryResult<Column> {
        Column::resolve(self, table)
    }
}

impl IntoColumn for String {
    fn into_column(self, table: &Table) -> QueryResult<Column> {
        Column::resolve(&self, table)
    }
}

impl IntoColumn for &String {
    fn into_column(self, table: &Table) -> QueryResult<Column> {
        Column::resolve(self, table)
    }
}

/// Resolve one or many column references. A single reference becomes a one-element list.
pub trait IntoColumns {
    fn into_columns(self, table: &Table) -> QueryResult<Vec<Column>>;
}

impl IntoColumns for &str {
    fn into_columns(self, table: &Table) -> QueryResult<Vec<Column>> {
        Ok(vec![self.into_column(table)?])
    }
}

impl IntoColumns for String {
    fn into_columns(self, table: &Table) -> QueryResult<Vec<Column>> {
        Ok(vec![self.into_column(table)?])
    }
}

impl IntoColumns for Column {
    fn into_columns(self, _table: &Table) -> QueryResult<Vec<Column>> {
        Ok(vec![self])
    }
}

impl<T: IntoColumn> IntoColumns for Vec<T> {
    fn into_columns(self, table: &Table) -> QueryResult<Vec<Column>> {
        self.into_iter().map(|c| c.into_column(table)).collect()
    }
}

impl<T: IntoColumn, const N: usize> IntoColumns for [T; N] {
    fn into_columns(self, table: &Table) -> QueryResult<Vec<Column>> {
        self.into_iter().map(|c| c.into_column(table)).collect()
    }
}
