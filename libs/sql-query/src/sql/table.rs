// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Display, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{QueryError, QueryResult};

use super::{ExpressionBuilder, SQLBuilder};

static TABLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?P<schema>[A-Za-z_][A-Za-z0-9_$]*)\.)?(?P<name>[A-Za-z_][A-Za-z0-9_$]*)(?:\s+AS\s+(?P<alias>[A-Za-z_][A-Za-z0-9_$]*))?\s*$",
    )
    .unwrap()
});

/// A table (or view) such as `orders` or `shop.orders AS o`.
///
/// Two tables are the same reference when their [`TableKey`]s are equal, which is how joins are
/// deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    name: String,
    schema: Option<String>,
    alias: Option<String>,
    #[serde(default)]
    is_view: bool,
}

/// The canonical identity of a table reference: its complete name, followed by ` AS <alias>`
/// for aliased references (so the same table may be joined twice under different aliases).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableKey(String);

impl Table {
    /// A table with the given name. The name is used as is; use [`Table::parse`] (or
    /// [`IntoTable`] on a string) to validate user-supplied references.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            alias: None,
            is_view: false,
        }
    }

    /// A view with the given name. Some engines reject `ORDER BY` in derived tables over
    /// views, which [`Select::count`](crate::Select::count) takes into account.
    pub fn view(name: impl Into<String>) -> Self {
        Self {
            is_view: true,
            ..Self::new(name)
        }
    }

    /// Parse a reference of the form `[<schema>.]<name>[ AS <alias>]`.
    pub fn parse(reference: &str) -> QueryResult<Self> {
        let captures = TABLE_REFERENCE.captures(reference).ok_or_else(|| {
            QueryError::UnresolvableReference(format!("Invalid table reference `{reference}`"))
        })?;

        let table = Self {
            name: captures["name"].to_string(),
            schema: captures.name("schema").map(|m| m.as_str().to_string()),
            alias: captures.name("alias").map(|m| m.as_str().to_string()),
            is_view: false,
        };
        Ok(table.without_redundant_alias())
    }

    pub fn with_schema(self, schema: impl Into<String>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..self
        }
    }

    /// Alias the table. Without a schema, an alias equal to the name (`users AS users`) is
    /// dropped, as it would render and qualify columns exactly like the plain table.
    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self
        }
        .without_redundant_alias()
    }

    fn without_redundant_alias(mut self) -> Self {
        if self.schema.is_none() && self.alias.as_deref() == Some(self.name.as_str()) {
            self.alias = None;
        }
        self
    }

    pub fn as_view(self, is_view: bool) -> Self {
        Self { is_view, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        match &self.alias {
            // Only reachable through deserialization
            Some(alias) if *alias == self.name && self.schema.is_none() => None,
            alias => alias.as_deref(),
        }
    }

    pub fn is_view(&self) -> bool {
        self.is_view
    }

    /// The schema-qualified name, without alias
    pub fn complete_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }

    /// The name columns of this table are qualified with in a query
    pub fn qualifier(&self) -> String {
        match self.alias() {
            Some(alias) => alias.to_string(),
            None => self.complete_name(),
        }
    }

    pub fn key(&self) -> TableKey {
        match self.alias() {
            Some(alias) => TableKey(format!("{} AS {alias}", self.complete_name())),
            None => TableKey(self.complete_name()),
        }
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key().0)
    }
}

impl TableKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ExpressionBuilder for Table {
    /// Build a table reference for the `FROM`/`JOIN` clause i.e. `<table>[ AS <alias>]`.
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_table_name(self);

        if let Some(alias) = self.alias() {
            builder.push_str(" AS ");
            builder.push_table_identifier(alias);
        }
    }
}

/// Resolve a loosely-typed table reference (a name, `schema.name`, or an already built
/// [`Table`]) to a [`Table`].
pub trait IntoTable {
    fn into_table(self) -> QueryResult<Table>;
}

impl IntoTable for Table {
    fn into_table(self) -> QueryResult<Table> {
        Ok(self)
    }
}

impl IntoTable for &Table {
    fn into_table(self) -> QueryResult<Table> {
        Ok(self.clone())
    }
}

impl IntoTable for &str {
    fn into_table(self) -> QueryResult<Table> {
        Table::parse(self)
    }
}

impl IntoTable for String {
    fn into_table(self) -> QueryResult<Table> {
        Table::parse(&self)
    }
}

impl IntoTable for &String {
    fn into_table(self) -> QueryResult<Table> {
        Table::parse(self)
    }
}
