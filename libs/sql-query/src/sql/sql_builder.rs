// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, renderer::Renderer, table::Table};

/// Accumulates the SQL text for a tree of [`ExpressionBuilder`]s. Identifiers go through the
/// renderer's quoting hooks, everything else is pushed verbatim.
pub struct SQLBuilder<'r> {
    /// The SQL being built
    sql: String,
    /// The dialect deciding how identifiers are quoted
    renderer: &'r dyn Renderer,
}

impl<'r> SQLBuilder<'r> {
    pub fn new(renderer: &'r dyn Renderer) -> Self {
        Self {
            sql: String::new(),
            renderer,
        }
    }

    /// Push a string
    pub fn push_str<T: AsRef<str>>(&mut self, s: T) {
        self.sql.push_str(s.as_ref());
    }

    /// Push a character
    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    /// Push a space. This is a common operation, so it is provided as a separate method.
    pub fn push_space(&mut self) {
        self.sql.push(' ');
    }

    /// Push a single table identifier (one segment of a possibly schema-qualified name), quoted
    /// according to the dialect.
    pub fn push_table_identifier<T: AsRef<str>>(&mut self, s: T) {
        let quoted = self.renderer.quote_table_name(s.as_ref());
        self.sql.push_str(&quoted);
    }

    /// Push a single column identifier, quoted according to the dialect.
    pub fn push_column_identifier<T: AsRef<str>>(&mut self, s: T) {
        let quoted = self.renderer.quote_column_name(s.as_ref());
        self.sql.push_str(&quoted);
    }

    /// Push a string literal, quoted and escaped according to the dialect.
    pub fn push_text_literal(&mut self, value: &str) {
        let quoted = self.renderer.quote_text(value);
        self.sql.push_str(&quoted);
    }

    /// Push the complete name of a table i.e. `<schema>.<name>` or just `<name>`, without any
    /// alias.
    pub fn push_table_name(&mut self, table: &Table) {
        if let Some(schema) = table.schema() {
            self.push_table_identifier(schema);
            self.push('.');
        }
        self.push_table_identifier(table.name());
    }

    /// Push the name a column of `table` should be qualified with: the alias if the table has
    /// one, otherwise its complete name.
    pub fn push_table_qualifier(&mut self, table: &Table) {
        match table.alias() {
            Some(alias) => self.push_table_identifier(alias),
            None => self.push_table_name(table),
        }
    }

    /// Push a qualified column i.e. `<table>.<column>`.
    pub fn push_column(&mut self, table: &Table, column_name: &str) {
        self.push_table_qualifier(table);
        self.push('.');
        self.push_column_identifier(column_name);
    }

    /// Push elements of an iterator, separated by `sep`. The `push_elem` function provides
    /// the flexibility to map the elements (compared to [`SQLBuilder::push_elems`], which assumes that
    /// the elements implement [`ExpressionBuilder`] and [`build`](ExpressionBuilder::build) is all you need to call).
    pub fn push_iter<T>(
        &mut self,
        iter: impl ExactSizeIterator<Item = T>,
        sep: &str,
        push_elem: impl Fn(&mut Self, T),
    ) {
        let len = iter.len();
        for (i, item) in iter.enumerate() {
            push_elem(self, item);

            if i < len - 1 {
                self.sql.push_str(sep);
            }
        }
    }

    /// Push elements of a slice, separated by `sep`. The elements must themselves implement
    /// `ExpressionBuilder`.
    pub fn push_elems<T: ExpressionBuilder>(&mut self, elems: &[T], sep: &str) {
        self.push_iter(elems.iter(), sep, |builder, elem| {
            elem.build(builder);
        });
    }

    /// Get the SQL string. Calling this method should be the final step in building an SQL
    /// expression, and thus this builder consumes the `self`.
    pub fn into_sql(self) -> String {
        self.sql
    }
}
