// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use crate::{Filter, Select};

use super::ExpressionBuilder;

/// An SQL dialect.
///
/// Rendering a [`Select`] (and the filters and joins it reaches) is shared by all dialects;
/// an implementation only decides how table and column identifiers are quoted. Both hooks
/// receive a single identifier segment (never a dotted path) and default to leaving it as is.
/// Text literals are quoted with [`Renderer::quote_text`], which a dialect overrides when its
/// string literals have escapes beyond the standard doubled quote.
pub trait Renderer {
    fn quote_column_name(&self, name: &str) -> String {
        name.to_string()
    }

    fn quote_table_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Quote a text value as a string literal
    fn quote_text(&self, value: &str) -> String {
        enclose(value, '\'')
    }

    /// Render a complete `SELECT` statement
    fn render(&self, select: &Select) -> String
    where
        Self: Sized,
    {
        select.render(self)
    }

    /// Render the derived `SELECT COUNT(*) FROM (...) AS tmp` statement of a select
    fn render_count(&self, select: &Select) -> String
    where
        Self: Sized,
    {
        select.count(self)
    }

    /// Render a predicate on its own, as it would appear after `WHERE`
    fn render_filter(&self, filter: &Filter) -> String
    where
        Self: Sized,
    {
        filter.to_sql(self)
    }
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn quote_column_name(&self, name: &str) -> String {
        self.as_ref().quote_column_name(name)
    }

    fn quote_table_name(&self, name: &str) -> String {
        self.as_ref().quote_table_name(name)
    }

    fn quote_text(&self, value: &str) -> String {
        self.as_ref().quote_text(value)
    }
}

/// Leaves identifiers unquoted
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericRenderer;

impl Renderer for GenericRenderer {}

/// Encloses identifiers in back-ticks
#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlRenderer;

impl Renderer for MySqlRenderer {
    fn quote_column_name(&self, name: &str) -> String {
        enclose(name, '`')
    }

    fn quote_table_name(&self, name: &str) -> String {
        enclose(name, '`')
    }

    /// In the default SQL mode, MySQL also treats a backslash as an escape character in
    /// string literals
    fn quote_text(&self, value: &str) -> String {
        enclose(&value.replace('\\', "\\\\"), '\'')
    }
}

/// Encloses identifiers in double quotes. Without the quotes, an identifier with uppercase
/// letters would be interpreted the same as the identifier with lowercase letters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresRenderer;

impl Renderer for PostgresRenderer {
    fn quote_column_name(&self, name: &str) -> String {
        enclose(name, '"')
    }

    fn quote_table_name(&self, name: &str) -> String {
        enclose(name, '"')
    }
}

/// Surround `text` with `quote`, doubling any `quote` inside it
fn enclose(text: &str, quote: char) -> String {
    let mut enclosed = String::with_capacity(text.len() + 2);
    enclosed.push(quote);
    for c in text.chars() {
        if c == quote {
            enclosed.push(quote);
        }
        enclosed.push(c);
    }
    enclosed.push(quote);
    enclosed
}
