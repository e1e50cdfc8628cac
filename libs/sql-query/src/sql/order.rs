// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column::Column};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default)]
pub enum Ordering {
    #[default]
    Asc,
    Desc,
}

/// An `ORDER BY` element. With `use_alias`, an aliased column is referred to by its alias
/// rather than by its full expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub ordering: Ordering,
    pub use_alias: bool,
}

impl OrderBy {
    pub fn new(column: Column, ordering: Ordering, use_alias: bool) -> Self {
        Self {
            column,
            ordering,
            use_alias,
        }
    }
}

impl ExpressionBuilder for OrderBy {
    fn build(&self, builder: &mut SQLBuilder) {
        match self.column.alias() {
            Some(alias) if self.use_alias => builder.push_column_identifier(alias),
            _ => self.column.build(builder),
        }
        builder.push_space();

        if self.ordering == Ordering::Asc {
            builder.push_str("ASC");
        } else {
            builder.push_str("DESC");
        }
    }
}

/// The `ORDER BY` clause of a statement
pub(crate) struct OrderByClause<'a>(pub Vec<&'a OrderBy>);

impl ExpressionBuilder for OrderByClause<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("ORDER BY ");
        builder.push_elems(&self.0, ", ");
    }
}
