// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{SQLBuilder, renderer::Renderer};

/// A trait for types that can build themselves into an SQL expression.
///
/// Each constituent of an SQL expression (column, table, filter, select, etc.) should implement
/// this trait, which can then be used to hierarchically build an SQL string.
pub trait ExpressionBuilder {
    /// Build the SQL expression into the given SQL builder
    fn build(&self, builder: &mut SQLBuilder);

    /// Build the SQL expression into a string for the given dialect. This is useful for
    /// testing/debugging, where we want to assert on the generated SQL without going through
    /// the whole process of creating an SQLBuilder, then building the SQL expression into it,
    /// and finally extracting the SQL string.
    fn to_sql(&self, renderer: &dyn Renderer) -> String
    where
        Self: Sized,
    {
        let mut builder = SQLBuilder::new(renderer);
        self.build(&mut builder);
        builder.into_sql()
    }
}

impl<T> ExpressionBuilder for &T
where
    T: ExpressionBuilder,
{
    fn build(&self, builder: &mut SQLBuilder) {
        (**self).build(builder)
    }
}
