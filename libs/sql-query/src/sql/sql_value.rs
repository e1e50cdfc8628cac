// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column::Column};

/// A literal value. Values are rendered inline, with text quoted and escaped by the dialect.
/// A float that is not finite renders as `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// The right-hand side of a comparison: either a literal or another column (as in the join
/// condition `users.id = orders.user_id`).
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(SqlValue),
    Column(Column),
}

impl SqlValue {
    /// True for `NULL`, and for floats that render as `NULL`
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Float(value) => !value.is_finite(),
            _ => false,
        }
    }
}

impl Operand {
    pub fn is_null(&self) -> bool {
        match self {
            Operand::Value(value) => value.is_null(),
            Operand::Column(_) => false,
        }
    }
}

impl ExpressionBuilder for SqlValue {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            SqlValue::Null => builder.push_str("NULL"),
            SqlValue::Bool(true) => builder.push_str("TRUE"),
            SqlValue::Bool(false) => builder.push_str("FALSE"),
            SqlValue::Int(value) => builder.push_str(value.to_string()),
            // SQL has no literal for NaN or infinity
            SqlValue::Float(value) if !value.is_finite() => builder.push_str("NULL"),
            SqlValue::Float(value) => builder.push_str(value.to_string()),
            SqlValue::Text(value) => builder.push_text_literal(value),
        }
    }
}

impl ExpressionBuilder for Operand {
    fn build(&self, builder: &mut SQLBuilder) {
        match self {
            Operand::Value(value) => value.build(builder),
            Operand::Column(column) => column.build(builder),
        }
    }
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    SqlValue::$variant(value.into())
                }
            }

            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Value(value.into())
                }
            }
        )*
    };
}

impl_from_value!(
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Int,
    u16 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    &str => Text,
    String => Text,
);

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        Operand::Value(value.into())
    }
}

impl From<SqlValue> for Operand {
    fn from(value: SqlValue) -> Self {
        Operand::Value(value)
    }
}

impl From<Column> for Operand {
    fn from(column: Column) -> Self {
        Operand::Column(column)
    }
}
