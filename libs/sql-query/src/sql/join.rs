// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{str::FromStr, sync::Arc};

use crate::{QueryError, Select};

use super::{ExpressionBuilder, SQLBuilder, filter_factory::FilterFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
}

impl JoinType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
        }
    }
}

impl FromStr for JoinType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INNER" => Ok(JoinType::Inner),
            "LEFT" => Ok(JoinType::Left),
            "RIGHT" => Ok(JoinType::Right),
            _ => Err(QueryError::InvalidArgument(format!(
                "Invalid join type specified, must be one of `INNER`, `LEFT` or `RIGHT`. `{s}` given"
            ))),
        }
    }
}

/// How [`Select::join`] should create a join.
///
/// With [`JoinSpec::on`], the join condition `<joined>.<ref_column> = <parent>.<self_column>`
/// is added, where `ref_column` defaults to `self_column`.
#[derive(Debug, Clone, Default)]
pub struct JoinSpec {
    pub(crate) self_column: Option<String>,
    pub(crate) ref_column: Option<String>,
    pub(crate) columns: Vec<String>,
    pub(crate) join_type: Option<JoinType>,
    pub(crate) filter_factory: Option<Arc<dyn FilterFactory>>,
}

impl JoinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// The column of the parent table the join condition compares with
    pub fn on(self, self_column: impl Into<String>) -> Self {
        Self {
            self_column: Some(self_column.into()),
            ..self
        }
    }

    /// The column of the joined table the join condition compares
    pub fn references(self, ref_column: impl Into<String>) -> Self {
        Self {
            ref_column: Some(ref_column.into()),
            ..self
        }
    }

    /// The columns of the joined table to add to the projection
    pub fn columns<C: Into<String>>(self, columns: impl IntoIterator<Item = C>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..self
        }
    }

    pub fn join_type(self, join_type: JoinType) -> Self {
        Self {
            join_type: Some(join_type),
            ..self
        }
    }

    /// The factory for the joined select's filters, instead of the parent's
    pub fn filter_factory(self, filter_factory: Arc<dyn FilterFactory>) -> Self {
        Self {
            filter_factory: Some(filter_factory),
            ..self
        }
    }
}

/// A joined select rendered as `[<type> ]JOIN <table>[ ON <condition>]`. The `ON` part is left
/// out when the join condition is missing or empty.
pub(crate) struct JoinClause<'a>(pub &'a Select);

impl ExpressionBuilder for JoinClause<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        if let Some(join_type) = self.0.join_type() {
            builder.push_str(join_type.as_sql());
            builder.push_space();
        }
        builder.push_str("JOIN ");
        self.0.table().build(builder);

        if let Some(condition) = self.0.get_join_condition()
            && !condition.renders_empty()
        {
            builder.push_str(" ON ");
            condition.build(builder);
        }
    }
}
