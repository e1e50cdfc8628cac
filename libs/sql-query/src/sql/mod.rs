// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#[macro_use]
#[cfg(test)]
mod test_util;

mod expression_builder;
mod sql_builder;

pub mod column;
pub mod filter;
pub mod filter_factory;
pub(crate) mod group_by;
pub mod join;
pub mod limit;
pub mod order;
pub mod renderer;
pub mod select;
pub mod sql_value;
pub mod table;

pub use expression_builder::ExpressionBuilder;
pub use sql_builder::SQLBuilder;
