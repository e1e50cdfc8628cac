// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

#![cfg(test)]

//! Test assertion to check rendered SQL statements.

/// Assert that an expression renders to the expected SQL.
///
/// # Usage:
/// ```no_run
/// assert_sql!(expression, expected_stmt); // renders with `GenericRenderer`
/// assert_sql!(expression, expected_stmt, MySqlRenderer);
/// ```
macro_rules! assert_sql {
    ($actual:expr, $expected_stmt:expr) => {
        assert_sql!($actual, $expected_stmt, $crate::GenericRenderer);
    };
    ($actual:expr, $expected_stmt:expr, $renderer:expr) => {
        let actual_stmt = $crate::ExpressionBuilder::to_sql(&$actual, &$renderer);
        assert_eq!(actual_stmt, $expected_stmt);
    };
}
