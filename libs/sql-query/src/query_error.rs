// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A builder received a value outside of its accepted domain (for example, a
    /// conjunction other than `AND`/`OR`).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A table or column reference could not be bound to a table context.
    #[error("Unresolvable reference: {0}")]
    UnresolvableReference(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
