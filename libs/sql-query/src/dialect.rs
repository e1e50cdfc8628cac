// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{GenericRenderer, MySqlRenderer, PostgresRenderer, QueryError, Renderer};

/// The dialect to render with, when it is chosen by configuration rather than in code
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    #[default]
    Generic,
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
}

impl DialectKind {
    pub fn renderer(&self) -> Box<dyn Renderer> {
        match self {
            DialectKind::Generic => Box::new(GenericRenderer),
            DialectKind::MySql => Box::new(MySqlRenderer),
            DialectKind::Postgres => Box::new(PostgresRenderer),
        }
    }
}

impl FromStr for DialectKind {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "generic" => Ok(DialectKind::Generic),
            "mysql" => Ok(DialectKind::MySql),
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            _ => Err(QueryError::InvalidArgument(format!(
                "Unknown dialect `{s}`, must be one of `generic`, `mysql` or `postgres`"
            ))),
        }
    }
}

impl Display for DialectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DialectKind::Generic => "generic",
            DialectKind::MySql => "mysql",
            DialectKind::Postgres => "postgres",
        };
        f.write_str(name)
    }
}
