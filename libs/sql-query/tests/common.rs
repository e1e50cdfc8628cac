// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use sql_query::{JoinSpec, JoinType, Ordering, QueryResult, Select, Table};

/// Paid orders of active users, with the venue they were placed at, most recent first
pub fn paid_orders() -> QueryResult<Select> {
    let mut select = Select::with_columns(Table::new("orders"), ["id", "total"])?;
    select.filter().equals("status", "paid")?;

    let users = select.join(
        "users",
        JoinSpec::new()
            .on("user_id")
            .references("id")
            .columns(["name"])
            .join_type(JoinType::Inner),
    )?;
    users.filter().equals("active", true)?;

    select.join(
        "venues",
        JoinSpec::new()
            .on("venue_id")
            .references("id")
            .columns(["city"])
            .join_type(JoinType::Left),
    )?;

    select.order_by("created_at", Ordering::Desc)?;
    Ok(select)
}
