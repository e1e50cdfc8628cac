// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use super::{ExpressionBuilder, SQLBuilder, column::Column};

#[derive(Debug, PartialEq)]
pub struct GroupBy<'a>(pub &'a [Column]);

impl ExpressionBuilder for GroupBy<'_> {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("GROUP BY ");
        builder.push_elems(self.0, ", ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PostgresRenderer, Table};

    #[test]
    fn group_by() {
        let orders = Table::new("orders");
        let columns = vec![
            Column::new(orders.clone(), "region"),
            Column::new(orders, "status"),
        ];

        assert_sql!(
            GroupBy(&columns),
            r#"GROUP BY "orders"."region", "orders"."status""#,
            PostgresRenderer
        );
    }
}
