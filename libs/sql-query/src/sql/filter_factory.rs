// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt::Debug;

use super::{filter::Filter, table::Table};

/// Creates the filters a [`Select`](crate::Select) instantiates lazily for its `WHERE`
/// predicate and its join condition.
///
/// Supplying a custom factory lets a query tree start every filter in a particular state,
/// for example with a soft-delete clause already in place. Joins created through
/// [`Select::join`](crate::Select::join) inherit their parent's factory.
pub trait FilterFactory: Debug + Send + Sync {
    fn create(&self, table: &Table) -> Filter;
}

/// Creates empty filters
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFilterFactory;

impl FilterFactory for DefaultFilterFactory {
    fn create(&self, table: &Table) -> Filter {
        Filter::new(table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_factory_binds_table() {
        let filter = DefaultFilterFactory.create(&Table::new("orders"));
        assert!(filter.is_empty());
        assert_eq!(filter.table(), &Table::new("orders"));
    }
}
