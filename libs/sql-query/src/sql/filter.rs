// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::str::FromStr;

use indexmap::IndexMap;

use crate::{QueryError, QueryResult};

use super::{
    ExpressionBuilder, SQLBuilder,
    column::{Column, IntoColumn},
    sql_value::{Operand, SqlValue},
    table::Table,
};

/// How the entries and sub-filters of a single [`Filter`] node are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl FromStr for Conjunction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Conjunction::And),
            "OR" => Ok(Conjunction::Or),
            _ => Err(QueryError::InvalidArgument(format!(
                "Invalid conjunction specified, must be one of `AND` or `OR`. `{s}` given"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
}

impl ComparisonOperator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Neq => "<>",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Lte => "<=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Gte => ">=",
            ComparisonOperator::Like => "LIKE",
            ComparisonOperator::NotLike => "NOT LIKE",
        }
    }
}

/// `<subject> <operator> <target>`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub subject: Column,
    pub operator: ComparisonOperator,
    pub target: Operand,
}

/// `<subject> BETWEEN <low> AND <high>`
#[derive(Debug, Clone, PartialEq)]
pub struct Between {
    pub subject: Column,
    pub low: SqlValue,
    pub high: SqlValue,
}

/// `<subject> IS NULL` or `<subject> IS NOT NULL`, depending on the list it is kept in.
#[derive(Debug, Clone, PartialEq)]
pub struct NullCheck {
    pub subject: Column,
}

/// A boolean column tested without an operator: `<subject>` or `NOT <subject>`.
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanFlag {
    pub subject: Column,
    pub value: bool,
}

/// A predicate tree bound to a table.
///
/// Entries are kept in one list per kind and rendered kind by kind (in insertion order within
/// a kind), followed by the sub-filters, all combined with this node's [`Conjunction`].
/// Sub-filters are rendered in parentheses and keep their own conjunction, so
/// `a = 1 AND (b = 2 OR c = 3)` is a filter with one comparison and one `OR` sub-filter.
///
/// `Clone` is a deep copy: a cloned filter shares nothing with the original.
///
/// `Filter` does not implement `PartialEq`, whose `eq` would shadow the [`Filter::eq`]
/// builder on an owned filter. Use [`Filter::same_as`] to compare two filters.
#[derive(Debug, Clone)]
pub struct Filter {
    table: Table,
    conjunction: Conjunction,
    comparisons: Vec<Comparison>,
    betweens: Vec<Between>,
    is_null: Vec<NullCheck>,
    is_not_null: Vec<NullCheck>,
    booleans: Vec<BooleanFlag>,
    // Keyed by the column token exactly as supplied, without resolving it against the table
    ins: IndexMap<String, Vec<SqlValue>>,
    not_ins: IndexMap<String, Vec<SqlValue>>,
    sub_filters: Vec<Filter>,
}

impl Filter {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            conjunction: Conjunction::default(),
            comparisons: vec![],
            betweens: vec![],
            is_null: vec![],
            is_not_null: vec![],
            booleans: vec![],
            ins: IndexMap::new(),
            not_ins: IndexMap::new(),
            sub_filters: vec![],
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Bind this filter to another table. Only affects columns resolved from now on.
    pub fn set_table(&mut self, table: Table) -> &mut Self {
        self.table = table;
        self
    }

    pub fn conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn set_conjunction(&mut self, conjunction: Conjunction) -> &mut Self {
        self.conjunction = conjunction;
        self
    }

    /// Set the conjunction from its SQL keyword (`AND` or `OR`, in any case).
    pub fn set_conjunction_str(&mut self, conjunction: &str) -> QueryResult<&mut Self> {
        let conjunction = conjunction.parse()?;
        Ok(self.set_conjunction(conjunction))
    }

    pub fn compare(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
        operator: ComparisonOperator,
    ) -> QueryResult<&mut Self> {
        let subject = column.into_column(&self.table)?;
        self.comparisons.push(Comparison {
            subject,
            operator,
            target: value.into(),
        });
        Ok(self)
    }

    /// Alias for [`Filter::equals`]
    pub fn eq(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.equals(column, value)
    }

    pub fn equals(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Eq)
    }

    pub fn not_equals(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Neq)
    }

    pub fn greater_than(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Gt)
    }

    pub fn greater_than_equals(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Gte)
    }

    pub fn lower_than(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Lt)
    }

    pub fn lower_than_equals(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Lte)
    }

    pub fn like(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::Like)
    }

    pub fn not_like(
        &mut self,
        column: impl IntoColumn,
        value: impl Into<Operand>,
    ) -> QueryResult<&mut Self> {
        self.compare(column, value, ComparisonOperator::NotLike)
    }

    /// No check is made that `low <= high`.
    pub fn between(
        &mut self,
        column: impl IntoColumn,
        low: impl Into<SqlValue>,
        high: impl Into<SqlValue>,
    ) -> QueryResult<&mut Self> {
        let subject = column.into_column(&self.table)?;
        self.betweens.push(Between {
            subject,
            low: low.into(),
            high: high.into(),
        });
        Ok(self)
    }

    pub fn is_null(&mut self, column: impl IntoColumn) -> QueryResult<&mut Self> {
        let subject = column.into_column(&self.table)?;
        self.is_null.push(NullCheck { subject });
        Ok(self)
    }

    pub fn is_not_null(&mut self, column: impl IntoColumn) -> QueryResult<&mut Self> {
        let subject = column.into_column(&self.table)?;
        self.is_not_null.push(NullCheck { subject });
        Ok(self)
    }

    pub fn add_bit_clause(&mut self, column: impl IntoColumn, value: bool) -> QueryResult<&mut Self> {
        let subject = column.into_column(&self.table)?;
        self.booleans.push(BooleanFlag { subject, value });
        Ok(self)
    }

    /// `<column> IN (<values>)`. The column token is used verbatim (it is not qualified with
    /// the filter's table) and a second call with the same token replaces the values.
    pub fn is_in<V: Into<SqlValue>>(
        &mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.ins.insert(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// `<column> NOT IN (<values>)`, with the same keying rules as [`Filter::is_in`].
    pub fn not_in<V: Into<SqlValue>>(
        &mut self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> &mut Self {
        self.not_ins.insert(
            column.into(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Create a sub-filter bound to this filter's table. The sub-filter is rendered as a
    /// parenthesized group; its entries are never merged into this filter.
    pub fn sub_filter(&mut self) -> &mut Filter {
        let index = self.sub_filters.len();
        self.sub_filters.push(Filter::new(self.table.clone()));
        &mut self.sub_filters[index]
    }

    /// Add an already built filter as a sub-filter
    pub fn add_sub_filter(&mut self, filter: Filter) -> &mut Self {
        self.sub_filters.push(filter);
        self
    }

    /// Structural equality: same table, conjunction, entries and sub-filters (in the same
    /// order)
    pub fn same_as(&self, other: &Filter) -> bool {
        self.table == other.table
            && self.conjunction == other.conjunction
            && self.comparisons == other.comparisons
            && self.betweens == other.betweens
            && self.is_null == other.is_null
            && self.is_not_null == other.is_not_null
            && self.booleans == other.booleans
            && self.ins == other.ins
            && self.not_ins == other.not_ins
            && self.sub_filters.len() == other.sub_filters.len()
            && self
                .sub_filters
                .iter()
                .zip(&other.sub_filters)
                .all(|(a, b)| a.same_as(b))
    }

    /// True if this filter has neither entries nor sub-filters
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
            && self.betweens.is_empty()
            && self.is_null.is_empty()
            && self.is_not_null.is_empty()
            && self.booleans.is_empty()
            && self.ins.is_empty()
            && self.not_ins.is_empty()
            && self.sub_filters.is_empty()
    }

    /// True if this filter would render to nothing: it has no entries, and all of its
    /// sub-filters (if any) render to nothing as well.
    pub fn renders_empty(&self) -> bool {
        self.entry_count() == 0 && self.sub_filters.iter().all(Filter::renders_empty)
    }

    pub fn comparisons(&self) -> &[Comparison] {
        &self.comparisons
    }

    pub fn betweens(&self) -> &[Between] {
        &self.betweens
    }

    pub fn nulls(&self) -> &[NullCheck] {
        &self.is_null
    }

    pub fn not_nulls(&self) -> &[NullCheck] {
        &self.is_not_null
    }

    pub fn booleans(&self) -> &[BooleanFlag] {
        &self.booleans
    }

    pub fn ins(&self) -> &IndexMap<String, Vec<SqlValue>> {
        &self.ins
    }

    pub fn not_ins(&self) -> &IndexMap<String, Vec<SqlValue>> {
        &self.not_ins
    }

    pub fn sub_filters(&self) -> &[Filter] {
        &self.sub_filters
    }

    /// The number of top-level fragments this filter renders, joined by its conjunction
    pub(crate) fn fragment_count(&self) -> usize {
        self.entry_count()
            + self
                .sub_filters
                .iter()
                .filter(|sub_filter| !sub_filter.renders_empty())
                .count()
    }

    fn entry_count(&self) -> usize {
        self.comparisons.len()
            + self.betweens.len()
            + self.is_null.len()
            + self.is_not_null.len()
            + self.booleans.len()
            + self.ins.len()
            + self.not_ins.len()
    }
}

impl ExpressionBuilder for Comparison {
    fn build(&self, builder: &mut SQLBuilder) {
        self.subject.build(builder);

        match (self.operator, self.target.is_null()) {
            (ComparisonOperator::Eq, true) => builder.push_str(" IS NULL"),
            (ComparisonOperator::Neq, true) => builder.push_str(" IS NOT NULL"),
            (operator, _) => {
                builder.push_space();
                builder.push_str(operator.as_sql());
                builder.push_space();
                self.target.build(builder);
            }
        }
    }
}

impl ExpressionBuilder for Between {
    fn build(&self, builder: &mut SQLBuilder) {
        self.subject.build(builder);
        builder.push_str(" BETWEEN ");
        self.low.build(builder);
        builder.push_str(" AND ");
        self.high.build(builder);
    }
}

impl ExpressionBuilder for BooleanFlag {
    fn build(&self, builder: &mut SQLBuilder) {
        if !self.value {
            builder.push_str("NOT ");
        }
        self.subject.build(builder);
    }
}

/// Build `<column> [NOT ]IN (<values>)`. `IN ()` is not valid SQL, so an empty list is
/// rendered as a constant predicate instead.
fn build_set_membership(column: &str, values: &[SqlValue], negated: bool, builder: &mut SQLBuilder) {
    if values.is_empty() {
        builder.push_str(if negated { "1 = 1" } else { "1 = 0" });
        return;
    }

    builder.push_str(column);
    builder.push_str(if negated { " NOT IN (" } else { " IN (" });
    builder.push_elems(values, ", ");
    builder.push(')');
}

impl ExpressionBuilder for Filter {
    /// Build the predicate without enclosing parentheses. An empty filter builds nothing.
    fn build(&self, builder: &mut SQLBuilder) {
        let separator = format!(" {} ", self.conjunction.as_sql());
        let mut first = true;
        let mut next_fragment = |builder: &mut SQLBuilder| {
            if !first {
                builder.push_str(&separator);
            }
            first = false;
        };

        for comparison in &self.comparisons {
            next_fragment(builder);
            comparison.build(builder);
        }
        for between in &self.betweens {
            next_fragment(builder);
            between.build(builder);
        }
        for null_check in &self.is_null {
            next_fragment(builder);
            null_check.subject.build(builder);
            builder.push_str(" IS NULL");
        }
        for null_check in &self.is_not_null {
            next_fragment(builder);
            null_check.subject.build(builder);
            builder.push_str(" IS NOT NULL");
        }
        for boolean in &self.booleans {
            next_fragment(builder);
            boolean.build(builder);
        }
        for (column, values) in &self.ins {
            next_fragment(builder);
            build_set_membership(column, values, false, builder);
        }
        for (column, values) in &self.not_ins {
            next_fragment(builder);
            build_set_membership(column, values, true, builder);
        }
        for sub_filter in self.sub_filters.iter().filter(|f| !f.renders_empty()) {
            next_fragment(builder);
            builder.push('(');
            sub_filter.build(builder);
            builder.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MySqlRenderer;

    fn orders_filter() -> Filter {
        Filter::new(Table::new("orders"))
    }

    #[test]
    fn operator_shorthands() {
        let mut filter = orders_filter();
        filter
            .equals("a", 1)
            .unwrap()
            .not_equals("b", 2)
            .unwrap()
            .greater_than("c", 3)
            .unwrap()
            .greater_than_equals("d", 4)
            .unwrap()
            .lower_than("e", 5)
            .unwrap()
            .lower_than_equals("f", 6)
            .unwrap()
            .like("g", "x%")
            .unwrap()
            .not_like("h", "%y")
            .unwrap();

        let operators: Vec<_> = filter
            .comparisons()
            .iter()
            .map(|c| c.operator.as_sql())
            .collect();
        assert_eq!(
            operators,
            vec!["=", "<>", ">", ">=", "<", "<=", "LIKE", "NOT LIKE"]
        );

        assert_sql!(
            filter,
            "orders.a = 1 AND orders.b <> 2 AND orders.c > 3 AND orders.d >= 4 AND orders.e < 5 \
             AND orders.f <= 6 AND orders.g LIKE 'x%' AND orders.h NOT LIKE '%y'"
        );
    }

    #[test]
    fn eq_alias() {
        let mut filter = orders_filter();
        filter.eq("status", "paid").unwrap();

        let mut expected = orders_filter();
        expected.equals("status", "paid").unwrap();

        assert!(filter.same_as(&expected));
        assert_sql!(filter, "orders.status = 'paid'");

        // Chained on a borrowed filter as well
        let borrowed = &mut filter;
        borrowed.eq("total", 10).unwrap().eq("region", "eu").unwrap();
        assert_eq!(filter.comparisons().len(), 3);
        assert!(!filter.same_as(&expected));
    }

    #[test]
    fn same_as_compares_sub_filters() {
        let mut filter = orders_filter();
        filter.equals("status", "paid").unwrap();
        filter.sub_filter().is_null("note").unwrap();

        let copy = filter.clone();
        assert!(filter.same_as(&copy));

        filter.sub_filters[0].set_conjunction(Conjunction::Or);
        assert!(!filter.same_as(&copy));
    }

    #[test]
    fn add_built_sub_filter() {
        let mut any_region = Filter::new(Table::new("orders"));
        any_region.set_conjunction(Conjunction::Or);
        any_region.equals("region", "eu").unwrap();
        any_region.equals("region", "us").unwrap();

        let mut filter = orders_filter();
        filter
            .equals("status", "paid")
            .unwrap()
            .add_sub_filter(any_region)
            .add_sub_filter(orders_filter());

        assert_eq!(filter.sub_filters().len(), 2);
        assert_sql!(
            filter,
            "`orders`.`status` = 'paid' AND (`orders`.`region` = 'eu' OR `orders`.`region` = 'us')",
            MySqlRenderer
        );
    }

    #[test]
    fn kinds_render_in_fixed_order() {
        let mut filter = orders_filter();
        filter.not_in("kind", ["refund"]);
        filter.is_in("region", ["eu", "us"]);
        filter.add_bit_clause("archived", false).unwrap();
        filter.is_not_null("shipped_at").unwrap();
        filter.is_null("cancelled_at").unwrap();
        filter.between("total", 10, 100).unwrap();
        filter.equals("status", "paid").unwrap();

        assert_sql!(
            filter,
            "orders.status = 'paid' AND orders.total BETWEEN 10 AND 100 AND orders.cancelled_at IS NULL \
             AND orders.shipped_at IS NOT NULL AND NOT orders.archived AND region IN ('eu', 'us') \
             AND kind NOT IN ('refund')"
        );
    }

    #[test]
    fn null_targets() {
        let mut filter = orders_filter();
        filter
            .equals("coupon", SqlValue::Null)
            .unwrap()
            .not_equals("note", None::<&str>)
            .unwrap()
            .add_bit_clause("paid", true)
            .unwrap();

        assert_sql!(
            filter,
            "orders.coupon IS NULL AND orders.note IS NOT NULL AND orders.paid"
        );
    }

    #[test]
    fn set_membership_is_keyed_by_raw_token() {
        let mut filter = orders_filter();
        filter.is_in("o.status", ["new"]);
        filter.is_in("user_id", [1, 2]);
        filter.is_in("o.status", ["paid", "shipped"]);

        assert_eq!(filter.ins().len(), 2);
        assert_sql!(
            filter,
            "o.status IN ('paid', 'shipped') AND user_id IN (1, 2)",
            MySqlRenderer
        );

        let mut empty_sets = orders_filter();
        empty_sets.is_in("a", Vec::<i64>::new());
        empty_sets.not_in("b", Vec::<i64>::new());
        assert_sql!(empty_sets, "1 = 0 AND 1 = 1");
    }

    #[test]
    fn nested_sub_filters() {
        let mut filter = orders_filter();
        filter.equals("status", "paid").unwrap();
        {
            let any_region = filter.sub_filter();
            any_region.set_conjunction(Conjunction::Or);
            any_region.equals("region", "eu").unwrap();
            any_region.equals("region", "us").unwrap();
            any_region
                .sub_filter()
                .greater_than("total", 1000)
                .unwrap()
                .is_not_null("vip_code")
                .unwrap();
        }

        assert_sql!(
            filter,
            "orders.status = 'paid' AND (orders.region = 'eu' OR orders.region = 'us' \
             OR (orders.total > 1000 AND orders.vip_code IS NOT NULL))"
        );
    }

    #[test]
    fn sub_filter_inherits_table() {
        let mut filter = Filter::new(Table::new("orders").with_alias("o"));
        let sub_filter = filter.sub_filter();
        assert_eq!(sub_filter.table(), &Table::new("orders").with_alias("o"));

        sub_filter.set_table(Table::new("users"));
        sub_filter.equals("name", "bob").unwrap();
        assert_eq!(filter.table(), &Table::new("orders").with_alias("o"));
        assert_sql!(filter, "(users.name = 'bob')");
    }

    #[test]
    fn empty_filters_render_nothing() {
        let mut filter = orders_filter();
        assert!(filter.is_empty());
        assert!(filter.renders_empty());
        assert_sql!(filter, "");

        filter.sub_filter().sub_filter();
        assert!(!filter.is_empty());
        assert!(filter.renders_empty());
        assert_sql!(filter, "");

        filter.equals("id", 1).unwrap();
        assert_eq!(filter.fragment_count(), 1);
        assert_sql!(filter, "orders.id = 1");
    }

    #[test]
    fn conjunction_validation() {
        let mut filter = orders_filter();
        filter.set_conjunction_str("or").unwrap();
        assert_eq!(filter.conjunction(), Conjunction::Or);

        let err = filter.set_conjunction_str("XOR").unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
        assert_eq!(filter.conjunction(), Conjunction::Or);
    }

    #[test]
    fn unresolvable_column_leaves_filter_untouched() {
        let mut filter = orders_filter();
        assert!(matches!(
            filter.equals("not a column", 1),
            Err(QueryError::UnresolvableReference(_))
        ));
        assert!(filter.is_empty());
    }

    #[test]
    fn clone_is_independent() {
        let mut original = orders_filter();
        original.equals("status", "paid").unwrap();
        original.sub_filter().is_in("region", ["eu"]);

        let mut copy = original.clone();
        copy.equals("total", 5).unwrap();
        copy.sub_filter().is_null("note").unwrap();
        copy.set_conjunction(Conjunction::Or);

        assert_eq!(original.comparisons().len(), 1);
        assert_eq!(original.sub_filters().len(), 1);
        assert_eq!(original.conjunction(), Conjunction::And);
        assert_sql!(original, "orders.status = 'paid' AND (region IN ('eu'))");
    }
}
