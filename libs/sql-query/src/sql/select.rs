// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::{fmt::Display, sync::Arc};

use indexmap::IndexMap;
use tracing::{debug, instrument, trace};

use crate::{QueryError, QueryResult};

use super::{
    ExpressionBuilder, SQLBuilder,
    column::{Column, IntoColumn, IntoColumns, Projection},
    filter::{Conjunction, Filter},
    filter_factory::{DefaultFilterFactory, FilterFactory},
    group_by::GroupBy,
    join::{JoinClause, JoinSpec, JoinType},
    limit::Limit,
    order::{OrderBy, OrderByClause, Ordering},
    renderer::{GenericRenderer, Renderer},
    table::{IntoTable, Table, TableKey},
};

/// A select statement, which may also be joined into another select.
///
/// A select owns its filter, its join condition and the selects joined into it (one per
/// [`TableKey`], in registration order), so the whole tree can be deep-copied with `Clone`
/// and a copy can be changed without affecting the original.
#[derive(Debug, Clone)]
pub struct Select {
    /// The table to select from (or to join)
    table: Table,
    /// The columns to select
    columns: Vec<Column>,
    /// The predicate to filter the rows, created on first access
    filter: Option<Filter>,
    /// Combines the filters of the join graph in `WHERE`
    filter_operator: Conjunction,
    /// The selects joined into this one
    joins: IndexMap<TableKey, Select>,
    order_by: Vec<OrderBy>,
    group_by: Vec<Column>,
    limit: Option<Limit>,
    /// Columns to render instead of the columns of the whole join graph
    forced_columns: Option<Vec<Column>>,
    /// Whether this select has been registered as a join of another select
    is_join: bool,
    join_type: Option<JoinType>,
    join_condition: Option<Filter>,
    /// Creates `filter` and `join_condition` when they are first accessed
    filter_factory: Arc<dyn FilterFactory>,
}

impl Select {
    /// A select of all columns of `table`
    pub fn new(table: Table) -> Self {
        Self {
            columns: vec![Column::Star(Some(table.clone()))],
            table,
            filter: None,
            filter_operator: Conjunction::And,
            joins: IndexMap::new(),
            order_by: vec![],
            group_by: vec![],
            limit: None,
            forced_columns: None,
            is_join: false,
            join_type: None,
            join_condition: None,
            filter_factory: Arc::new(DefaultFilterFactory),
        }
    }

    /// A select of the given columns of `table`
    pub fn with_columns(table: Table, columns: impl IntoColumns) -> QueryResult<Self> {
        let columns = columns.into_columns(&table)?;
        Ok(Self {
            columns,
            ..Self::new(table)
        })
    }

    pub fn with_filter_factory(self, filter_factory: Arc<dyn FilterFactory>) -> Self {
        Self {
            filter_factory,
            ..self
        }
    }

    pub fn set_filter_factory(&mut self, filter_factory: Arc<dyn FilterFactory>) -> &mut Self {
        self.filter_factory = filter_factory;
        self
    }

    pub fn filter_factory(&self) -> &Arc<dyn FilterFactory> {
        &self.filter_factory
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Select from another table. Only a root select can be rebound, since a joined select is
    /// keyed by its table. The default projection (`*`) follows the new table; columns,
    /// filters and join conditions already resolved keep the table they were resolved against.
    pub fn set_table(&mut self, table: impl IntoTable) -> QueryResult<&mut Self> {
        let table = table.into_table()?;
        if self.is_join {
            return Err(QueryError::InvalidArgument(format!(
                "Cannot rebind the joined select on `{}` to `{}`",
                self.table, table
            )));
        }

        if self.columns == [Column::Star(Some(self.table.clone()))] {
            self.columns = vec![Column::Star(Some(table.clone()))];
        }
        self.table = table;
        Ok(self)
    }

    /// Join `table` into this select and return the joined select. If `table` is already
    /// joined, the existing joined select is returned unchanged and `spec` is ignored.
    ///
    /// A table may also be reached through another join (for example `orders -> users` and
    /// `orders -> venues -> users`). Such a table is rendered once, with the join condition
    /// of the first path in [`Select::all_joins`] order; the join condition of any later path
    /// is not rendered, while its columns, filters and ordering still are.
    pub fn join(&mut self, table: impl IntoTable, spec: JoinSpec) -> QueryResult<&mut Select> {
        let table = table.into_table()?;
        let key = table.key();

        if self.joins.contains_key(&key) {
            trace!("Join on `{}` already registered, reusing it", key);
            return Ok(&mut self.joins[&key]);
        }

        let JoinSpec {
            self_column,
            ref_column,
            columns,
            join_type,
            filter_factory,
        } = spec;

        let filter_factory = filter_factory.unwrap_or_else(|| self.filter_factory.clone());
        let mut select = Select::new(table).with_filter_factory(filter_factory);
        select.columns = columns.into_columns(&select.table)?;
        select.join_type = join_type;

        let condition =
            self.resolve_join_condition(&select.table, self_column.as_deref(), ref_column.as_deref())?;
        self.register_join(key, select, condition)
    }

    /// Join an already built select into this one and return it. If a select on the same
    /// table is already joined, that one is returned and `select` is dropped.
    pub fn add_join(
        &mut self,
        select: Select,
        self_column: Option<&str>,
        ref_column: Option<&str>,
    ) -> QueryResult<&mut Select> {
        let key = select.table.key();

        if self.joins.contains_key(&key) {
            trace!("Join on `{}` already registered, reusing it", key);
            return Ok(&mut self.joins[&key]);
        }

        let condition = self.resolve_join_condition(&select.table, self_column, ref_column)?;
        self.register_join(key, select, condition)
    }

    /// Resolve both sides of `<joined>.<ref_column> = <self>.<self_column>` before anything is
    /// changed, so that an unresolvable column leaves the tree untouched.
    fn resolve_join_condition(
        &self,
        joined_table: &Table,
        self_column: Option<&str>,
        ref_column: Option<&str>,
    ) -> QueryResult<Option<(Column, Column)>> {
        let Some(self_column) = self_column else {
            return Ok(None);
        };
        let ref_column = ref_column.unwrap_or(self_column);

        Ok(Some((
            ref_column.into_column(joined_table)?,
            self_column.into_column(&self.table)?,
        )))
    }

    fn register_join(
        &mut self,
        key: TableKey,
        mut select: Select,
        condition: Option<(Column, Column)>,
    ) -> QueryResult<&mut Select> {
        select.is_join = true;

        if let Some((ref_column, self_column)) = condition {
            select.join_condition().equals(ref_column, self_column)?;
        }

        Ok(self.joins.entry(key).or_insert(select))
    }

    pub fn has_join(&self, table: impl IntoTable) -> bool {
        table
            .into_table()
            .is_ok_and(|table| self.joins.contains_key(&table.key()))
    }

    pub fn get_join(&self, table: impl IntoTable) -> Option<&Select> {
        let table = table.into_table().ok()?;
        self.joins.get(&table.key())
    }

    pub fn get_join_mut(&mut self, table: impl IntoTable) -> Option<&mut Select> {
        let table = table.into_table().ok()?;
        self.joins.get_mut(&table.key())
    }

    /// The selects joined directly into this one
    pub fn joins(&self) -> &IndexMap<TableKey, Select> {
        &self.joins
    }

    /// Join already built selects, keeping their join conditions. As with [`Select::join`], a
    /// select on a table that is already joined is dropped in favor of the existing one.
    pub fn merge_joins(&mut self, joins: impl IntoIterator<Item = Select>) -> &mut Self {
        for mut join in joins {
            let key = join.table.key();
            if self.joins.contains_key(&key) {
                trace!("Join on `{}` already registered, keeping it", key);
                continue;
            }
            join.is_join = true;
            self.joins.insert(key, join);
        }
        self
    }

    /// Replace the joined selects, as [`Select::merge_joins`] into an empty join map
    pub fn set_joins(&mut self, joins: impl IntoIterator<Item = Select>) -> &mut Self {
        self.joins.clear();
        self.merge_joins(joins)
    }

    pub fn is_join(&self) -> bool {
        self.is_join
    }

    pub fn join_type(&self) -> Option<JoinType> {
        self.join_type
    }

    pub fn set_join_type(&mut self, join_type: JoinType) -> &mut Self {
        self.join_type = Some(join_type);
        self
    }

    /// The predicate of this select, created on first access
    pub fn filter(&mut self) -> &mut Filter {
        self.filter
            .get_or_insert_with(|| self.filter_factory.create(&self.table))
    }

    pub fn get_filter(&self) -> Option<&Filter> {
        self.filter.as_ref()
    }

    /// How the filters of the join graph are combined when rendering from this select
    /// (`AND` by default)
    pub fn set_filter_operator(&mut self, operator: Conjunction) -> &mut Self {
        self.filter_operator = operator;
        self
    }

    pub fn filter_operator(&self) -> Conjunction {
        self.filter_operator
    }

    pub fn set_filter(&mut self, filter: Filter) -> &mut Self {
        self.filter = Some(filter);
        self
    }

    /// The condition this select is joined on, created on first access
    pub fn join_condition(&mut self) -> &mut Filter {
        self.join_condition
            .get_or_insert_with(|| self.filter_factory.create(&self.table))
    }

    pub fn get_join_condition(&self) -> Option<&Filter> {
        self.join_condition.as_ref()
    }

    pub fn set_join_condition(&mut self, join_condition: Filter) -> &mut Self {
        self.join_condition = Some(join_condition);
        self
    }

    /// Replace the projection
    pub fn cols<C: IntoColumn>(
        &mut self,
        columns: impl IntoIterator<Item = C>,
    ) -> QueryResult<&mut Self> {
        let columns = columns
            .into_iter()
            .map(|column| column.into_column(&self.table))
            .collect::<QueryResult<Vec<_>>>()?;
        self.columns = columns;
        Ok(self)
    }

    /// Replace the projection with one or many columns
    pub fn set_columns(&mut self, columns: impl IntoColumns) -> QueryResult<&mut Self> {
        self.columns = columns.into_columns(&self.table)?;
        Ok(self)
    }

    pub fn add_column(&mut self, column: impl IntoColumn) -> QueryResult<&mut Self> {
        let column = column.into_column(&self.table)?;
        self.columns.push(column);
        Ok(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Order by `column` of this select's table
    pub fn order_by(
        &mut self,
        column: impl IntoColumn,
        ordering: Ordering,
    ) -> QueryResult<&mut Self> {
        self.order_by_with(column, ordering, None, true)
    }

    /// Order by `column`, resolved against `table` if given (otherwise against this select's
    /// table)
    pub fn order_by_with(
        &mut self,
        column: impl IntoColumn,
        ordering: Ordering,
        table: Option<&Table>,
        use_alias: bool,
    ) -> QueryResult<&mut Self> {
        let column = column.into_column(table.unwrap_or(&self.table))?;
        self.order_by.push(OrderBy::new(column, ordering, use_alias));
        Ok(self)
    }

    /// Remove the ordering of this select (but not of the selects joined into it)
    pub fn remove_order(&mut self) -> &mut Self {
        self.order_by.clear();
        self
    }

    /// Remove the ordering of this select and of every select joined into it
    pub fn remove_all_order(&mut self) -> &mut Self {
        self.order_by.clear();
        for join in self.joins.values_mut() {
            join.remove_all_order();
        }
        self
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order_by
    }

    /// Replace the grouping with one or many columns
    pub fn group_by(&mut self, columns: impl IntoColumns) -> QueryResult<&mut Self> {
        self.group_by = columns.into_columns(&self.table)?;
        Ok(self)
    }

    pub fn add_group_by(&mut self, column: impl IntoColumn) -> QueryResult<&mut Self> {
        let column = column.into_column(&self.table)?;
        self.group_by.push(column);
        Ok(self)
    }

    pub fn group(&self) -> &[Column] {
        &self.group_by
    }

    pub fn limit(&mut self, start: u64, count: u64) -> &mut Self {
        self.limit = Some(Limit {
            offset: start,
            count,
        });
        self
    }

    pub fn remove_limit(&mut self) -> &mut Self {
        self.limit = None;
        self
    }

    pub fn get_limit(&self) -> Option<Limit> {
        self.limit
    }

    /// Render `columns` as the projection instead of the columns of the join graph. Forced
    /// columns are used as given, without being resolved against the table.
    pub fn set_forced_columns(&mut self, columns: impl IntoIterator<Item = Column>) -> &mut Self {
        self.forced_columns = Some(columns.into_iter().collect());
        self
    }

    pub fn forced_columns(&self) -> Option<&[Column]> {
        self.forced_columns.as_deref()
    }

    /// The columns of this select followed by those of every joined select (recursively, in
    /// join order)
    pub fn all_columns(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self.columns.iter().collect();
        for join in self.joins.values() {
            columns.extend(join.all_columns());
        }
        columns
    }

    /// The filters of this select and of every joined select, in the same order as
    /// [`Select::all_columns`]. A filter that was never accessed is skipped, but an accessed
    /// empty filter is included.
    pub fn all_filters(&self) -> Vec<&Filter> {
        let mut filters: Vec<&Filter> = self.filter.iter().collect();
        for join in self.joins.values() {
            filters.extend(join.all_filters());
        }
        filters
    }

    pub fn all_order_by(&self) -> Vec<&OrderBy> {
        let mut order_by: Vec<&OrderBy> = self.order_by.iter().collect();
        for join in self.joins.values() {
            order_by.extend(join.all_order_by());
        }
        order_by
    }

    /// The selects joined into this one, followed by the selects joined into those. A table
    /// reached through more than one path appears once, at its first position.
    pub fn all_joins(&self) -> Vec<&Select> {
        let mut joins: IndexMap<TableKey, &Select> = self
            .joins
            .iter()
            .map(|(key, join)| (key.clone(), join))
            .collect();
        for join in self.joins.values() {
            for nested in join.all_joins() {
                joins.entry(nested.table.key()).or_insert(nested);
            }
        }
        joins.into_values().collect()
    }

    /// The select whose projection is forced to `1 AS tmp`, to be wrapped in
    /// `SELECT COUNT(*)`. The ordering of a select over a view is removed, as is any ordering
    /// when there is no limit (it cannot change the count).
    pub fn count_query(&self) -> Select {
        let mut select = self.clone();
        select.set_forced_columns([Column::raw("1 AS tmp")]);

        if self.table.is_view() {
            select.remove_order();
        }
        if select.limit.is_none() {
            select.remove_all_order();
        }

        select
    }

    /// Render `SELECT COUNT(*) FROM (<count query>) AS tmp`. This select is not modified.
    #[instrument(skip_all, fields(table = %self.table))]
    pub fn count(&self, renderer: &dyn Renderer) -> String {
        let mut builder = SQLBuilder::new(renderer);
        builder.push_str("SELECT COUNT(*) FROM (");
        self.count_query().build(&mut builder);
        builder.push_str(") AS tmp");

        let sql = builder.into_sql();
        debug!("Rendered count query: {}", sql);
        sql
    }

    /// Render this select as a complete statement
    #[instrument(skip_all, fields(table = %self.table))]
    pub fn render(&self, renderer: &dyn Renderer) -> String {
        let sql = self.to_sql(renderer);
        debug!("Rendered select: {}", sql);
        sql
    }
}

impl PartialEq for Select {
    /// Structural equality. The filter factory is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table
            && self.columns == other.columns
            && same_filter(&self.filter, &other.filter)
            && self.filter_operator == other.filter_operator
            && self.joins == other.joins
            && self.order_by == other.order_by
            && self.group_by == other.group_by
            && self.limit == other.limit
            && self.forced_columns == other.forced_columns
            && self.is_join == other.is_join
            && self.join_type == other.join_type
            && same_filter(&self.join_condition, &other.join_condition)
    }
}

fn same_filter(filter: &Option<Filter>, other: &Option<Filter>) -> bool {
    match (filter, other) {
        (Some(filter), Some(other)) => filter.same_as(other),
        (None, None) => true,
        _ => false,
    }
}

impl Display for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql(&GenericRenderer))
    }
}

impl ExpressionBuilder for Select {
    fn build(&self, builder: &mut SQLBuilder) {
        builder.push_str("SELECT ");

        let columns: Vec<&Column> = match &self.forced_columns {
            Some(forced_columns) => forced_columns.iter().collect(),
            None => self.all_columns(),
        };
        if columns.is_empty() {
            builder.push('*');
        } else {
            builder.push_iter(columns.into_iter(), ", ", |builder, column| {
                Projection(column).build(builder)
            });
        }

        builder.push_str(" FROM ");
        self.table.build(builder);

        for join in self.all_joins().into_iter().filter(|join| join.is_join) {
            builder.push_space();
            JoinClause(join).build(builder);
        }

        let filters: Vec<&Filter> = self
            .all_filters()
            .into_iter()
            .filter(|filter| !filter.renders_empty())
            .collect();
        if !filters.is_empty() {
            // Each filter's conjunction only applies within that filter
            let parenthesize = filters.len() > 1;
            let separator = format!(" {} ", self.filter_operator.as_sql());
            builder.push_str(" WHERE ");
            builder.push_iter(filters.into_iter(), &separator, |builder, filter| {
                if parenthesize && filter.fragment_count() > 1 {
                    builder.push('(');
                    filter.build(builder);
                    builder.push(')');
                } else {
                    filter.build(builder);
                }
            });
        }

        if !self.group_by.is_empty() {
            builder.push_space();
            GroupBy(&self.group_by).build(builder);
        }

        let order_by = self.all_order_by();
        if !order_by.is_empty() {
            builder.push_space();
            OrderByClause(order_by).build(builder);
        }

        if let Some(limit) = &self.limit {
            builder.push_space();
            limit.build(builder);
        }
    }
}
