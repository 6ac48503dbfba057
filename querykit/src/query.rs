//! Query builder producing the textual wire query.

use std::fmt;
use std::marker::PhantomData;

use crate::errors::RegistryMiss;
use crate::field::Field;
use crate::filter::Filter;
use crate::types::Queryable;

/// Sort direction for `sort` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accumulates query clauses for model `M` in call order.
///
/// Every method consumes and returns the builder, so a query reads as one
/// chain:
///
/// ```ignore
/// let query = QueryBuilder::<Game>::new()
///     .select(|f| [f.name, f.summary])
///     .filter_by(|f| f.id.eq(1))
///     .limit(1)
///     .build();
/// assert_eq!(query, "fields name,summary;\nwhere id = 1;\nlimit 1;");
/// ```
///
/// Nothing is validated: repeated or conflicting clauses are emitted as given.
pub struct QueryBuilder<M> {
    clauses: Vec<String>,
    misses: Vec<RegistryMiss>,
    _model: PhantomData<fn() -> M>,
}

impl<M> QueryBuilder<M> {
    pub fn new() -> Self {
        Self {
            clauses: Vec::new(),
            misses: Vec::new(),
            _model: PhantomData,
        }
    }

    fn push(mut self, clause: String) -> Self {
        log::trace!("appending clause `{clause}`");
        self.clauses.push(clause);
        self
    }

    /// `limit <n>;`
    pub fn limit(self, n: u32) -> Self {
        self.push(format!("limit {n};"))
    }

    /// `offset <n>;`
    pub fn offset(self, n: u32) -> Self {
        self.push(format!("offset {n};"))
    }

    /// Clause fragments in append order.
    pub fn clauses(&self) -> &[String] {
        &self.clauses
    }

    /// Field references that were dropped because they had no registry entry.
    pub fn registry_misses(&self) -> &[RegistryMiss] {
        &self.misses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Join the clauses with newlines. Does not consume or alter the builder.
    pub fn build(&self) -> String {
        let query = self.clauses.join("\n");
        log::trace!("built query:\n{query}");
        query
    }
}

impl<M: Queryable> QueryBuilder<M> {
    /// `fields <k1>,<k2>,...;`
    ///
    /// Unresolved references are left out of the list; the clause is emitted
    /// even if that leaves it empty.
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field<M>>) -> Self {
        let mut keys = Vec::new();
        for field in fields {
            match field.resolve() {
                Ok(key) => keys.push(key),
                Err(miss) => self.misses.push(miss),
            }
        }
        self.push(format!("fields {};", keys.join(",")))
    }

    /// Like [`fields`](Self::fields), picking references off the model's path struct.
    pub fn select<I>(self, pick: impl FnOnce(M::Fields) -> I) -> Self
    where
        I: IntoIterator<Item = Field<M>>,
    {
        let fields = pick(M::fields());
        self.fields(fields)
    }

    /// `where <condition>;`
    pub fn filter(mut self, filter: Filter<M>) -> Self {
        self.misses.extend(filter.unresolved());
        let condition = filter.to_condition();
        self.push(format!("where {condition};"))
    }

    pub fn filter_by(self, build: impl FnOnce(M::Fields) -> Filter<M>) -> Self {
        let filter = build(M::fields());
        self.filter(filter)
    }

    /// `sort <key> <asc|desc>;`, omitted entirely when `field` is unresolved.
    pub fn sort_by(mut self, field: Field<M>, order: SortOrder) -> Self {
        match field.resolve() {
            Ok(key) => self.push(format!("sort {key} {order};")),
            Err(miss) => {
                self.misses.push(miss);
                self
            }
        }
    }

    /// Ascending sort.
    pub fn sort(self, field: Field<M>) -> Self {
        self.sort_by(field, SortOrder::Asc)
    }
}

impl<M> Default for QueryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> Clone for QueryBuilder<M> {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
            misses: self.misses.clone(),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for QueryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("model", &std::any::type_name::<M>())
            .field("clauses", &self.clauses)
            .field("misses", &self.misses)
            .finish()
    }
}

impl<M> fmt::Display for QueryBuilder<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}
