use crate::field::Field;
use crate::query::QueryBuilder;
use crate::types::Queryable;

/// Declares how records of a model are fetched by id.
///
/// The fetch query always starts with the id membership clause, followed by
/// whatever [`build_query`](Fetchable::build_query) appends.
pub trait Fetchable {
    type Model: Queryable;

    /// The model's id field.
    fn id_field(fields: <Self::Model as Queryable>::Fields) -> Field<Self::Model>;

    /// Clauses appended after the id filter (selection, sort, ...).
    fn build_query(query: QueryBuilder<Self::Model>) -> QueryBuilder<Self::Model> {
        query
    }

    /// `where <id> = (<ids>);` followed by [`build_query`](Fetchable::build_query)'s clauses.
    fn fetch_query(ids: &[i64]) -> QueryBuilder<Self::Model> {
        let id = Self::id_field(<Self::Model as Queryable>::fields());
        Self::build_query(QueryBuilder::new().filter(id.is_in(ids.iter().copied())))
    }
}
