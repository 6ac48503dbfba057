//! Filter expressions for the `where` clause.

use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr};

use crate::errors::RegistryMiss;
use crate::field::Field;
use crate::types::Queryable;
use crate::value::QueryValue;

/// Comparison operators understood by the wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Compare {
        key: Result<&'static str, RegistryMiss>,
        op: Operator,
        value: String,
    },
    In {
        key: Result<&'static str, RegistryMiss>,
        values: Vec<String>,
    },
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

impl Node {
    fn render(&self, out: &mut String) {
        match self {
            // An unresolved leaf contributes nothing; its parent still renders.
            Node::Compare { key: Err(_), .. } | Node::In { key: Err(_), .. } => {}
            Node::Compare { key: Ok(key), op, value } => {
                out.push_str(key);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                out.push_str(value);
            }
            Node::In { key: Ok(key), values } => {
                out.push_str(key);
                out.push_str(" = (");
                out.push_str(&values.join(","));
                out.push(')');
            }
            Node::And(left, right) => Self::render_binary(out, left, "&", right),
            Node::Or(left, right) => Self::render_binary(out, left, "|", right),
        }
    }

    fn render_binary(out: &mut String, left: &Node, op: &str, right: &Node) {
        out.push('(');
        left.render(out);
        out.push(' ');
        out.push_str(op);
        out.push(' ');
        right.render(out);
        out.push(')');
    }

    fn collect_misses(&self, misses: &mut Vec<RegistryMiss>) {
        match self {
            Node::Compare { key: Err(miss), .. } | Node::In { key: Err(miss), .. } => misses.push(*miss),
            Node::Compare { .. } | Node::In { .. } => {}
            Node::And(left, right) | Node::Or(left, right) => {
                left.collect_misses(misses);
                right.collect_misses(misses);
            }
        }
    }
}

/// A boolean condition over the fields of model `M`.
///
/// Built from [`Field`] comparisons and combined with [`Filter::and`] /
/// [`Filter::or`] (or `&` / `|`). Combinations always parenthesize, so the
/// rendered text carries the exact tree shape the caller built.
///
/// ```ignore
/// let f = Game::fields();
/// let filter = f.name.eq("x") & f.id.gt(1);
/// assert_eq!(filter.to_condition(), "(name = \"x\" & id > 1)");
/// ```
pub struct Filter<M> {
    node: Node,
    _model: PhantomData<fn() -> M>,
}

impl<M> Filter<M> {
    fn from_node(node: Node) -> Self {
        Self {
            node,
            _model: PhantomData,
        }
    }

    /// Both conditions hold: `(<self> & <other>)`.
    pub fn and(self, other: Filter<M>) -> Filter<M> {
        Self::from_node(Node::And(Box::new(self.node), Box::new(other.node)))
    }

    /// Either condition holds: `(<self> | <other>)`.
    pub fn or(self, other: Filter<M>) -> Filter<M> {
        Self::from_node(Node::Or(Box::new(self.node), Box::new(other.node)))
    }

    /// Render the condition text that follows `where`.
    pub fn to_condition(&self) -> String {
        let mut out = String::new();
        self.node.render(&mut out);
        out
    }

    /// Field references in this tree that had no registry entry.
    pub fn unresolved(&self) -> Vec<RegistryMiss> {
        let mut misses = Vec::new();
        self.node.collect_misses(&mut misses);
        misses
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved().is_empty()
    }
}

impl<M: Queryable> Filter<M> {
    /// `<field> <op> <value>`
    pub fn compare(field: Field<M>, op: Operator, value: impl QueryValue) -> Self {
        Self::from_node(Node::Compare {
            key: field.resolve(),
            op,
            value: value.to_query_string(),
        })
    }

    /// `<field> = (<v1>,<v2>,...)`
    pub fn is_in<V: QueryValue>(field: Field<M>, values: impl IntoIterator<Item = V>) -> Self {
        Self::from_node(Node::In {
            key: field.resolve(),
            values: values.into_iter().map(|value| value.to_query_string()).collect(),
        })
    }

    pub fn eq(field: Field<M>, value: impl QueryValue) -> Self {
        Self::compare(field, Operator::Eq, value)
    }

    pub fn ne(field: Field<M>, value: impl QueryValue) -> Self {
        Self::compare(field, Operator::Ne, value)
    }

    pub fn gt(field: Field<M>, value: impl QueryValue) -> Self {
        Self::compare(field, Operator::Gt, value)
    }

    pub fn lt(field: Field<M>, value: impl QueryValue) -> Self {
        Self::compare(field, Operator::Lt, value)
    }

    pub fn ge(field: Field<M>, value: impl QueryValue) -> Self {
        Self::compare(field, Operator::Ge, value)
    }

    pub fn le(field: Field<M>, value: impl QueryValue) -> Self {
        Self::compare(field, Operator::Le, value)
    }
}

impl<M> BitAnd for Filter<M> {
    type Output = Filter<M>;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl<M> BitOr for Filter<M> {
    type Output = Filter<M>;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl<M> Clone for Filter<M> {
    fn clone(&self) -> Self {
        Self::from_node(self.node.clone())
    }
}

impl<M> PartialEq for Filter<M> {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl<M> fmt::Debug for Filter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.to_condition()).finish()
    }
}

impl<M> fmt::Display for Filter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_condition())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::FieldState;
    use crate::Queryable;

    #[derive(Debug, Queryable)]
    struct Track {
        id: FieldState<i64>,
        #[query(key = "title")]
        name: FieldState<String>,
        rating: FieldState<f64>,
        #[query(skip)]
        local_note: Option<String>,
    }

    #[test]
    fn comparison_leaves_render_key_operator_value() {
        let f = Track::fields();
        assert_eq!(f.id.eq(1).to_condition(), "id = 1");
        assert_eq!(f.name.ne("Intro").to_condition(), "title != \"Intro\"");
        assert_eq!(f.rating.ge(4.0).to_condition(), "rating >= 4.0");
        assert_eq!(f.id.lt(10).to_condition(), "id < 10");
        assert_eq!(Filter::le(f.id, 3).to_condition(), "id <= 3");
    }

    #[test]
    fn membership_renders_parenthesized_list() {
        let f = Track::fields();
        assert_eq!(f.id.is_in([1, 2, 3]).to_condition(), "id = (1,2,3)");
        assert_eq!(f.name.is_in(vec!["a", "b"]).to_condition(), "title = (\"a\",\"b\")");
    }

    #[test]
    fn combinators_nest_with_parentheses() {
        let f = Track::fields();
        let filter = (f.id.gt(1) & f.rating.lt(2.5)) | f.name.eq("x");
        assert_eq!(filter.to_condition(), "((id > 1 & rating < 2.5) | title = \"x\")");
        assert!(filter.is_fully_resolved());
    }

    #[test]
    fn unresolved_leaf_renders_empty_and_is_reported() {
        let f = Track::fields();
        let filter = f.local_note.eq("x").and(f.id.eq(1));
        assert_eq!(filter.to_condition(), "( & id = 1)");
        assert_eq!(filter.unresolved(), vec![RegistryMiss::new("Track", "local_note")]);
    }
}
