//! Typed field references.
//!
//! A [`Field<M>`] names one field of model `M` without spelling out its wire
//! key. References are normally obtained from the path struct generated by
//! `#[derive(Queryable)]` (`M::fields()`), which makes referring to a field of
//! the wrong model a type error.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::config;
use crate::errors::RegistryMiss;
use crate::filter::{Filter, Operator};
use crate::types::Queryable;
use crate::value::QueryValue;

/// Handle identifying "field `name` of model `M`".
pub struct Field<M> {
    name: &'static str,
    _model: PhantomData<fn() -> M>,
}

impl<M> Field<M> {
    /// Creates a reference to the field with the given logical name.
    ///
    /// Nothing checks that the model registers `name`; an unknown name simply
    /// resolves to no wire key.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _model: PhantomData,
        }
    }

    /// The logical (Rust) field name.
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl<M: Queryable> Field<M> {
    /// Resolve this reference to its wire key.
    pub fn wire_key(self) -> Option<&'static str> {
        M::field_name(self)
    }

    /// Resolve this reference, logging and returning a [`RegistryMiss`] when
    /// the model has no registry entry for it.
    pub fn resolve(self) -> Result<&'static str, RegistryMiss> {
        M::field_name(self).ok_or_else(|| {
            let miss = RegistryMiss::new(M::descriptor().model, self.name);
            config::report_registry_miss(&miss);
            miss
        })
    }

    /// `field = value`
    pub fn eq(self, value: impl QueryValue) -> Filter<M> {
        Filter::compare(self, Operator::Eq, value)
    }

    /// `field != value`
    pub fn ne(self, value: impl QueryValue) -> Filter<M> {
        Filter::compare(self, Operator::Ne, value)
    }

    /// `field > value`
    pub fn gt(self, value: impl QueryValue) -> Filter<M> {
        Filter::compare(self, Operator::Gt, value)
    }

    /// `field < value`
    pub fn lt(self, value: impl QueryValue) -> Filter<M> {
        Filter::compare(self, Operator::Lt, value)
    }

    /// `field >= value`
    pub fn ge(self, value: impl QueryValue) -> Filter<M> {
        Filter::compare(self, Operator::Ge, value)
    }

    /// `field <= value`
    pub fn le(self, value: impl QueryValue) -> Filter<M> {
        Filter::compare(self, Operator::Le, value)
    }

    /// `field = (v1,v2,...)`
    pub fn is_in<V: QueryValue>(self, values: impl IntoIterator<Item = V>) -> Filter<M> {
        Filter::is_in(self, values)
    }
}

// Manual impls: the derives would demand the same traits from `M`.
impl<M> Clone for Field<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Field<M> {}

impl<M> PartialEq for Field<M> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<M> Eq for Field<M> {}

impl<M> Hash for Field<M> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl<M> fmt::Debug for Field<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field<{}>({})", std::any::type_name::<M>(), self.name)
    }
}
