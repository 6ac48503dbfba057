//! Wire value codec.
//!
//! [`QueryValue`] renders a Rust value as a literal of the query language.
//! Only kinds the wire protocol understands implement it, so an unsupported
//! literal is a compile error rather than a malformed query.

use chrono::{DateTime, Utc};

/// A value that can appear as a literal in a query clause.
pub trait QueryValue {
    fn to_query_string(&self) -> String;
}

// Strings are wrapped verbatim; embedded quotes are passed through unescaped.
impl QueryValue for str {
    fn to_query_string(&self) -> String {
        format!("\"{self}\"")
    }
}

impl QueryValue for String {
    fn to_query_string(&self) -> String {
        self.as_str().to_query_string()
    }
}

macro_rules! impl_display_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryValue for $ty {
                fn to_query_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_display_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool);

macro_rules! impl_float_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryValue for $ty {
                fn to_query_string(&self) -> String {
                    let rendered = self.to_string();
                    if self.is_finite() && !rendered.contains('.') && !rendered.contains('e') {
                        format!("{rendered}.0")
                    } else {
                        rendered
                    }
                }
            }
        )*
    };
}

impl_float_value!(f32, f64);

impl<T: QueryValue> QueryValue for Option<T> {
    fn to_query_string(&self) -> String {
        match self {
            Some(value) => value.to_query_string(),
            None => "null".to_string(),
        }
    }
}

impl<T: QueryValue> QueryValue for [T] {
    fn to_query_string(&self) -> String {
        let items: Vec<String> = self.iter().map(QueryValue::to_query_string).collect();
        format!("[{}]", items.join(","))
    }
}

impl<T: QueryValue, const N: usize> QueryValue for [T; N] {
    fn to_query_string(&self) -> String {
        self.as_slice().to_query_string()
    }
}

impl<T: QueryValue> QueryValue for Vec<T> {
    fn to_query_string(&self) -> String {
        self.as_slice().to_query_string()
    }
}

/// Timestamps travel as unix seconds.
impl QueryValue for DateTime<Utc> {
    fn to_query_string(&self) -> String {
        self.timestamp().to_string()
    }
}

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query_string(&self) -> String {
        (**self).to_query_string()
    }
}
