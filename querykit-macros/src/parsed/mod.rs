mod field;
mod model;

pub(crate) use field::ParsedField;
pub(crate) use model::ParsedModel;
