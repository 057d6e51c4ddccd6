use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Unknown field `{0}`")]
    UnknownField(String),

    #[error("Field `{0}` cannot be used to filter or sort")]
    NotQueryable(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Operator `{operator}` is not valid for field `{field}`")]
    OperatorNotAllowed { field: String, operator: String },

    #[error("Invalid value `{value}` for field `{field}`")]
    InvalidValue { field: String, value: String },

    #[error("Malformed query key: {0}")]
    MalformedKey(String),

    #[error("Unknown relation `{0}`")]
    UnknownRelation(String),
}
