use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("summable attribute `{attribute}` holds non-integer value `{value}`")]
    ExpectedInteger { attribute: String, value: String },

    #[error("value `{value}` of attribute `{attribute}` is not in `local/remote` form")]
    MalformedPair { attribute: String, value: String },
}

pub type Result<T> = std::result::Result<T, Error>;
