use thiserror::Error;

#[derive(Error, Debug)]
pub enum AstGrepError {
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("unknown language: {name}")]
    UnknownLanguage { name: String },
}
