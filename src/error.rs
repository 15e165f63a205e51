use std::fmt::Display;

#[derive(thiserror::Error, Debug)]
pub enum LinearityError {
    #[error("invalid input: {}", .0)]
    InvalidInput(String),
    #[error("offset-corrected top-code level is zero, the converter has no dynamic range")]
    DivisionByZero,
    #[error("malformed run description")]
    Config(#[from] toml::de::Error),
}

impl LinearityError {
    pub(crate) fn invalid(message: impl Display) -> Self {
        Self::InvalidInput(message.to_string())
    }
}
