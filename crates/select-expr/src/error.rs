#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    #[error("expected closing {quote} in {remaining:?}")]
    UnterminatedQuote { quote: char, remaining: String },

    #[error("expected expression before {token} {remaining:?}")]
    MissingOperand { token: String, remaining: String },

    #[error("unexpected {token} {remaining:?}")]
    UnexpectedToken { token: String, remaining: String },

    #[error("incomplete expression {stack}")]
    IncompleteExpression { stack: String },

    #[error("expression nested deeper than {limit} levels before {remaining:?}")]
    TooDeep { limit: usize, remaining: String },

    #[error("selector engine error for {selector:?}: {message}")]
    Engine { selector: String, message: String },
}

impl SelectError {
    /// Builds an engine failure for `selector`.
    pub fn engine(selector: &str, message: impl Into<String>) -> Self {
        Self::Engine {
            selector: selector.to_string(),
            message: message.into(),
        }
    }

    /// Returns true for failures raised while parsing expression text.
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Self::Engine { .. })
    }
}

pub type Result<T> = std::result::Result<T, SelectError>;
