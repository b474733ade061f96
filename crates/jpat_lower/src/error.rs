use jpat_ast::Span;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LowerError {
    /// An upstream contract violation; never recovered from.
    #[error("internal invariant violated: {message}")]
    Invariant { message: String, span: Span },

    #[error("unsupported construct: {construct}")]
    UnsupportedConstruct { construct: String, span: Span },

    #[error("unknown record type in deconstruction pattern: {name}")]
    UnknownRecord { name: String, span: Span },

    #[error("deconstruction of {name} has {patterns} component patterns, record declares {components}")]
    ComponentArityMismatch {
        name: String,
        patterns: usize,
        components: usize,
        span: Span,
    },

    #[error("case label cannot be classified: {label}")]
    UnclassifiableLabel { label: String, span: Span },
}

impl LowerError {
    pub fn span(&self) -> &Span {
        match self {
            LowerError::Invariant { span, .. }
            | LowerError::UnsupportedConstruct { span, .. }
            | LowerError::UnknownRecord { span, .. }
            | LowerError::ComponentArityMismatch { span, .. }
            | LowerError::UnclassifiableLabel { span, .. } => span,
        }
    }

    pub(crate) fn invariant(message: impl Into<String>, span: &Span) -> Self {
        LowerError::Invariant {
            message: message.into(),
            span: span.clone(),
        }
    }
}
