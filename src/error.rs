use thiserror::Error;

/// Errors produced by the toolkit.
///
/// Dialect violations are deliberately absent here: whether a tree belongs to
/// a dialect is a query, so the checker reports them via
/// [crate::dialect::ConformanceReport] instead of failing.
#[derive(Debug, Error)]
pub enum IrError {
    /// A construction-time field mismatch, or an attempt to mutate a field
    /// against the rules of the variant's flavor.
    #[error("invalid field `{field}` of `{variant}`: {message}")]
    Validation {
        variant: String,
        field: String,
        message: String,
    },
    /// A malformed handler or template registration, or a rewrite outcome
    /// that does not fit the field it was produced for.
    #[error("dispatch error: {0}")]
    Dispatch(String),
    /// Code generation reached a variant without a template anywhere in its
    /// ancestor chain. Unlike plain traversal, rendering has no meaningful
    /// default, so this is fatal.
    #[error("no template registered for variant `{0}` or any of its ancestors")]
    UnsupportedVariant(String),
    /// The external formatting service failed. The generator treats this as
    /// recoverable and falls back to unformatted output.
    #[error("formatting service failed: {0}")]
    Formatting(String),
    /// A failure raised inside a user-provided handler. Propagated to the
    /// caller of the traversal unmodified.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl IrError {
    pub fn validation(
        variant: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> IrError {
        IrError::Validation {
            variant: variant.into(),
            field: field.into(),
            message: message.into(),
        }
    }
    pub fn dispatch(message: impl Into<String>) -> IrError {
        IrError::Dispatch(message.into())
    }
}
