/// Why a value (or one of its elements) could not be encoded.
///
/// Inside containers these are recovered from: the element is skipped and a
/// diagnostic is recorded. Only a failure of the top-level value surfaces as
/// an `Err` from [`crate::encode`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EncodeError {
    /// No encoding exists for the value.
    #[error("no encoding exists for {value} ({type_name})")]
    Unsupported { type_name: String, value: String },

    /// The value is an ancestor of itself on the current encoding path.
    #[error("recursive structure detected: {type_name} object refers back to itself")]
    Recursive { type_name: String },

    /// A temporal value could not be rendered with its fixed format.
    #[error("could not format {kind} value: {message}")]
    Format { kind: &'static str, message: String },
}

/// Why a canonical tree could not be decoded. Fatal to the decode call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    /// A syntactically valid wrapper carries a tag its family does not know.
    #[error("unrecognized tag '{tag}' for {type_key} in {mapping}")]
    UnknownTag {
        type_key: &'static str,
        tag: String,
        mapping: String,
    },

    /// The wrapper's payload does not have the shape its tag requires.
    #[error("invalid payload for '{tag}': {message}")]
    InvalidPayload { tag: String, message: String },
}

impl DecodeError {
    pub(crate) fn payload(tag: &str, message: impl Into<String>) -> Self {
        DecodeError::InvalidPayload {
            tag: tag.to_string(),
            message: message.into(),
        }
    }
}
