//! Error types

use thiserror::Error;

/// Errors raised while building, feeding or persisting a [`crate::TextCnn`]
#[derive(Error, Debug)]
pub enum TextCnnError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("input_x has sequence length {actual}, model expects {expected}")]
    SequenceLength { expected: usize, actual: usize },

    #[error("Batch size mismatch: input_x has {inputs} rows, input_y has {labels}")]
    BatchMismatch { inputs: usize, labels: usize },

    #[error("input_y has {actual} classes, model expects {expected}")]
    ClassCount { expected: usize, actual: usize },

    #[error("Token id {id} is outside the vocabulary of size {vocab_size}")]
    TokenOutOfRange { id: i64, vocab_size: usize },

    #[error("Label {label} is outside the {num_classes} available classes")]
    LabelOutOfRange { label: usize, num_classes: usize },

    #[error("Dropout keep probability must be in (0, 1], got {0}")]
    KeepProbability(f64),

    #[error("Empty batch")]
    EmptyBatch,

    #[error("Initialization error: {0}")]
    Init(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record error: {0}")]
    Record(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TextCnnError>;
