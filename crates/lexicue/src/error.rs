use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// Errors that can occur while lowering lexicon documents to CUE.
#[derive(Debug, Error, Diagnostic)]
pub enum CodegenError {
    /// IO error when reading a schema document
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The document is not valid lexicon JSON
    #[error("{0}")]
    #[diagnostic(
        code(lexicue::parse_error),
        help("check that the file is valid JSON and follows the lexicon schema")
    )]
    Parse(#[from] serde_json::Error),

    /// Document identifier with fewer than three labels
    #[error("not enough elements in path {id:?}")]
    #[diagnostic(code(lexicue::invalid_id))]
    InvalidId { id: String },

    /// An `enum` attribute was present but empty
    #[error("empty enum")]
    #[diagnostic(code(lexicue::empty_enum))]
    EmptyEnum,

    /// A union carried no refs
    #[error("no elements in union")]
    #[diagnostic(code(lexicue::empty_union))]
    EmptyUnion,

    /// A token appeared below the top level of a definition
    #[error("token not defined at top level")]
    #[diagnostic(code(lexicue::token_placement))]
    TokenPlacement,

    /// A document-level kind appeared in type position
    #[error("unknown type {kind:?}")]
    #[diagnostic(code(lexicue::unknown_type))]
    UnknownType { kind: String },

    /// Lowering a named definition failed
    #[error("bad schema for {name:?}: {source}")]
    #[diagnostic(code(lexicue::bad_definition))]
    Definition {
        name: String,
        #[source]
        source: Box<CodegenError>,
    },
}

impl CodegenError {
    /// Wrap an error with the name of the definition being lowered.
    pub fn definition(name: impl Into<String>, source: CodegenError) -> Self {
        Self::Definition {
            name: name.into(),
            source: Box::new(source),
        }
    }
}

/// Result type for lowering operations
pub type Result<T> = std::result::Result<T, CodegenError>;
