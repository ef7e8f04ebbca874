pub mod cli;
pub mod codegen;
pub mod cue;
pub mod deps;
pub mod error;
pub mod fs;
pub mod lexicon;
pub mod nsid;
pub mod output;

/// Import path of the embedded prelude package.
pub const LEXICUE_PKG: &str = "cueschemas.org/lexicue";

/// CUE prelude defining the lexicon kind vocabulary; emitted verbatim into
/// every generated archive.
pub const LEXICUE_PRELUDE: &str = include_str!("lexicue.cue");
