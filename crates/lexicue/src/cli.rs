use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "lexicue",
    version,
    about = "Compile Lexicon schema documents into a CUE module archive"
)]
pub struct Args {
    /// Generate map entries rather than top level definitions
    #[arg(short = 'm', long = "map")]
    pub map: bool,

    /// Lexicon JSON files, directories to walk recursively, or `-` for stdin
    #[arg(required = true, value_name = "PATH")]
    pub inputs: Vec<String>,
}
