use clap::Parser;
use lexicue::cli::Args;
use lexicue::output;
use miette::IntoDiagnostic;

fn main() -> miette::Result<()> {
    let args = Args::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::run(&args, &mut out).into_diagnostic()?;
    Ok(())
}
