//! Archive assembly: drives the per-document lowering and frames the result
//! as a textual archive whose entries are delimited by `-- path --` lines.

use crate::cli::Args;
use crate::codegen::Generator;
use crate::cue;
use crate::deps::DependencyGraph;
use crate::error::Result;
use crate::lexicon::LexiconDoc;
use std::any::Any;
use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Module root under which every generated package lives.
pub const MODULE_ROOT: &str = "lexicon.me";

/// Process every input and write the complete archive to `out`.
///
/// Document-level failures are reported to standard error as
/// `<path>: <detail>` and skipped; only write failures abort the run.
pub fn run(args: &Args, out: &mut dyn Write) -> io::Result<()> {
    let module_root = if args.map {
        format!("{MODULE_ROOT}/defs")
    } else {
        MODULE_ROOT.to_owned()
    };
    let mut deps = DependencyGraph::new();

    // The leading exec line marks the archive as a cue vet test script.
    writeln!(out, "exec cue vet ./...")?;
    writeln!(out)?;
    writeln!(out, "-- cue.mod/module.cue --")?;
    writeln!(out, "module: {}", cue::format::quote(&module_root))?;
    writeln!(out, "language: version: {}", cue::format::quote("v0.10.0"))?;

    for input in &args.inputs {
        if input == "-" {
            let mut data = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut data) {
                eprintln!("cannot read <stdin>: {err}");
                continue;
            }
            match compile_document(&data, args.map, &module_root, &mut deps) {
                Ok((entry, text)) => write!(out, "-- {entry} --\n{text}")?,
                Err(err) => eprintln!("<stdin>: {err}"),
            }
            continue;
        }
        for path in crate::fs::schema_files(Path::new(input)) {
            match compile_file(&path, args.map, &module_root, &mut deps) {
                Ok((entry, text)) => write!(out, "-- {entry} --\n{text}")?,
                Err(err) => eprintln!("{}: {err}", path.display()),
            }
        }
    }

    write!(
        out,
        "-- cue.mod/pkg/cueschemas.org/lexicue/lexicue.cue --\n{}",
        crate::LEXICUE_PRELUDE
    )?;
    write!(out, "-- deps.mermaid --\n{}", deps.mermaid(&module_root))?;
    write!(out, "-- cycles --\n{}", deps.cycles(&module_root))?;
    Ok(())
}

/// Lower one document file. A panic while processing it is re-raised
/// annotated with the offending path.
fn compile_file(
    path: &Path,
    use_map: bool,
    module_root: &str,
    deps: &mut DependencyGraph,
) -> Result<(String, String)> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let data = std::fs::read_to_string(path)?;
        compile_document(&data, use_map, module_root, deps)
    }));
    match outcome {
        Ok(result) => result,
        Err(payload) => panic!("panic on {path:?}: {}", payload_message(&*payload)),
    }
}

/// Lower one document into its archive entry: the entry path and the
/// pretty-printed CUE file.
pub fn compile_document(
    data: &str,
    use_map: bool,
    module_root: &str,
    deps: &mut DependencyGraph,
) -> Result<(String, String)> {
    let doc: LexiconDoc = serde_json::from_str(data)?;
    let mut generator = Generator::new(&doc.id, use_map, module_root, deps)?;
    let file = generator.lower(&doc)?;
    Ok((generator.entry_name(), cue::format::file(&file)))
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}
