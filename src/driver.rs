use std::fs;

use serde::Serialize;

use crate::errors::PassError;
use crate::optimizer::Program;

fn write_debug_file(filename: &str, data: impl Serialize) {
    let _ = fs::write(filename, serde_json::to_vec_pretty(&data).unwrap());
}

/// Run the pass over a source buffer. With `debug` set, the settled
/// statement table is dumped to `statements.json` for inspection.
pub fn run_pass(source: &str, debug: bool) -> Result<String, PassError> {
    let mut program = Program::parse(source)?;
    program.fold()?;

    if debug {
        write_debug_file("statements.json", &program);
    }

    Ok(program.synthesize())
}
