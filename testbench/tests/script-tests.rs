//! Script tests runner
//!
//! Discovers `.tb` command scripts under testbench/scripts/ and runs each one
//! as a trial, checking the output against the script's `#>` expectations.

use std::path::{Path, PathBuf};

use anyhow::Result;
use glob::glob;
use libtest_mimic::{Arguments, Failed, Trial};
use testbench::run_script_trial;

const SCRIPTS_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/scripts");

fn main() -> Result<()> {
    let args = Arguments::from_args();
    let tests = discover_tests()?;
    libtest_mimic::run(&args, tests).exit();
}

/// Discover all script test cases
fn discover_tests() -> Result<Vec<Trial>> {
    let mut trials = Vec::new();

    let pattern = format!("{SCRIPTS_PATH}/*.tb");
    for entry in glob(&pattern)? {
        let path: PathBuf = entry?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("script")
            .to_owned();
        trials.push(Trial::test(name, move || run_trial(&path)));
    }

    Ok(trials)
}

/// Run a single test case
fn run_trial(path: &Path) -> Result<(), Failed> {
    match run_script_trial(path) {
        Ok(()) => Ok(()),
        Err(e) => Err(format!("{:#}", e).into()),
    }
}
