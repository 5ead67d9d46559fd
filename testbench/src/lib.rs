//! Script-driven integration harness for the bench.
//!
//! A `.tb` file is an ordinary command script; lines starting with `#>`
//! declare the output the script must produce, in order.

use std::path::Path;

use anyhow::{Context, Result, bail};
use fx2sim::{Bench, ModelId};

/// Run one script file and compare its output with the embedded expectations.
pub fn run_script_trial(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let expected = expected_lines(&text);

    let mut bench = Bench::new(ModelId::UartFx2);
    let actual = fx2sim::run_script(&mut bench, &text)
        .with_context(|| format!("Script {} failed", path.display()))?;

    if actual != expected {
        bail!(
            "Output mismatch:\n  expected: {:?}\n  actual:   {:?}",
            expected,
            actual
        );
    }
    Ok(())
}

/// Collect the `#>` expectation lines of a script.
pub fn expected_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.trim_start().strip_prefix("#>"))
        .map(|rest| rest.trim().to_string())
        .collect()
}
