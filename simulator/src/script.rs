//! Line-oriented command language driving a bench session.
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! init [vcd-file]      create the model, reset it, optionally open a trace
//! trace <vcd-file>     open a trace sink
//! time                 print the current tick count
//! adv <cycles>         advance the clock
//! resetb [0|1]         print or set the reset line
//! get_dev              print the device register snapshot
//! end                  tear the model down
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::bench::Bench;
use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init(Option<Utf8PathBuf>),
    Trace(Utf8PathBuf),
    Time,
    Adv(u32),
    End,
    GetDev,
    Resetb(Option<u8>),
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Sim {
        line: usize,
        #[source]
        source: SimError,
    },
}

/// Parse a whole script into `(line, command)` pairs.
pub fn parse_script(text: &str) -> Result<Vec<(usize, Command)>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let stripped = raw.split('#').next().unwrap_or(raw).trim();
        if stripped.is_empty() {
            continue;
        }
        let command =
            parse_command(stripped).map_err(|reason| ScriptError::Parse { line, reason })?;
        commands.push((line, command));
    }
    Ok(commands)
}

fn parse_command(input: &str) -> Result<Command, String> {
    let mut parts = input.split_whitespace();
    let op = parts.next().unwrap_or_default();

    let command = match op {
        "init" => Command::Init(parts.next().map(Utf8PathBuf::from)),
        "trace" => {
            let file = parts
                .next()
                .ok_or_else(|| "trace takes a vcd filename".to_string())?;
            Command::Trace(Utf8PathBuf::from(file))
        }
        "time" => Command::Time,
        "adv" => {
            let count = parts
                .next()
                .ok_or_else(|| "adv takes a cycle count".to_string())?;
            let cycles = count
                .parse()
                .map_err(|_| format!("invalid cycle count: {count}"))?;
            Command::Adv(cycles)
        }
        "end" => Command::End,
        "get_dev" => Command::GetDev,
        "resetb" => match parts.next() {
            None => Command::Resetb(None),
            Some(level) => {
                let value: i64 = level
                    .parse()
                    .map_err(|_| format!("invalid reset level: {level}"))?;
                Command::Resetb(Some(u8::from(value != 0)))
            }
        },
        other => return Err(format!("unknown command: {other}")),
    };

    if parts.next().is_some() {
        return Err(format!("trailing arguments after {op}"));
    }
    Ok(command)
}

/// Parse and execute a script against a bench, collecting the output lines
/// produced by query commands.
pub fn run_script(bench: &mut Bench, text: &str) -> Result<Vec<String>, ScriptError> {
    let commands = parse_script(text)?;
    let mut output = Vec::new();
    for (line, command) in &commands {
        run_command(bench, command, &mut output)
            .map_err(|source| ScriptError::Sim { line: *line, source })?;
    }
    Ok(output)
}

/// Execute one command, appending any query output.
pub fn run_command(
    bench: &mut Bench,
    command: &Command,
    output: &mut Vec<String>,
) -> Result<(), SimError> {
    match command {
        Command::Init(path) => bench.init(path.as_deref().map(Utf8Path::as_std_path))?,
        Command::Trace(path) => bench.trace(path.as_std_path())?,
        Command::Time => output.push(format!("time {}", bench.time())),
        Command::Adv(cycles) => bench.adv(*cycles)?,
        Command::End => bench.end()?,
        Command::GetDev => {
            let record = bench.get_dev()?;
            output.push(format!("dev {record}"));
        }
        Command::Resetb(None) => output.push(format!("resetb {}", bench.resetb())),
        Command::Resetb(Some(level)) => bench.set_resetb(*level),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelId;

    #[test]
    fn parses_commands_and_skips_comments() {
        let script = "\
# bring-up
init trace.vcd
adv 10   # one burst
resetb 0
resetb
time

end
";
        let commands = parse_script(script).unwrap();
        let ops: Vec<Command> = commands.into_iter().map(|(_, cmd)| cmd).collect();
        assert_eq!(
            ops,
            vec![
                Command::Init(Some(Utf8PathBuf::from("trace.vcd"))),
                Command::Adv(10),
                Command::Resetb(Some(0)),
                Command::Resetb(None),
                Command::Time,
                Command::End,
            ]
        );
    }

    #[test]
    fn reset_level_is_coerced_to_a_bit() {
        let commands = parse_script("resetb 7").unwrap();
        assert_eq!(commands[0].1, Command::Resetb(Some(1)));
    }

    #[test]
    fn bad_input_reports_the_line() {
        let err = parse_script("init\nfoo\n").unwrap_err();
        assert!(matches!(err, ScriptError::Parse { line: 2, .. }));

        let err = parse_script("adv ten").unwrap_err();
        assert!(matches!(err, ScriptError::Parse { line: 1, .. }));

        let err = parse_script("time now").unwrap_err();
        assert!(matches!(err, ScriptError::Parse { line: 1, .. }));
    }

    #[test]
    fn runs_a_session_end_to_end() {
        let mut bench = Bench::new(ModelId::UartFx2);
        let output = run_script(&mut bench, "init\ntime\nadv 10\ntime\nend\n").unwrap();
        assert_eq!(output, vec!["time 1080".to_string(), "time 1300".to_string()]);
    }

    #[test]
    fn sim_errors_carry_the_line_number() {
        let mut bench = Bench::new(ModelId::UartFx2);
        let err = run_script(&mut bench, "# not initialized yet\nadv 5\n").unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Sim {
                line: 2,
                source: SimError::Uninitialized
            }
        ));
    }
}
