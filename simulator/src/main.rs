use std::io::Write;

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fx2sim::{BIT_PERIOD, Bench, ModelId, UartRx};

#[derive(Parser)]
#[command(name = "fx2-sim")]
#[command(about = "UART/FX2 testbench driver")]
#[command(version)]
struct Args {
    /// Command script to run; without one, the bench is brought up, advanced
    /// and torn down directly
    #[arg(value_name = "SCRIPT")]
    script: Option<Utf8PathBuf>,

    /// VCD output file
    #[arg(long)]
    vcd: Option<Utf8PathBuf>,

    /// Clock cycles to advance when no script is given
    #[arg(long, default_value = "1000")]
    cycles: u32,

    /// Echo bytes decoded from the DUT serial output
    #[arg(long)]
    uart_console: bool,

    /// List available models and exit
    #[arg(long)]
    list_models: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.list_models {
        println!("Available models:");
        for model in Bench::available_models() {
            println!("  - {model}");
        }
        return Ok(());
    }

    let mut bench = Bench::new(ModelId::UartFx2);

    if let Some(script) = &args.script {
        let text = std::fs::read_to_string(script)
            .with_context(|| format!("Failed to read script {script}"))?;
        let output = fx2sim::run_script(&mut bench, &text)?;
        for line in output {
            println!("{line}");
        }
        return Ok(());
    }

    bench
        .init(args.vcd.as_deref().map(Utf8Path::as_std_path))
        .context("Failed to initialize simulation")?;

    let mut console = args.uart_console.then(|| UartRx::new(BIT_PERIOD));
    for _ in 0..args.cycles {
        bench.adv(1)?;
        if let Some(decoder) = console.as_mut() {
            if let Some(byte) = decoder.process(bench.uart_txd()?) {
                print!("{}", byte as char);
                std::io::stdout().flush().ok();
            }
        }
    }
    if console.is_some() {
        println!();
    }

    println!("time {}", bench.time());
    println!("dev {}", bench.get_dev()?);
    bench.end()?;
    Ok(())
}
