use sqltree::*;
use std::io::{Read, Write};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(configuration = err.is_configuration(), "{err}");
            ExitCode::FAILURE
        }
    }
}

/// Format stdin to stdout with options taken from the environment.
fn run() -> Result {
    let options = FormatOptions::try_from(config()?)?;
    let formatter = Formatter::new(options)?;

    let mut bytes = Vec::new();
    std::io::stdin().lock().read_to_end(&mut bytes)?;
    let sql = decode(&bytes, None)?;
    info!(bytes = bytes.len(), "read input");

    let formatted = formatter.format(&sql)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(formatted.as_bytes())?;
    if !formatted.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
