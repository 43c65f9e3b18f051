use std::io::{self, Write};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<(), failure::Error> {
    // Logs go to stderr so stdout only carries the walkthrough
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    handle_demo::demo::run(&mut out)?;
    out.flush()?;

    Ok(())
}
