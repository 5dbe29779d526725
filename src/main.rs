use anyhow::{Context, Result};
use benchscale::cli::{Cli, OutputFormat};
use benchscale::compare;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; errors always reach stderr, everything with --debug
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.debug);

    let format = args.format;
    let request = args.into_request()?;

    let execution = compare::execute(&request).with_context(|| {
        format!(
            "Failed to rescale {} against {}",
            request.diff.display(),
            request.base.display()
        )
    })?;

    match format {
        OutputFormat::Text => print!("{}", execution.render_text(&request.config)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&execution)?),
    }

    Ok(())
}
