// xbl-stats entry point.
//
// 1. Parse arguments and initialize tracing (stderr)
// 2. Load config, copying defaults on first run
// 3. Build every league's season and the career stats, writing JSON files
// 4. Answer --query, if given

use anyhow::Context;
use clap::Parser;
use tracing::info;

use xbl_app::Args;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing()?;
    info!("xbl-stats starting up");

    let report = xbl_app::run(&args)?;
    info!("done, {} files written", report.written.len());

    match report.query {
        Some(Ok(value)) => {
            let text = serde_json::to_string_pretty(&value).context("failed to format query result")?;
            println!("{text}");
        }
        Some(Err(e)) => return Err(e.into()),
        None => {}
    }
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("xbl=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
