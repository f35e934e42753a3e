use clap::Parser;
use ops_cli::{render_response, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if let Some(response) = run(&cli).await? {
        render_response(&response, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())?;
    }

    Ok(())
}
