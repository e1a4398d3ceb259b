use clap::Parser;
use email_detection::cli::commands::{DetectArgs, cmd_detect};
use email_detection::cli::config::{
    Cli, Commands, ENDPOINT_ENV, build_endpoint, load_config, resolve_endpoint_settings,
};
use email_detection::engine::engine::DetectOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref());

    // Resolve endpoint settings: CLI > config > env > defaults
    let settings = resolve_endpoint_settings(&cli, &config.endpoint, std::env::var(ENDPOINT_ENV).ok());
    let endpoint = build_endpoint(&settings)?;

    match &cli.command {
        Commands::Detect {
            input,
            text,
            vision,
            images,
            format,
            drafts,
            trace,
            output,
        } => {
            let args = DetectArgs {
                input,
                options: DetectOptions {
                    text: *text || config.detect.text,
                    vision: *vision || config.detect.vision,
                },
                images: images.as_deref(),
                format: format.as_deref().unwrap_or(&config.detect.format),
                drafts: *drafts,
                trace: trace.as_deref(),
                output: output.as_deref(),
            };
            cmd_detect(args, endpoint).await?;
        }
    }

    Ok(())
}

/// RUST_LOG wins; otherwise -v selects the level for this crate.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("warn,email_detection={}", level))),
        )
        .init();
}
