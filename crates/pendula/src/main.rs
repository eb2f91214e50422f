//! Pendula - Double-pendulum simulator

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use pendula_gui::ApiSettings;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer};

#[derive(Parser, Debug)]
#[command(name = "pendula")]
#[command(about = "Double-pendulum simulator with batch runs and a JSON API")]
#[command(version, subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run CLI batch/single simulation mode
    Cli {
        /// Pass remaining arguments to pendula-cli
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Serve the JSON API
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,

        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Frames per batch when a request does not ask for a count
        #[arg(long, default_value_t = ApiSettings::default().default_frames)]
        default_frames: usize,

        /// Upper bound on frames per request
        #[arg(long, default_value_t = ApiSettings::default().max_frames)]
        max_frames: usize,
    },
}

fn level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(level(cli.verbose)))
        .init();

    match cli.command {
        Commands::Cli { args } => run_cli(&args),
        Commands::Serve {
            port,
            host,
            default_frames,
            max_frames,
        } => {
            let settings = ApiSettings {
                default_frames: default_frames.min(max_frames),
                max_frames,
            };
            run_server(port, &host, settings)
        }
    }
}

fn run_cli(args: &[String]) -> anyhow::Result<()> {
    let full_args: Vec<&str> = std::iter::once("pendula-cli")
        .chain(args.iter().map(String::as_str))
        .collect();
    pendula_cli::run_cli_main(&full_args).context("batch run failed")
}

fn run_server(port: u16, host: &str, settings: ApiSettings) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid bind address {host}:{port}"))?;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let app = pendula_gui::create_router(settings);
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!(%addr, max_frames = settings.max_frames, "API server started");
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
        info!("API server stopped");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_prints_help() {
        assert!(Cli::try_parse_from(["pendula"]).is_err());
    }

    #[test]
    fn test_serve_frame_limits() {
        let cli = Cli::try_parse_from(["pendula", "serve", "--max-frames", "100"]).unwrap();
        match cli.command {
            Commands::Serve {
                default_frames,
                max_frames,
                ..
            } => {
                assert_eq!(max_frames, 100);
                assert_eq!(default_frames, ApiSettings::default().default_frames);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cli_args_pass_through() {
        let cli = Cli::try_parse_from(["pendula", "-v", "cli", "--sweep-param", "l1"]).unwrap();
        assert_eq!(level(cli.verbose), LevelFilter::DEBUG);
        match cli.command {
            Commands::Cli { args } => assert_eq!(args, ["--sweep-param", "l1"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_cli_errors_propagate() {
        let err = run_cli(&["--config".to_string(), "/nonexistent/pendula.json".to_string()])
            .unwrap_err();
        assert!(format!("{err:#}").contains("batch run failed"));
    }
}
