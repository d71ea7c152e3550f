use clap::{Parser, Subcommand};
use starbase::{App, AppResult, AppSession};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webimport::commands::run_serve;

/// webimport - serve source artifacts to remote resolvers
#[derive(Parser)]
#[command(name = "webimport")]
#[command(about = "Serve a directory of source artifacts over HTTP", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Serve a directory to remote resolvers
    Serve {
        /// Directory to serve; this should be your package directory
        directory: PathBuf,
        /// Port to listen on
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },
}

/// Application session for the webimport CLI
#[derive(Clone)]
struct WebImportSession {
    command: Commands,
}

#[async_trait::async_trait]
impl AppSession for WebImportSession {
    async fn execute(&mut self) -> AppResult {
        match &self.command {
            Commands::Serve { directory, port } => {
                let (directory, port) = (directory.clone(), *port);
                // The accept loop blocks until the process is terminated.
                match tokio::task::spawn_blocking(move || run_serve(directory, port)).await {
                    Ok(result) => result,
                    Err(e) => {
                        eprintln!("Server task failed: {}", e);
                        Ok(Some(1))
                    }
                }
            }
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> starbase::MainResult {
    let cli = Cli::parse();
    init_logging();

    let session = WebImportSession {
        command: cli.command,
    };

    let exit_code = App::default()
        .run(
            session,
            |mut session| async move { session.execute().await },
        )
        .await?;

    Ok(std::process::ExitCode::from(exit_code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_default_port() {
        let cli = Cli::try_parse_from(["webimport", "serve", "pkgs"]).unwrap();
        let Commands::Serve { directory, port } = cli.command;
        assert_eq!(directory, PathBuf::from("pkgs"));
        assert_eq!(port, 8080);
    }

    #[test]
    fn test_serve_port_flag() {
        let cli = Cli::try_parse_from(["webimport", "serve", "pkgs", "-p", "9000"]).unwrap();
        let Commands::Serve { port, .. } = cli.command;
        assert_eq!(port, 9000);
    }

    #[test]
    fn test_directory_required() {
        assert!(Cli::try_parse_from(["webimport", "serve"]).is_err());
    }

    #[tokio::test]
    async fn test_missing_directory_exits_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = WebImportSession {
            command: Commands::Serve {
                directory: dir.path().join("missing"),
                port: 0,
            },
        };

        let code = session.execute().await.unwrap();
        assert_eq!(code, Some(1));
    }
}
