use clap::Parser;

/// Runs the session revocation action for a host job framework over stdio.
#[derive(Debug, Parser)]
#[command(name = "revoke-sessions", version)]
struct Cli {
    /// Handler used when a request does not name one (invoke, error, halt).
    #[arg(long, default_value = "invoke", env = "REVOKE_SESSIONS_HANDLER")]
    handler: String,

    /// Read a single request from stdin, answer it and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if cli.once {
        match revoke_sessions::host::server::run_once(&cli.handler).await {
            Ok(response) if response.ok => {}
            Ok(_) => std::process::exit(1),
            Err(err) => {
                eprintln!("revoke-sessions: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }
    if let Err(err) = revoke_sessions::host::server::run_stdio(&cli.handler).await {
        eprintln!("revoke-sessions: {}", err);
        std::process::exit(1);
    }
}
