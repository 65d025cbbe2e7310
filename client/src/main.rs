use clap::Parser;
use client::network::Contestant;
use log::info;
use shared::DEFAULT_SERVER_PORT;
use tokio::io::{AsyncWriteExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal contestant for the millionaire game", long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_SERVER_PORT))]
    server: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keep the terminal readable; RUST_LOG=info shows connection details
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    info!("Connecting to: {}", args.server);

    let mut contestant = Contestant::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());

    tokio::select! {
        result = contestant.run(&args.server) => result?,
        _ = tokio::signal::ctrl_c() => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(b"\n\nThanks for playing! Goodbye!\n").await?;
            stdout.flush().await?;
        }
    }

    Ok(())
}
