use clap::Parser;
use lifeline::server::LifelineServer;
use log::info;
use shared::{DEFAULT_CHUNK_SIZE, DEFAULT_LIFELINE_PORT, DEFAULT_MAX_FRAME_LEN};

#[derive(Parser, Debug)]
#[command(author, version, about = "Lifeline server for the millionaire game", long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_LIFELINE_PORT)]
    port: u16,

    /// Socket read chunk size in bytes
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Longest accepted request line in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    max_frame_len: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let address = format!("{}:{}", args.host, args.port);

    let server = LifelineServer::bind(&address, args.chunk_size)
        .await?
        .with_max_frame_len(args.max_frame_len);

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
