mod auth;
mod config;
mod context;
mod db;
mod error;
mod reject;
mod routes;
mod runtime;
mod session;
mod templates;
mod util;
mod wiki;


use anyhow::Error;
use config::Config;
use context::Context;
use std::net::SocketAddr;
use structopt::StructOpt;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(StructOpt)]
#[structopt(author, about)]
struct Opt {
    /// Configuration file to use
    #[structopt(
        short,
        long,
        name = "FILE",
        env = "MININET_CONFIG",
        default_value = "mininet.json"
    )]
    config: String,

    #[structopt(subcommand)]
    command: Option<Command>,
}

#[derive(StructOpt)]
enum Command {
    /// Initialises the configuration file with default values
    Init,
}

fn main() -> Result<(), Error> {
    let args: Opt = Opt::from_args();

    if let Some(Command::Init) = &args.command {
        config::write(&args.config)?;
        println!("Default config written");
        return Ok(());
    }

    let config = config::read(&args.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let runtime = runtime::build(config)?;
    runtime.block_on(run(config))?;

    Ok(())
}

async fn run(config: &'static Config) -> Result<(), Error> {
    let ctx = match Context::build(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("startup failed: {:#}", e);
            return Err(e);
        }
    };

    let addr = SocketAddr::new(config.address, config.port);
    let (addr, server) = warp::serve(routes::handler(ctx))
        .try_bind_with_graceful_shutdown(addr, async {
            tokio::signal::ctrl_c().await.ok();
        })?;

    tracing::info!("server running at http://{}", addr);
    server.await;
    tracing::info!("server stopped");
    Ok(())
}
