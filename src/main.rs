use std::sync::Arc;

mod config;
mod error;
mod handler;
mod logger;
mod resolve;
mod response;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Malformed configuration is fatal; a missing file means defaults.
    let cfg = config::Config::load()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let ctx = Arc::new(config::ServerContext::new(cfg));

    logger::log_server_start(&addr);
    server::run(listener, ctx).await
}
