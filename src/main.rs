use std::sync::Arc;

mod assets;
mod config;
mod content;
mod error;
mod handler;
mod http;
mod logger;
mod render;
mod routing;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;

    // Menu, templates and configuration are loaded once here and shared
    // read-only for the life of the process
    let state = Arc::new(config::AppState::new(cfg)?);
    if state.menu.is_empty() {
        logger::log_warning("Menu is empty; every request will resolve to the error page");
    }

    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &state.config, state.menu.len());

    server::run(listener, state).await
}
