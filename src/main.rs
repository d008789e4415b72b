use std::sync::Arc;

mod api;
mod config;
mod handler;
mod http;
mod logger;
mod questionnaire;
mod server;

fn main() {
    if let Err(e) = run() {
        logger::log_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    // First argument: config file path without extension
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());
    let cfg = config::Config::load_from(&config_path)?;
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
    let root_dir = cfg.resolve_root_dir()?;

    let listener = server::create_listener(addr)
        .map_err(|e| server::describe_bind_error(&addr, &e))?;

    logger::log_server_start(&listener.local_addr()?, &root_dir, &cfg);

    let state = Arc::new(config::AppState::new(&cfg, root_dir));
    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    server::start_server_loop(listener, state, signals).await;
    logger::log_info("Server stopped");
    Ok(())
}
