use std::process::ExitCode;

use configs::AppConfig;
use dotenvy::dotenv;
use tracing::{error, info};
use uuid::Uuid;

fn runtime_for(cfg: &AppConfig) -> std::io::Result<tokio::runtime::Runtime> {
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    // normalize_and_validate guarantees a positive count
    if let Some(threads) = cfg.server.worker_threads {
        builder.worker_threads(threads);
    }
    builder.build()
}

fn main() -> ExitCode {
    // .env before logging so RUST_LOG and LOG_FORMAT apply
    dotenv().ok();
    let format = common::utils::logging::init_logging_from_env();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    info!(service = "crudtest", event = "logger_init", ?format, %service_id, pid, "logging ready");

    std::panic::set_hook(Box::new(move |info| {
        error!(service = "crudtest", event = "panic", %service_id, pid, message = %info, "unhandled panic");
    }));

    let cfg = match AppConfig::load_and_validate() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "crudtest", event = "config_invalid", error = %e, "cannot start without a valid configuration");
            return ExitCode::FAILURE;
        }
    };

    let rt = match runtime_for(&cfg) {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "crudtest", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        service = "crudtest",
        event = "start",
        %service_id,
        version = env!("CARGO_PKG_VERSION"),
        addr = %cfg.server.bind_addr(),
        prefix = %cfg.server.route_prefix,
        predicate_mode = ?cfg.find.predicate_mode,
        "crudtest starting"
    );

    match rt.block_on(server::run(cfg)) {
        Ok(()) => {
            info!(service = "crudtest", event = "stop", %service_id, "drained and stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service = "crudtest", event = "run_failed", %service_id, error = %e, "server exited with error");
            ExitCode::FAILURE
        }
    }
}
