use breadcrumb_recorder::{Settings, logging, run};
use std::process::ExitCode;

fn main() -> ExitCode {
    logging::setup_logging();
    let settings = Settings::from_cli();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(settings)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Recording failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
