use std::panic;

use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;

use cradle_screener::{Cli, ScanEvent, ScreenerEngine, data, report, utils::format_duration};

fn init_log() {
    let (global_level, my_code_level) = if cfg!(debug_assertions) {
        (log::LevelFilter::Warn, log::LevelFilter::Info)
    } else {
        (log::LevelFilter::Error, log::LevelFilter::Info)
    };

    let mut builder = env_logger::Builder::new();

    builder
        .filter(None, global_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), my_code_level)
        // RUST_LOG wins over the defaults above
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        log::error!("CRITICAL PANIC:\n{}\nStack Trace:\n{}", info, backtrace);
    }));
    init_log();

    let args = Cli::parse();
    let config = args.resolve_config()?;
    let provider = data::provider_for(&config.universe)?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                ScanEvent::Progress(p) => eprint!(
                    "\r{} {}/{} ETA {:>8}",
                    p.timeframe,
                    p.completed,
                    p.total,
                    p.eta
                        .map(|d| format_duration(d.as_millis() as i64))
                        .unwrap_or_default()
                ),
                ScanEvent::TimeframeCompleted(_) | ScanEvent::Finished { .. } => eprintln!(),
                _ => {}
            }
        }
    });

    let mut engine = ScreenerEngine::new(provider, config).with_events(tx);

    let cancel = engine.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Ctrl-C received, stopping after the current symbol");
            cancel.cancel();
        }
    });

    if engine.config().auto_run {
        engine
            .run_auto(|state| println!("{}", report::render(state)))
            .await;
    } else {
        let state = engine.run_manual().await;
        println!("{}", report::render(state));
    }
    Ok(())
}
