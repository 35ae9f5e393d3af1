use clap::Parser;
use tokio::runtime::Runtime;
use tokio::time::{Duration, sleep};

use trend_sentry::{Cli, SentryEngine, config::ANALYSIS, notify, run_scan_cycle};

fn main() -> anyhow::Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Run the scan loop on a Tokio runtime
    let rt = Runtime::new().expect("Failed to create Tokio runtime");
    rt.block_on(async {
        let mut engine = SentryEngine::new(ANALYSIS.clone());
        let notifiers = notify::build_notifier_chain();

        loop {
            match run_scan_cycle(&mut engine, &notifiers, &args).await {
                Ok(_) => {}
                Err(e) if args.watch => {
                    // In watch mode a failed cycle is retried next poll
                    log::error!("Scan cycle failed: {:#}", e);
                }
                Err(e) => return Err(e),
            }

            if !args.watch {
                return Ok(());
            }
            sleep(Duration::from_secs(args.poll_secs)).await;
        }
    })
}
