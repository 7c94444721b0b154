use std::thread;
use std::time::Duration;

use crossbeam::channel;
use vigil::prelude::*;

fn expensive_report() -> usize {
    thread::sleep(Duration::from_millis(400));
    4096
}

fn main() -> anyhow::Result<()> {
    let _log_guard = LoggerConfig::from_env().init()?;

    let _main_entry = register_current("main");
    install_termination_watch(TerminationConfig::default())?;

    register_failure_hook(|record| {
        tracing::info!(
            "custom handler saw `{}` fail: {}",
            record.worker.name,
            record.message()
        );
    });
    register_shutdown_hook(|| tracing::info!("flushing state before exit"));
    register_shutdown_hook(|| tracing::info!("closing connections"));

    // A worker that reports progress over a channel.
    let (tick_tx, tick_rx) = channel::bounded::<u32>(8);
    let ticker = spawn_worker("ticker", move || {
        for n in 0..5 {
            thread::sleep(Duration::from_millis(50));
            let _ = tick_tx.send(n);
        }
        5u32
    })?;

    while let TimedRecv::Value(n) = recv_timeout!(tick_rx, Duration::from_millis(500)) {
        tracing::info!("tick {n}");
    }

    for w in list_workers() {
        tracing::info!("worker {} `{}` is {:?}", w.id, w.name, w.state);
    }

    poll_until(
        || !ticker.is_live(),
        "ticker wound down",
        RetryBudget::new(20, Duration::from_millis(25)),
    )?;
    let produced = ticker.join()?;
    tracing::info!("ticker produced {produced} ticks");

    // Bounded wait on slow work; the abandoned worker keeps running detached.
    match with_deadline!(Duration::from_millis(100), expensive_report()) {
        Ok(len) => tracing::info!("report ready: {len} bytes"),
        Err(e) => tracing::warn!("gave up: {e}"),
    }

    // A panicking worker lands in the failure hub before join reports it.
    let doomed = spawn_worker("doomed", || -> u32 { panic!("simulated fault") })?;
    let _ = doomed.join();

    run_shutdown_hooks();
    Ok(())
}
