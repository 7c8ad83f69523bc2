//! Demonstration of the NIDS dashboard core.
//!
//! This example shows how to:
//! 1. Start a synthetic event feed
//! 2. Ingest events into a shared dashboard
//! 3. Sample the intensity window on a timer
//! 4. Receive audible-alert signals on a channel
//! 5. Export the visible log as a CSV report
//!
//! Run with: cargo run --example dashboard_demo

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::unbounded;
use nids_live_core::{
    core::{ChannelSink, ReportExporter, Sampler},
    event::EventFeed,
    Dashboard,
};

fn main() {
    println!("NIDS Live Core - Dashboard Demo");
    println!("===============================");
    println!();

    // Create components
    let (alert_tx, alert_rx) = unbounded();
    let dashboard = Dashboard::new(Box::new(ChannelSink::new(alert_tx))).into_shared();
    let sampler = Sampler::spawn(dashboard.clone(), Duration::from_millis(500))
        .expect("Failed to start sampler");
    let mut feed =
        EventFeed::synthetic(Duration::from_millis(50)).expect("Failed to start event feed");

    println!("Running for 10 seconds...");
    println!();

    // Set up stop flag
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    // Set up Ctrl+C handler
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    let start = std::time::Instant::now();
    let receiver = feed.receiver().clone();
    let mut event_count = 0;

    while running.load(Ordering::SeqCst) && start.elapsed() < Duration::from_secs(10) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(raw) => {
                event_count += 1;
                let mut dashboard = dashboard.lock().expect("dashboard lock poisoned");
                let _ = dashboard.handle_raw(raw);

                // Freeze the log halfway through to show pause semantics
                if event_count == 100 {
                    dashboard.pause();
                    println!("  Log paused at event {event_count}");
                } else if event_count == 140 {
                    dashboard.resume();
                    println!("  Log resumed at event {event_count}");
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }

        for signal in alert_rx.try_iter() {
            let cue = signal.tone();
            println!(
                "  ALERT {} ({:?} {}Hz -> {}Hz)",
                signal.label, cue.waveform, cue.start_hz, cue.end_hz
            );
        }

        if event_count > 0 && event_count % 40 == 0 {
            let snapshot = dashboard.lock().expect("dashboard lock poisoned").snapshot();
            println!(
                "  [{}s] counts: {:?} intensity: {:?}",
                start.elapsed().as_secs(),
                snapshot.categories.values(),
                snapshot.intensity
            );
        }
    }

    println!();
    println!("Stopping...");
    feed.stop();
    sampler.stop();

    let dashboard = dashboard.lock().expect("dashboard lock poisoned");
    let exporter = ReportExporter::default();
    match exporter.export(dashboard.log()) {
        Ok(csv) => {
            println!();
            println!("{} (first lines):", exporter.suggested_filename());
            for line in csv.lines().take(6) {
                println!("    {line}");
            }
        }
        Err(e) => println!("{e}"),
    }

    // Final statistics
    println!();
    println!("{}", dashboard.summary());
    println!();
    println!("Demo complete!");
}
