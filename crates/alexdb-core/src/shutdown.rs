//! Graceful shutdown support via atomic flag
//!
//! Every stage checks the flag between batches (never mid-transaction)
//! and exits cleanly, leaving checkpoints consistent with the last
//! committed batch.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global shutdown flag — set by SIGTERM/SIGINT handler
pub fn shutdown_flag() -> &'static AtomicBool {
    static FLAG: AtomicBool = AtomicBool::new(false);
    &FLAG
}

/// Check if shutdown was requested
pub fn is_shutdown_requested() -> bool {
    shutdown_flag().load(Ordering::Relaxed)
}

/// Request shutdown (for signal handlers and tests)
pub fn request_shutdown() {
    shutdown_flag().store(true, Ordering::Relaxed);
}

/// Register SIGINT/SIGTERM handlers that set the shutdown flag.
pub fn install_signal_handlers() -> std::io::Result<()> {
    signal_hook::flag::register(signal_hook::consts::SIGINT, flag_arc())?;
    signal_hook::flag::register(signal_hook::consts::SIGTERM, flag_arc())?;
    Ok(())
}

fn flag_arc() -> std::sync::Arc<AtomicBool> {
    // signal-hook wants an Arc; mirror writes into the static flag via
    // a watcher thread started once.
    use std::sync::{Arc, OnceLock};
    static MIRROR: OnceLock<Arc<AtomicBool>> = OnceLock::new();
    MIRROR
        .get_or_init(|| {
            let arc = Arc::new(AtomicBool::new(false));
            let watcher = arc.clone();
            std::thread::spawn(move || loop {
                if watcher.load(Ordering::Relaxed) {
                    request_shutdown();
                    break;
                }
                std::thread::sleep(std::time::Duration::from_millis(100));
            });
            arc
        })
        .clone()
}
