use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use colored::*;
use fuzzr_core::ports::Progress;
use indicatif::{ProgressBar, ProgressStyle};

static SPINNER: OnceLock<ProgressBar> = OnceLock::new();
static REQUESTS: AtomicU64 = AtomicU64::new(0);

pub fn get_spinner() -> &'static ProgressBar {
    SPINNER.get_or_init(init_spinner)
}

fn init_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(&[
            "▁▁▁▁▁",
            "▁▂▂▂▁",
            "▁▄▂▄▁",
            "▂▄▆▄▂",
            "▄▆█▆▄",
            "▂▄▆▄▂",
            "▁▄▂▄▁",
            "▁▂▂▂▁",
        ]));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn finish() {
    get_spinner().finish_and_clear();
}

pub fn requests_sent() -> u64 {
    REQUESTS.load(Ordering::Relaxed)
}

/// Shows the number of attempted requests on the spinner.
pub struct RequestSpinner;

impl Progress for RequestSpinner {
    fn increment_requests(&self) {
        let sent = REQUESTS.fetch_add(1, Ordering::Relaxed) + 1;
        get_spinner().set_message(format!(
            "{} requests sent so far...",
            sent.to_string().green().bold()
        ));
    }
}

/// Routes log lines above the spinner so they don't tear it.
pub struct SpinnerWriter;

impl std::io::Write for SpinnerWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let msg = String::from_utf8_lossy(buf);
        get_spinner().println(msg.trim_end());
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
