use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::ui::theme;
use crate::ui::Icons;
use indicatif::{HumanDuration, MultiProgress, ProgressBar};
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Progress bars for an ingestion run, fed from the pipeline's channel
pub struct ProgressManager {
    mp: MultiProgress,
    skipped: Arc<AtomicUsize>,
    handle: thread::JoinHandle<()>,
}

impl ProgressManager {
    pub fn new() -> (Self, crossbeam::channel::Sender<ProgressMessage>) {
        let (tx, rx) = crossbeam::channel::unbounded::<ProgressMessage>();
        let is_term = console::Term::stdout().is_term();

        let mp = MultiProgress::new();

        let listing = mp.add(ProgressBar::new_spinner().with_message("Listing repository files"));
        let listing = if is_term { listing } else { ProgressBar::hidden() };

        let processing = mp.add(ProgressBar::new(0).with_message("Processing files"));
        let processing = if is_term { processing } else { ProgressBar::hidden() };

        let skipped = Arc::new(AtomicUsize::new(0));
        let skipped_clone = skipped.clone();

        let handle = thread::spawn(move || {
            for msg in rx {
                match msg {
                    ProgressMessage::Started {
                        phase: ProgressPhase::Listing,
                        total: _,
                    } => {
                        listing.enable_steady_tick(Duration::from_millis(100));
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Listing,
                    } => {
                        listing.finish_with_message("Listed");
                    }
                    ProgressMessage::Started {
                        phase: ProgressPhase::Processing,
                        total,
                    } => {
                        processing.set_length(total as u64);
                    }
                    ProgressMessage::Progress {
                        phase: ProgressPhase::Processing,
                        current,
                        file,
                    } => {
                        processing.set_position(current.saturating_sub(1) as u64);
                        if let Some(ref f) = file {
                            processing.set_message(format!("Processing: {}", f));
                        }
                    }
                    ProgressMessage::Finished {
                        phase: ProgressPhase::Processing,
                    } => {
                        processing.finish_with_message("Done");
                    }
                    ProgressMessage::Skipped { .. } => {
                        skipped_clone.fetch_add(1, Ordering::Relaxed);
                    }
                    _ => {}
                }
            }
        });

        (Self { mp, skipped, handle }, tx)
    }

    pub fn clear(&self) {
        self.mp.clear().ok();
    }

    /// Wait for the channel to close, then print the run summary
    pub fn finish_with_summary(self, duration: Duration, files: usize, chunks: usize, edges: usize) {
        self.handle.join().ok();
        self.mp.clear().ok();
        println!();
        println!(
            "{} {}",
            Icons::CHECK.style(theme().success.clone()),
            format!("Complete in {}", HumanDuration(duration)).style(theme().success.clone())
        );
        println!(
            "  {} {}  {} {}  {} {}  {} {}",
            Icons::FILE.style(theme().info.clone()),
            files,
            Icons::PACKAGE.style(theme().info.clone()),
            chunks,
            Icons::LINK.style(theme().info.clone()),
            edges,
            Icons::SKIP.style(theme().warn.clone()),
            self.skipped.load(Ordering::Relaxed)
        );
    }
}

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn new(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_message(message.to_string());
        if console::Term::stdout().is_term() {
            pb.enable_steady_tick(Duration::from_millis(100));
        } else {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }
        Self { pb }
    }

    pub fn finish_and_clear(&self) {
        self.pb.finish_and_clear();
    }
}
