pub mod icons;
pub mod output;
pub mod progress;
pub mod progress_message;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    chunk, dependency, dim, error, header, info, json, muted, score, section, skipped, status, success,
    summary_row, timing, warn,
};
pub use progress::{ProgressManager, Spinner};
pub use progress_message::{ProgressMessage, ProgressPhase};
pub use table::{repositories_table, stats_table, TableBuilder};
pub use theme::{theme, Theme};
