#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProgressPhase {
    Listing,
    Processing,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProgressMessage {
    Started {
        phase: ProgressPhase,
        total: usize,
    },
    Progress {
        phase: ProgressPhase,
        current: usize,
        file: Option<String>,
    },
    Finished {
        phase: ProgressPhase,
    },
    Skipped {
        file: String,
        reason: String,
    },
}
