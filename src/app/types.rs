use crate::host_list::HostList;
use crate::models::HostRecord;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Where the run is in `Listing -> Connecting -> Done | Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Listing,
    Connecting,
    Failed(String),
}

/// What the UI hands back to the caller once it quits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Quit,
    Connect(HostRecord),
    Failed(String),
}

#[derive(Debug)]
pub struct App {
    pub should_quit: bool,
    pub list: HostList,
    pub phase: Phase,
    pub input_mode: InputMode,
    pub selected_host: Option<HostRecord>,

    pub status_message: Option<(String, Instant)>,

    // Terminal size
    pub width: u16,
    pub height: u16,

    /// Program checked on PATH before leaving the UI.
    pub program: String,
}
