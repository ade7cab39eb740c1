use console::{measure_text_width, Term};
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether `debug!` lines are shown
static VERBOSE: AtomicBool = AtomicBool::new(false);

const PREFIX_LEN: usize = 10;

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Right-align `prefix` in the message column
pub fn gen_prefix(prefix: &str) -> String {
    let padding = PREFIX_LEN.saturating_sub(measure_text_width(prefix));
    format!("{}{} ", " ".repeat(padding), prefix)
}

/// Writes prefixed status lines to stderr, leaving stdout for reports
pub struct Writer {
    term: Term,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            term: Term::stderr(),
        }
    }

    pub fn writeln(&self, prefix: &str, msg: &str) -> std::io::Result<()> {
        self.term.write_line(&format!("{}{}", gen_prefix(prefix), msg))
    }
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        if $crate::cli::verbose() {
            $crate::WRITER
                .writeln(&console::style("DEBUG").dim().to_string(), &format!($($arg)+))
                .ok();
        }
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(&console::style("INFO").blue().bold().to_string(), &format!($($arg)+))
            .ok();
    };
}

#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(&console::style("SUCCESS").green().bold().to_string(), &format!($($arg)+))
            .ok();
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(&console::style("WARNING").yellow().bold().to_string(), &format!($($arg)+))
            .ok();
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(&console::style("ERROR").red().bold().to_string(), &format!($($arg)+))
            .ok();
    };
}

#[macro_export]
macro_rules! due_to {
    ($($arg:tt)+) => {
        $crate::WRITER
            .writeln(&console::style("DUE TO").yellow().bold().to_string(), &format!($($arg)+))
            .ok();
    };
}
