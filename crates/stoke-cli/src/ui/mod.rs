//! Terminal output: status lines for commands and the console rendering of
//! compile cycles.

mod messages;
mod reporter;

pub use messages::{error, info, success, warning};
pub use reporter::ConsoleReporter;

/// Whether colors should be used on stderr.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise a terminal on stderr decides.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr()
}

/// Whether someone is watching stdout. Gates screen clearing and the URL banner.
pub fn is_interactive() -> bool {
    console::user_attended()
}
