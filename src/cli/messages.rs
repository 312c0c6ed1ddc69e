//! General message formatting functions for prettifying the CLI.
//!
//! - Highlight Text (make the text sqldb teal but not bold)
//! - System message formatting functions that produce the same
//! format messages.

use colored::Colorize;

use crate::cli::colors::SQLDB_TEAL;

pub fn highlight_argument(argument: &str) -> String {
    //! Highlight a piece of text in the theme color to make it obvious.

    format!("{}", argument.color(SQLDB_TEAL))
}

pub fn system_message(source_name: &str, message: String) -> String {
    //! Format a message the way every line of CLI output is formatted.
    //!
    //! Takes in a source name (like 'append') and the message as a formatted
    //! text; output of [`format!`].

    let source_formatted = format!("{:6}", source_name.color(SQLDB_TEAL).bold());

    format!("[{}] {}", source_formatted, message)
}
