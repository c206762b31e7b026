//! Confirmation gate for destructive commands.
//!
//! A destructive command issues exactly one request per confirmed action and
//! none at all when declined; the prompt happens strictly before any network
//! call.

use std::io::{self, BufRead, Write};

use crate::error::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationRequest {
    pub action: String,
    pub target: String,
    pub destructive: bool,
}

impl ConfirmationRequest {
    #[must_use]
    pub fn new(action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
            destructive: false,
        }
    }

    /// Irreversible action; the prompt carries an extra warning line.
    #[must_use]
    pub fn destructive(action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            destructive: true,
            ..Self::new(action, target)
        }
    }

    #[must_use]
    pub fn prompt(&self) -> String {
        if self.destructive {
            format!(
                "This cannot be undone.\n{} {}? [y/N] ",
                self.action, self.target
            )
        } else {
            format!("{} {}? [y/N] ", self.action, self.target)
        }
    }
}

/// Ask on stderr and read the answer from stdin. `assume_yes` (the `--yes`
/// flag) bypasses the prompt entirely.
pub fn confirm(request: &ConfirmationRequest, assume_yes: bool) -> Result<bool, CliError> {
    if assume_yes {
        return Ok(true);
    }
    confirm_from_reader(request, &mut io::stdin().lock(), &mut io::stderr())
}

/// Prompt against explicit reader/writer handles.
///
/// Public for testability; anything but an explicit yes declines.
pub fn confirm_from_reader<R: BufRead, W: Write>(
    request: &ConfirmationRequest,
    reader: &mut R,
    writer: &mut W,
) -> Result<bool, CliError> {
    write!(writer, "{}", request.prompt())?;
    writer.flush()?;

    let mut answer = String::new();
    reader.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;

    use super::*;

    fn ask(input: &str) -> (bool, String) {
        let request = ConfirmationRequest::new("Delete", "indicator 0198ab12");
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut written = Vec::new();
        let confirmed = confirm_from_reader(&request, &mut reader, &mut written).unwrap();
        (confirmed, String::from_utf8(written).unwrap())
    }

    #[test]
    fn yes_answers_confirm() {
        assert!(ask("y\n").0);
        assert!(ask("YES\n").0);
        assert!(ask("  yes  \n").0);
    }

    #[test]
    fn anything_else_declines() {
        assert!(!ask("n\n").0);
        assert!(!ask("\n").0);
        assert!(!ask("yep\n").0);
        assert!(!ask("").0);
    }

    #[test]
    fn prompt_names_action_and_target() {
        let (_, prompt) = ask("n\n");
        assert_eq!(prompt, "Delete indicator 0198ab12? [y/N] ");
    }

    #[test]
    fn destructive_prompt_adds_warning_line() {
        let request = ConfirmationRequest::destructive("Permanently delete", "2 indicators");
        assert_eq!(
            request.prompt(),
            "This cannot be undone.\nPermanently delete 2 indicators? [y/N] "
        );
    }

    #[test]
    fn assume_yes_skips_the_prompt() {
        let request = ConfirmationRequest::new("Delete", "everything");
        assert!(confirm(&request, true).unwrap());
    }
}
