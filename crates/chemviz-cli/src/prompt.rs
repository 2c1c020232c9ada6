//! Interactive credential prompts.

use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::{Result, bail};
use rustyline::completion::Completer;
use rustyline::config::Configurer;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Editor, Helper};

/// Echoes `*` for every character while `masking` is set.
struct MaskingHelper {
    masking: bool,
}

impl Helper for MaskingHelper {}

impl Completer for MaskingHelper {
    type Candidate = String;
}

impl Hinter for MaskingHelper {
    type Hint = String;
}

impl Validator for MaskingHelper {}

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            Owned("*".repeat(line.chars().count()))
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.masking
    }
}

/// Username and password given on the command line or prompted for.
pub fn credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String)> {
    let mut editor: Editor<MaskingHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(MaskingHelper { masking: false }));
    editor.set_auto_add_history(false);

    let username = match username {
        Some(username) => username,
        None => editor.readline("Username: ")?.trim().to_string(),
    };
    if username.is_empty() {
        bail!("a username is required");
    }

    let password = match password {
        Some(password) => password,
        None => {
            if let Some(helper) = editor.helper_mut() {
                helper.masking = true;
            }
            editor.readline("Password: ")?
        }
    };

    Ok((username, password))
}
