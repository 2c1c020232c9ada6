//! Interactive shell driving one long-lived session.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::Path;

use anyhow::Result;
use chemviz_application::SessionController;
use chemviz_core::config::ClientConfig;
use chemviz_core::dataset::DatasetId;
use chemviz_core::session::ClientState;
use chemviz_infrastructure::read_upload_file;
use colored::Colorize;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::commands::{self, LoginArgs};
use crate::render;

/// Name, argument usage and description of every shell command.
const COMMANDS: [(&str, &str, &str); 13] = [
    ("/history", "", "refresh and list uploaded datasets"),
    ("/select", "<id>", "load a dataset's summary"),
    ("/summary", "", "show the loaded summary again"),
    ("/charts", "", "show chart projections of the loaded summary"),
    ("/file", "<path>", "choose a file to upload"),
    ("/upload", "[path]", "upload the chosen file"),
    ("/report", "[id]", "download the PDF report (default: selection)"),
    ("/delete", "<id>", "delete a dataset"),
    ("/status", "", "show session state"),
    ("/login", "", "log in again"),
    ("/logout", "", "end the session"),
    ("/help", "", "show this help"),
    ("/quit", "", "leave the shell"),
];

fn usage(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|(command, _, _)| *command == name)
        .map(|(_, usage, _)| *usage)
}

/// Completes command names and, after `/file` or `/upload`, file paths.
/// Hints show the remaining command name followed by its arguments.
struct ShellHelper {
    files: FilenameCompleter,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let typed = &line[..pos];
        match typed.split_once(' ') {
            None if typed.starts_with('/') => {
                let candidates = COMMANDS
                    .iter()
                    .filter(|(name, _, _)| name.starts_with(typed))
                    .map(|(name, usage, _)| Pair {
                        display: format!("{} {}", name, usage).trim_end().to_string(),
                        replacement: if usage.is_empty() {
                            name.to_string()
                        } else {
                            format!("{} ", name)
                        },
                    })
                    .collect();
                Ok((0, candidates))
            }
            Some(("/file" | "/upload", _)) => self.files.complete(line, pos, ctx),
            _ => Ok((0, Vec::new())),
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if pos < line.len() || !line.starts_with('/') {
            return None;
        }

        match line.split_once(' ') {
            // "/sel" -> "ect <id>"
            None => COMMANDS
                .iter()
                .find(|(name, _, _)| name.starts_with(line))
                .map(|(name, usage, _)| {
                    let rest = &name[line.len()..];
                    if usage.is_empty() {
                        rest.to_string()
                    } else {
                        format!("{} {}", rest, usage)
                    }
                })
                .filter(|hint| !hint.is_empty()),
            // "/select " -> "<id>"
            Some((name, "")) => usage(name).filter(|u| !u.is_empty()).map(str::to_string),
            Some(_) => None,
        }
    }
}

impl Highlighter for ShellHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        if usage(name).is_some() {
            let mut out = name.bright_cyan().to_string();
            if line.len() > name.len() {
                out.push(' ');
                out.push_str(rest);
            }
            Owned(out)
        } else if line.starts_with('/') {
            Owned(line.yellow().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Validator for ShellHelper {}

enum Flow {
    Continue,
    Quit,
}

/// Runs the shell until `/quit` or end of input.
pub async fn run(config: &ClientConfig, args: LoginArgs) -> Result<()> {
    let controller = commands::build_controller(config, config.session.clone(), None);

    let mut rl: Editor<ShellHelper, rustyline::history::DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ShellHelper::new()));

    println!("{}", "=== Chemviz Shell ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Connected to {}", config.api.base_url).bright_black()
    );

    match commands::login(&controller, args).await {
        Ok(()) => show_after_login(&controller).await,
        Err(e) => println!("{}", format!("{:#}", e).red()),
    }
    println!(
        "{}",
        "Type '/help' for commands or '/quit' to exit.".bright_black()
    );
    println!();

    loop {
        let prompt = match controller.selection().await {
            Some(id) => format!("chemviz[{}]> ", id),
            None => "chemviz> ".to_string(),
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match dispatch(&controller, config, trimmed).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => println!("{}", format!("{:#}", e).red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "(use /quit to exit)".bright_black());
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    controller.logout().await;
    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

async fn dispatch(
    controller: &SessionController,
    config: &ClientConfig,
    line: &str,
) -> Result<Flow> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next();

    match command {
        "/quit" | "/exit" | "quit" | "exit" => return Ok(Flow::Quit),
        "/help" => print_help(),
        "/history" => {
            if controller.refresh_history().await.is_ok() {
                print_history(controller).await;
            } else {
                print_status(controller).await;
            }
        }
        "/select" => {
            let id = parse_id(argument)?;
            match controller.fetch_summary(id).await {
                Ok(_) => print_summary(controller).await,
                Err(_) => print_status(controller).await,
            }
        }
        "/summary" => print_summary(controller).await,
        "/charts" => match controller.chart_projections().await {
            Some(projections) => println!("{}", render::charts(&projections)),
            None => println!("{}", "No summary loaded. Use /select <id>.".yellow()),
        },
        "/file" => {
            let Some(path) = argument else {
                println!("{}", "Usage: /file <path>".yellow());
                return Ok(Flow::Continue);
            };
            choose_file(controller, config, Path::new(path)).await;
        }
        "/upload" => {
            if let Some(path) = argument {
                if !choose_file(controller, config, Path::new(path)).await {
                    return Ok(Flow::Continue);
                }
            }
            if let Some(notice) = upload_notice(&controller.snapshot().await) {
                println!("{}", notice.bright_black());
            }
            let uploaded = controller.upload().await.is_ok();
            print_status(controller).await;
            if uploaded {
                print_history(controller).await;
                print_summary(controller).await;
            }
        }
        "/report" => {
            let id = match argument {
                Some(arg) => parse_id(Some(arg))?,
                None => match controller.selection().await {
                    Some(id) => id,
                    None => {
                        println!("{}", "Select a dataset first or pass an id.".yellow());
                        return Ok(Flow::Continue);
                    }
                },
            };
            match controller.download_report(id).await {
                Ok(path) => {
                    print_status(controller).await;
                    println!("{}", path.display().to_string().bright_black());
                }
                Err(_) => print_status(controller).await,
            }
        }
        "/delete" => {
            let id = parse_id(argument)?;
            let deleted = controller.delete_entry(id).await.is_ok();
            print_status(controller).await;
            if deleted {
                print_history(controller).await;
            }
        }
        "/status" => print_session(controller).await,
        "/login" => {
            controller.logout().await;
            match commands::login(controller, LoginArgs::default()).await {
                Ok(()) => show_after_login(controller).await,
                Err(e) => println!("{}", format!("{:#}", e).red()),
            }
        }
        "/logout" => {
            controller.logout().await;
            println!("{}", "Logged out.".bright_black());
        }
        other => println!(
            "{}",
            format!("Unknown command '{}'. Type /help.", other).bright_black()
        ),
    }

    Ok(Flow::Continue)
}

/// Progress line for `/upload`; nothing when no usable file is staged.
fn upload_notice(state: &ClientState) -> Option<&'static str> {
    state
        .pending_file
        .as_ref()
        .filter(|file| !file.is_empty())
        .map(|_| chemviz_application::messages::UPLOADING)
}

fn parse_id(argument: Option<&str>) -> Result<DatasetId> {
    let Some(argument) = argument else {
        anyhow::bail!("a dataset id is required");
    };
    argument
        .parse::<DatasetId>()
        .map_err(|_| anyhow::anyhow!("'{}' is not a dataset id", argument))
}

/// Reads and stages a file; false if it was rejected.
async fn choose_file(controller: &SessionController, config: &ClientConfig, path: &Path) -> bool {
    match read_upload_file(path, &config.upload.allowed_extensions).await {
        Ok(file) => {
            controller.select_file(file).await;
            print_status(controller).await;
            true
        }
        Err(e) => {
            println!("{}", e.to_string().red());
            false
        }
    }
}

async fn show_after_login(controller: &SessionController) {
    println!("{}", chemviz_application::messages::LOGIN_SUCCESS.green());
    print_history(controller).await;
    if controller.summary().await.is_some() {
        print_summary(controller).await;
    }
}

async fn print_status(controller: &SessionController) {
    if let Some(status) = controller.status().await {
        println!("{}", render::status_line(&status));
    }
}

async fn print_history(controller: &SessionController) {
    let state = controller.snapshot().await;
    println!("{}", render::history_table(&state.history, state.selection));
}

async fn print_summary(controller: &SessionController) {
    let state = controller.snapshot().await;
    match (state.selection, &state.summary) {
        (Some(id), Some(summary)) => {
            println!();
            println!("{}", render::summary_report(id, summary));
        }
        _ => println!("{}", "No summary loaded. Use /select <id>.".yellow()),
    }
}

async fn print_session(controller: &SessionController) {
    let state = controller.snapshot().await;
    println!("State:     {}", state.phase().to_string().bold());
    if let Some(session) = &state.session {
        println!("User:      {}", session.credentials.username);
        println!(
            "Since:     {}",
            session.authenticated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    println!(
        "Selection: {}",
        state
            .selection
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "File:      {}",
        state
            .pending_file
            .as_ref()
            .map(|f| f.file_name.clone())
            .unwrap_or_else(|| "-".to_string())
    );
    if let Some(status) = &state.status {
        println!("Status:    {}", render::status_line(status));
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    for (name, usage, description) in COMMANDS {
        println!(
            "  {} {:<7} {}",
            format!("{:<9}", name).bright_cyan(),
            usage,
            description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chemviz_core::dataset::UploadFile;
    use rustyline::history::DefaultHistory;

    fn hint(line: &str) -> Option<String> {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        ShellHelper::new().hint(line, line.len(), &ctx)
    }

    #[test]
    fn test_hint_completes_name_and_shows_arguments() {
        assert_eq!(hint("/sel").as_deref(), Some("ect <id>"));
        assert_eq!(hint("/select").as_deref(), Some(" <id>"));
        assert_eq!(hint("/select ").as_deref(), Some("<id>"));
        assert_eq!(hint("/his").as_deref(), Some("tory"));
        assert_eq!(hint("/history"), None);
        assert_eq!(hint("/select 3"), None);
        assert_eq!(hint("hello"), None);
    }

    #[test]
    fn test_upload_notice_needs_a_staged_file() {
        let mut state = ClientState::new();
        assert_eq!(upload_notice(&state), None);

        state.pending_file = Some(UploadFile::new("empty.csv", "text/csv", Vec::new()));
        assert_eq!(upload_notice(&state), None);

        state.pending_file = Some(UploadFile::new("batch1.csv", "text/csv", b"a,b".to_vec()));
        assert_eq!(
            upload_notice(&state),
            Some(chemviz_application::messages::UPLOADING)
        );
    }

    #[test]
    fn test_completion_adds_space_before_arguments() {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        let (start, candidates) = ShellHelper::new().complete("/de", 3, &ctx).unwrap();

        assert_eq!(start, 0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].replacement, "/delete ");
        assert_eq!(candidates[0].display, "/delete <id>");
    }
}
