//! Interactive shell: line editing, history and per-argument completion

use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::{debug, warn};

use crate::application::services::ContentService;
use crate::cli::args::ShellLine;
use crate::cli::commands::run_clm;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::domain::{completion_request, split_line};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

const PROMPT: &str = "clmsh> ";

/// Whether the shell keeps reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Quit,
}

/// Tab completion backed by live lookups on the session.
pub struct ShellHelper {
    content: ContentService,
}

impl ShellHelper {
    pub fn new(content: ContentService) -> Self {
        Self { content }
    }
}

impl Completer for ShellHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let Some(head) = line.get(..pos) else {
            return Ok((pos, Vec::new()));
        };
        match completion_request(head) {
            Some(req) => Ok((req.start, self.content.complete(&req))),
            None => Ok((pos, Vec::new())),
        }
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

fn shell_err(e: ReadlineError) -> CliError {
    InfraError::Shell {
        message: e.to_string(),
    }
    .into()
}

/// Read and run lines until `quit`, `exit` or end of input.
pub fn run(services: &ServiceContainer) -> CliResult<()> {
    let mut rl = Editor::<ShellHelper, DefaultHistory>::new().map_err(shell_err)?;
    rl.set_helper(Some(ShellHelper::new(services.content())));

    let history = services.settings.history_file.clone();
    if history.exists() {
        if let Err(e) = rl.load_history(&history) {
            warn!("cannot load history {}: {}", history.display(), e);
        }
    }

    println!(
        "{}",
        output::header_text("clmsh: type 'help' for commands, 'quit' to exit")
    );

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let stdout = io::stdout();
                match execute_line(line, services, &mut stdout.lock()) {
                    Ok(ShellFlow::Quit) => break,
                    Ok(ShellFlow::Continue) => {}
                    Err(e) => output::error(&e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(shell_err(e)),
        }
    }

    if let Some(parent) = history.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = rl.save_history(&history) {
        output::warning(&format!("cannot save history {}: {}", history.display(), e));
    }
    Ok(())
}

/// Run one shell line. Parse errors and help are written to `out`.
pub fn execute_line(
    line: &str,
    services: &ServiceContainer,
    out: &mut dyn Write,
) -> CliResult<ShellFlow> {
    let words = split_line(line)?;
    debug!("shell words: {:?}", words);

    match words.first().map(String::as_str) {
        None => Ok(ShellFlow::Continue),
        Some("quit" | "exit") => Ok(ShellFlow::Quit),
        Some("help") => {
            let text = help_text(words.get(1).map(String::as_str))?;
            write!(out, "{text}").map_err(|e| InfraError::io("write output", e))?;
            Ok(ShellFlow::Continue)
        }
        Some(_) => {
            match ShellLine::try_parse_from(&words) {
                Ok(parsed) => run_clm(&parsed.command, services, services.settings.quiet, out)?,
                Err(parse_err) => write!(out, "{}", parse_err.render())
                    .map_err(|e| InfraError::io("write output", e))?,
            }
            Ok(ShellFlow::Continue)
        }
    }
}

fn help_text(command: Option<&str>) -> CliResult<String> {
    let mut cmd = ShellLine::command();
    match command {
        None => Ok(cmd.render_help().to_string()),
        Some(name) => cmd
            .find_subcommand_mut(name)
            .map(|sub| sub.render_help().to_string())
            .ok_or_else(|| CliError::Usage(format!("unknown command: {name}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_no_command_when_help_then_lists_commands() {
        let text = help_text(None).unwrap();
        assert!(text.contains("clm_projectstagingfull"));
        assert!(text.contains("clm_envdiff"));
    }

    #[test]
    fn given_command_when_help_then_shows_its_usage() {
        let text = help_text(Some("clm_projectpromote")).unwrap();
        assert!(text.contains("<PROJECT>"));
        assert!(text.contains("<ENVIRONMENT>"));
    }

    #[test]
    fn given_unknown_command_when_help_then_usage_error() {
        assert!(matches!(
            help_text(Some("clm_nope")),
            Err(CliError::Usage(_))
        ));
    }
}
