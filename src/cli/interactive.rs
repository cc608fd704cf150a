//! Line-oriented command loop driving a session from stdin.

use super::output::{print_text_diagnostics, ReportingSink};
use super::workspace::Workspace;
use crate::host::DocumentId;
use anyhow::Result;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Open(PathBuf),
    Edit(PathBuf),
    Save(PathBuf),
    Close(PathBuf),
    Enable,
    Disable,
    Toggle,
    Refresh(Option<PathBuf>),
    Show(Option<PathBuf>),
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  open <file>       open a document and check it
  edit <file>       reload a changed document
  save <file>       reload a saved document
  close <file>      close a document and drop its diagnostics
  enable | disable | toggle
  refresh [file]    re-check a document (default: the current one)
  show [file]       print the current diagnostics
  quit";

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or("");
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(PathBuf::from);

        let required = |arg: Option<PathBuf>| arg.ok_or_else(|| format!("`{}` needs a file", name));

        match name {
            "open" => Ok(SessionCommand::Open(required(arg)?)),
            "edit" => Ok(SessionCommand::Edit(required(arg)?)),
            "save" => Ok(SessionCommand::Save(required(arg)?)),
            "close" => Ok(SessionCommand::Close(required(arg)?)),
            "enable" => Ok(SessionCommand::Enable),
            "disable" => Ok(SessionCommand::Disable),
            "toggle" => Ok(SessionCommand::Toggle),
            "refresh" => Ok(SessionCommand::Refresh(arg)),
            "show" => Ok(SessionCommand::Show(arg)),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            other => Err(format!("Unknown command: {}", other)),
        }
    }
}

/// Read commands until `quit` or end of input.
pub async fn run(workspace: &Workspace, sink: &ReportingSink, colored: bool) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        if command == SessionCommand::Quit {
            break;
        }
        if let Err(e) = execute(workspace, sink, command, colored) {
            eprintln!("Error: {:#}", e);
        }
    }

    Ok(())
}

fn execute(
    workspace: &Workspace,
    sink: &ReportingSink,
    command: SessionCommand,
    colored: bool,
) -> Result<()> {
    let session = &workspace.session;
    match command {
        SessionCommand::Open(path) => {
            workspace.open(&path)?;
        }
        SessionCommand::Edit(path) => {
            workspace.edit(&path)?;
        }
        SessionCommand::Save(path) => {
            workspace.save(&path)?;
        }
        SessionCommand::Close(path) => {
            workspace.close(&path);
        }
        SessionCommand::Enable => session.enable(),
        SessionCommand::Disable => session.disable(),
        SessionCommand::Toggle => {
            let enabled = session.toggle();
            println!("spell checking {}", if enabled { "enabled" } else { "disabled" });
        }
        SessionCommand::Refresh(path) => {
            let doc = path.as_deref().map(DocumentId::from_path);
            session.refresh(doc.as_ref());
        }
        SessionCommand::Show(path) => {
            let doc = path
                .as_deref()
                .map(DocumentId::from_path)
                .or_else(|| session.current_document());
            match doc {
                Some(doc) => {
                    let diagnostics = sink.store().get(&doc, crate::SOURCE);
                    println!("{}: {} spelling diagnostics", doc, diagnostics.len());
                    print_text_diagnostics(&doc, &diagnostics, colored);
                }
                None => eprintln!("No current document"),
            }
        }
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit => {}
    }
    Ok(())
}
