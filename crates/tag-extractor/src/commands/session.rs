//! Session command: drive an extraction session from line commands.
//!
//! Each input line is one command:
//!
//! ```text
//! stop <FILE>    load stop words (re-processes the current document)
//! load <FILE>    load a text document and show its tags
//! save <FILE>    save the current tags as `word: count` lines
//! show           show the current tags again
//! state          show the session state
//! help           list commands
//! quit           end the session
//! ```
//!
//! Errors are reported and the session carries on.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use tag_extractor_core::{
    ExtractionSession, ProcessStats, Processing, SessionState, TagReport, TagResult,
};

use super::SessionSettings;

const STOP_WORDS_FIRST: &str = "Got it! Choose stop words file to continue.";

const HELP: &str = "\
Commands:
  stop <FILE>   Load stop words file
  load <FILE>   Load text file
  save <FILE>   Save tags to file
  show          Show current tags
  state         Show session state
  help          Show this help
  quit          End the session";

/// Arguments for the `session` subcommand.
#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Stop-words file to load before reading commands
    /// (defaults to `stop_words` from config).
    #[arg(short, long, value_name = "FILE")]
    pub stop_words: Option<Utf8PathBuf>,
}

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum Action<'a> {
    StopWords(&'a Utf8Path),
    Load(&'a Utf8Path),
    Save(&'a Utf8Path),
    Show,
    State,
    Help,
    Quit,
    Nothing,
    MissingPath(&'a str),
    Unknown(&'a str),
}

impl<'a> Action<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(v, r)| (v, r.trim()));
        let with_path = |make: fn(&'a Utf8Path) -> Self| {
            if rest.is_empty() {
                Self::MissingPath(verb)
            } else {
                make(Utf8Path::new(rest))
            }
        };
        match verb.to_ascii_lowercase().as_str() {
            "" => Self::Nothing,
            "stop" | "stop-words" => with_path(Self::StopWords),
            "load" | "open" => with_path(Self::Load),
            "save" => with_path(Self::Save),
            "show" => Self::Show,
            "state" => Self::State,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(verb),
        }
    }
}

/// Something the session tells the user.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum Event<'a> {
    StopWordsLoaded { count: usize },
    StopWordsRequired { message: &'static str },
    Processed {
        #[serde(flatten)]
        stats: ProcessStats,
        report: TagReport<'a>,
    },
    Saved { path: &'a Utf8Path, lines: usize },
    State {
        state: SessionState,
        #[serde(skip_serializing_if = "Option::is_none")]
        document: Option<&'a Utf8Path>,
        stop_words: usize,
    },
    Error { message: String },
    Help { message: &'static str },
}

/// Read commands from stdin and run them against a fresh session.
#[instrument(name = "cmd_session", skip_all)]
pub fn cmd_session(
    args: SessionArgs,
    global_json: bool,
    settings: &SessionSettings,
) -> anyhow::Result<()> {
    debug!(stop_words = ?args.stop_words, "executing session command");

    let mut session = settings.new_session();
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut out = io::stdout().lock();

    let mut shell = Shell {
        session: &mut session,
        out: &mut out,
        json: global_json,
    };
    if let Some(path) = settings.stop_words(args.stop_words.as_deref()) {
        shell.dispatch(Action::StopWords(path))?;
    }
    shell
        .run(stdin.lock(), interactive)
        .context("session input/output failed")
}

/// Runs parsed commands against a session and reports the results.
struct Shell<'s, W: Write> {
    session: &'s mut ExtractionSession,
    out: W,
    json: bool,
}

impl<W: Write> Shell<'_, W> {
    fn run<R: BufRead>(&mut self, input: R, prompt: bool) -> io::Result<()> {
        if prompt && !self.json {
            writeln!(self.out, "{HELP}")?;
        }
        let mut lines = input.lines();
        loop {
            if prompt && !self.json {
                write!(self.out, "> ")?;
                self.out.flush()?;
            }
            let Some(line) = lines.next() else { break };
            let line = line?;
            if !self.dispatch(Action::parse(&line))? {
                break;
            }
        }
        Ok(())
    }

    /// Run one action. Returns `false` when the session should end.
    fn dispatch(&mut self, action: Action<'_>) -> io::Result<bool> {
        debug!(?action, "session command");
        match action {
            Action::StopWords(path) => {
                let result = self.session.load_stop_words(path);
                // A failed load empties the set, so a non-empty set after an
                // error means only the re-processing step failed.
                let count = self.session.stop_words().len();
                if result.is_ok() || count > 0 {
                    self.emit(&Event::StopWordsLoaded { count })?;
                }
                self.report_processing(result)?;
            }
            Action::Load(path) => {
                let result = self.session.load_document(path);
                self.report_processing(result)?;
            }
            Action::Save(path) => match self.session.save(path) {
                Ok(lines) => self.emit(&Event::Saved { path, lines })?,
                Err(err) => self.error(&err)?,
            },
            Action::Show => self.show()?,
            Action::State => {
                let event = Event::State {
                    state: self.session.state(),
                    document: self.session.document(),
                    stop_words: self.session.stop_words().len(),
                };
                emit_to(&mut self.out, self.json, &event)?;
            }
            Action::Help => self.emit(&Event::Help { message: HELP })?,
            Action::Quit => return Ok(false),
            Action::Nothing => {}
            Action::MissingPath(verb) => self.emit(&Event::Error {
                message: format!("`{verb}` needs a file path"),
            })?,
            Action::Unknown(verb) => self.emit(&Event::Error {
                message: format!("unknown command `{verb}`; type `help` for commands"),
            })?,
        }
        Ok(true)
    }

    fn report_processing(&mut self, result: TagResult<Processing>) -> io::Result<()> {
        match result {
            Ok(Processing::Processed(stats)) => {
                if let Some(report) = self.session.report() {
                    let event = Event::Processed { stats, report };
                    emit_to(&mut self.out, self.json, &event)?;
                }
                Ok(())
            }
            Ok(Processing::StopWordsRequired) => self.emit(&Event::StopWordsRequired {
                message: STOP_WORDS_FIRST,
            }),
            Ok(Processing::NoDocument) => Ok(()),
            Err(err) => self.error(&err),
        }
    }

    fn show(&mut self) -> io::Result<()> {
        match self.session.report() {
            Some(report) => {
                let stats = ProcessStats {
                    distinct: report.distinct_words,
                    total: report.total_words,
                };
                emit_to(&mut self.out, self.json, &Event::Processed { stats, report })
            }
            None => emit_to(
                &mut self.out,
                self.json,
                &Event::Error {
                    message: "no tags yet; load a text file first".to_string(),
                },
            ),
        }
    }

    fn error(&mut self, err: &dyn std::error::Error) -> io::Result<()> {
        warn!(error = %err, "session command failed");
        self.emit(&Event::Error {
            message: err.to_string(),
        })
    }

    fn emit(&mut self, event: &Event<'_>) -> io::Result<()> {
        emit_to(&mut self.out, self.json, event)
    }
}

/// Write one event as a JSON line or as human-readable text.
fn emit_to<W: Write>(out: &mut W, json: bool, event: &Event<'_>) -> io::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, event)?;
        return writeln!(out);
    }
    match event {
        Event::StopWordsLoaded { count } => writeln!(out, "Loaded {count} stop words."),
        Event::StopWordsRequired { message } => writeln!(out, "{message}"),
        Event::Processed { report, .. } => {
            write!(
                out,
                "{}",
                tag_extractor_core::report::format_for_display(report.title, report.tags)
            )
        }
        Event::Saved { path, lines } => writeln!(
            out,
            "{} saved {lines} tags to {path}",
            "Done!".if_supports_color(Stream::Stdout, |t| t.green())
        ),
        Event::State {
            state,
            document,
            stop_words,
        } => {
            writeln!(out, "state: {state}")?;
            writeln!(out, "stop words: {stop_words}")?;
            match document {
                Some(doc) => writeln!(out, "document: {doc}"),
                None => writeln!(out, "document: (none)"),
            }
        }
        Event::Error { message } => writeln!(
            out,
            "{} {message}",
            "Error!".if_supports_color(Stream::Stdout, |t| t.red())
        ),
        Event::Help { message } => writeln!(out, "{message}"),
    }
}
