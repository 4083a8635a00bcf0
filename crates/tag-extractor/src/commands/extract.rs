//! Extract command: one-shot tag extraction from a file.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, instrument};

use tag_extractor_core::Processing;

use super::SessionSettings;

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Text file to extract tags from.
    pub file: Utf8PathBuf,

    /// Stop-words file, one word per line (defaults to `stop_words` from config).
    #[arg(short, long, value_name = "FILE")]
    pub stop_words: Option<Utf8PathBuf>,

    /// Also save the tags to FILE as `word: count` lines.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

/// Load stop words, extract tags from a file, print them, and optionally save.
#[instrument(name = "cmd_extract", skip_all, fields(file = %args.file))]
pub fn cmd_extract(
    args: ExtractArgs,
    global_json: bool,
    settings: &SessionSettings,
) -> anyhow::Result<()> {
    debug!(
        file = %args.file,
        stop_words = ?args.stop_words,
        output = ?args.output,
        "executing extract command"
    );

    let Some(stop_words) = settings.stop_words(args.stop_words.as_deref()) else {
        bail!("load stop words first: pass --stop-words or set `stop_words` in config");
    };

    let mut session = settings.new_session();
    session
        .load_stop_words(stop_words)
        .with_context(|| format!("failed to load stop words from {stop_words}"))?;

    match session
        .load_document(&args.file)
        .with_context(|| format!("failed to extract tags from {}", args.file))?
    {
        Processing::Processed(stats) => {
            debug!(distinct = stats.distinct, total = stats.total, "extracted");
        }
        Processing::StopWordsRequired => {
            bail!("{stop_words} has no stop words; load stop words first");
        }
        Processing::NoDocument => bail!("no document to process"),
    }

    if global_json {
        if let Some(report) = session.report() {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    } else if let Some(display) = session.display() {
        print!("{display}");
    }

    if let Some(ref output) = args.output {
        let lines = session
            .save(output)
            .with_context(|| format!("failed to save tags to {output}"))?;
        if !global_json {
            eprintln!(
                "{} saved {lines} tags to {output}",
                "Done!".if_supports_color(Stream::Stderr, |t| t.green()),
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
        Utf8PathBuf::try_from(path).unwrap()
    }

    #[test]
    fn extracts_and_saves() {
        let tmp = TempDir::new().unwrap();
        let stops = utf8(tmp.path().join("stop.txt"));
        let doc = utf8(tmp.path().join("doc.txt"));
        let out = utf8(tmp.path().join("tags.txt"));
        fs::write(&stops, "the\n").unwrap();
        fs::write(&doc, "The fox, the hound.\n").unwrap();

        let args = ExtractArgs {
            file: doc,
            stop_words: Some(stops),
            output: Some(out.clone()),
        };
        cmd_extract(args, true, &SessionSettings::default()).unwrap();
        assert_eq!(
            fs::read_to_string(&out).unwrap().lines().collect::<Vec<_>>(),
            vec!["fox: 1", "hound: 1"]
        );
    }

    #[test]
    fn falls_back_to_configured_stop_words() {
        let tmp = TempDir::new().unwrap();
        let stops = utf8(tmp.path().join("stop.txt"));
        let doc = utf8(tmp.path().join("doc.txt"));
        fs::write(&stops, "a\n").unwrap();
        fs::write(&doc, "a b\n").unwrap();

        let settings = SessionSettings {
            stop_words: Some(stops),
            input_limit: None,
        };
        let args = ExtractArgs {
            file: doc,
            stop_words: None,
            output: None,
        };
        assert!(cmd_extract(args, false, &settings).is_ok());
    }

    #[test]
    fn requires_stop_words() {
        let args = ExtractArgs {
            file: Utf8PathBuf::from("whatever.txt"),
            stop_words: None,
            output: None,
        };
        let err = cmd_extract(args, false, &SessionSettings::default()).unwrap_err();
        assert!(err.to_string().contains("load stop words first"));
    }

    #[test]
    fn empty_stop_words_file_is_refused() {
        let tmp = TempDir::new().unwrap();
        let stops = utf8(tmp.path().join("empty.txt"));
        let doc = utf8(tmp.path().join("doc.txt"));
        fs::write(&stops, "").unwrap();
        fs::write(&doc, "words here\n").unwrap();

        let args = ExtractArgs {
            file: doc,
            stop_words: Some(stops),
            output: None,
        };
        let err = cmd_extract(args, false, &SessionSettings::default()).unwrap_err();
        assert!(err.to_string().contains("load stop words first"));
    }
}
