use anyhow::{Context, Result, bail};
use blockdoc_config::{Config, EditorConfig};
use blockdoc_engine::coding::{self, markdown};
use blockdoc_engine::{BlockDocument, EditorSettings, StyleSheet};
use std::path::{Path, PathBuf};
use std::{env, process};

const USAGE: &str = "Usage:
  blockdoc-cli type <keys> [--json]
  blockdoc-cli show <file.json|file.md> [--markdown]

Keys are typed one at a time; \\n is Enter, \\t is Tab, \\b is Backspace.";

#[derive(Debug, PartialEq)]
enum Command {
    Type { keys: String, json: bool },
    Show { path: PathBuf, markdown: bool },
}

fn parse_args(args: &[String]) -> Result<Command> {
    let flags: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| a.starts_with("--"))
        .collect();
    let positional: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| !a.starts_with("--"))
        .collect();

    match positional.as_slice() {
        ["type", keys] => Ok(Command::Type {
            keys: unescape(keys),
            json: flags.contains(&"--json"),
        }),
        ["show", path] => Ok(Command::Show {
            path: PathBuf::from(path),
            markdown: flags.contains(&"--markdown"),
        }),
        _ => bail!("unrecognised arguments: {}", args.join(" ")),
    }
}

/// Turn the `\n`, `\t` and `\b` escapes of a shell argument into the keys
/// they stand for.
fn unescape(keys: &str) -> String {
    let mut out = String::with_capacity(keys.len());
    let mut chars = keys.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn engine_settings(editor: &EditorConfig) -> (EditorSettings, StyleSheet) {
    let settings = EditorSettings {
        markdown_shortcuts: editor.markdown_shortcuts,
        undo_limit: editor.undo_limit,
        ..EditorSettings::default()
    };
    let styles = StyleSheet {
        base_font_size: editor.base_font_size,
        font_family: editor.font_family.clone(),
        code_font_family: editor.code_font_family.clone(),
        ..StyleSheet::default()
    };
    (settings, styles)
}

/// Type `keys` at the caret, one key per edit, as a keyboard would.
fn type_keys(doc: &mut BlockDocument, keys: &str) {
    for ch in keys.chars() {
        let caret = doc.selection().caret_offset().unwrap_or(doc.len());
        if ch == '\u{8}' {
            if caret > 0 {
                doc.request_edit(caret - 1..caret, "");
            }
        } else {
            doc.request_edit(caret..caret, &ch.to_string());
        }
    }
}

fn load_document(path: &Path, doc: &mut BlockDocument) -> Result<()> {
    let blocks = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => coding::read_blocks(path)?,
        Some("md" | "markdown") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            markdown::import(&text)
        }
        _ => bail!("don't know how to read {}", path.display()),
    };
    let report = doc
        .load(&blocks)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    for warning in &report.warnings {
        log::warn!("{}: {warning}", path.display());
    }
    log::info!("Loaded {} blocks from {}", report.blocks, path.display());
    Ok(())
}

fn run(command: Command, config: &Config) -> Result<String> {
    let (settings, styles) = engine_settings(&config.editor);
    let mut doc = BlockDocument::with_settings(settings, styles);
    match command {
        Command::Type { keys, json } => {
            type_keys(&mut doc, &keys);
            if json {
                Ok(coding::encode_blocks(&doc.serialize())?)
            } else {
                Ok(doc.outline())
            }
        }
        Command::Show {
            path,
            markdown: as_markdown,
        } => {
            let path = config.resolve_document(&path);
            load_document(&path, &mut doc)?;
            if as_markdown {
                Ok(markdown::export(&doc.serialize()))
            } else {
                Ok(doc.outline())
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            log::warn!("Ignoring config file {}: {e}", Config::config_path().display());
            Config::default()
        }
    };

    println!("{}", run(command, &config)?);
    Ok(())
}
