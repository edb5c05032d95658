//! Subcommand implementations.
//!
//! Every command returns the text to print so that it can be tested without
//! capturing stdout.

use crate::cli::{Cli, Command};
use anyhow::{Context, Result};
use gettext_catalog::{
    evaluate, plural::declared_nplurals, CatalogLoader, Collaborators, Form, FormatArg,
    GettextTranslator, Translator,
};
use gettext_config::{ConfigLoader, LoggingSettings, TranslatorConfig};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, info};

/// Runs a parsed command.
pub fn run(command: Command) -> Result<String> {
    match command {
        Command::Inspect { file, json } => inspect(&file, json),
        Command::Plural { formula, counts } => plural(&formula, &counts),
        Command::Translate {
            config,
            lang,
            plural,
            count,
            message,
            args,
        } => {
            let config = load_config(config.as_deref(), &lang)?;
            let form = match plural {
                Some(plural) => Form::Plural { plural, count },
                None => Form::Count(count),
            };
            let args: Vec<FormatArg> = args.iter().map(|a| FormatArg::parse_loose(a)).collect();
            translate(&config, &message, form, &args)
        }
        Command::Resave {
            config,
            lang,
            source,
        } => {
            let config = load_config(config.as_deref(), &lang)?;
            resave(&config, &source)
        }
    }
}

/// Filter used by `--verbose`.
pub const VERBOSE_LOG_LEVEL: &str = "gettext_catalog=debug,gettext_config=debug,gettext_tool=debug";

/// Logging settings for a run: the configured `logging` section of commands
/// that read a configuration, overridden by the global flags.
///
/// A configuration that fails to load yields the defaults here; the command
/// itself reports the failure once logging is up.
pub fn logging_settings(cli: &Cli) -> LoggingSettings {
    let mut settings = match &cli.command {
        Command::Translate { config, .. } | Command::Resave { config, .. } => {
            read_config(config.as_deref())
                .map(|config| config.logging)
                .unwrap_or_default()
        }
        Command::Inspect { .. } | Command::Plural { .. } => LoggingSettings::default(),
    };

    if cli.verbose {
        settings.level = VERBOSE_LOG_LEVEL.to_string();
    }
    if cli.log_json {
        settings.json = true;
    }
    settings
}

fn read_config(path: Option<&Path>) -> Result<TranslatorConfig> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => ConfigLoader::load().context("Failed to load configuration"),
    }
}

/// Loads the configuration and switches it to `lang`.
pub fn load_config(path: Option<&Path>, lang: &str) -> Result<TranslatorConfig> {
    let mut config = read_config(path)?;
    config.lang = lang.to_string();
    debug!("Using {} configured sources", config.files.len());
    Ok(config)
}

/// Describes an MO file.
pub fn inspect(path: &Path, as_json: bool) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let header = CatalogLoader::parse_header(&bytes)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let catalog = CatalogLoader::parse(&bytes, "inspect")
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if as_json {
        let metadata: Map<String, Value> = catalog
            .metadata
            .iter()
            .flat_map(|metadata| metadata.iter())
            .map(|(key, value)| (key.to_string(), Value::from(value)))
            .collect();
        let entries: Vec<Value> = catalog
            .entries
            .iter()
            .map(|entry| json!({ "original": entry.original, "translation": entry.translation }))
            .collect();
        let document = json!({
            "byteOrder": format!("{:?}", header.byte_order),
            "revision": header.revision,
            "count": header.count,
            "metadata": metadata,
            "entries": entries,
        });
        return Ok(serde_json::to_string_pretty(&document)?);
    }

    let mut out = String::new();
    writeln!(out, "File: {}", path.display())?;
    writeln!(
        out,
        "Byte order: {:?}, revision {}, {} strings",
        header.byte_order, header.revision, header.count
    )?;
    if let Some(metadata) = &catalog.metadata {
        writeln!(out, "Metadata:")?;
        for (key, value) in metadata.iter() {
            writeln!(out, "  {key}: {value}")?;
        }
    }
    writeln!(out, "Entries ({}):", catalog.entries.len())?;
    for entry in &catalog.entries {
        writeln!(out, "  {:?} => {:?}", entry.original, entry.translation)?;
    }
    Ok(out)
}

/// Evaluates a plural formula for every count.
pub fn plural(formula: &str, counts: &[u64]) -> Result<String> {
    let mut out = String::new();
    if let Some(nplurals) = declared_nplurals(formula) {
        writeln!(out, "nplurals = {nplurals}")?;
    }
    for &n in counts {
        let index = evaluate(formula, n).with_context(|| format!("Failed to evaluate for n = {n}"))?;
        writeln!(out, "{n} -> {index}")?;
    }
    Ok(out)
}

/// Translates one message.
pub fn translate(
    config: &TranslatorConfig,
    message: &str,
    form: Form,
    args: &[FormatArg],
) -> Result<String> {
    let mut translator = GettextTranslator::from_config(config, Collaborators::in_memory())
        .context("Failed to set up translator")?;
    let text = translator
        .translate(message, form, args)
        .with_context(|| format!("Failed to translate {message:?}"))?;
    Ok(text)
}

/// Re-writes one source of the configured language.
pub fn resave(config: &TranslatorConfig, source: &str) -> Result<String> {
    let mut translator = GettextTranslator::from_config(config, Collaborators::in_memory())
        .context("Failed to set up translator")?;
    translator
        .ensure_loaded()
        .with_context(|| format!("Failed to load '{}' catalogs", config.lang))?;
    let (mo, po) = translator
        .save(source)
        .with_context(|| format!("Failed to save source '{source}'"))?;

    info!("Re-saved '{}' for '{}'", source, config.lang);
    Ok(format!("Wrote {}\nWrote {}", mo.display(), po.display()))
}
