//! Command line definition.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Inspect, evaluate and re-save gettext catalogs
#[derive(Parser, Debug)]
#[command(name = "gettext-tool", version, about = "Gettext MO/PO catalog tool")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    pub verbose: bool,

    /// Emit log records as JSON
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    pub log_json: bool,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the header, metadata and entries of an MO file
    Inspect {
        /// MO file to read
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },

    /// Evaluate a Plural-Forms formula for one or more counts
    Plural {
        /// `nplurals=K; plural=EXPR;` header or a bare expression
        #[arg(value_name = "FORMULA")]
        formula: String,

        /// Counts to evaluate
        #[arg(value_name = "N", required = true)]
        counts: Vec<u64>,
    },

    /// Translate a message through the configured catalogs
    Translate {
        /// Configuration file (defaults to GETTEXT_CONFIG_PATH or ./gettext.yaml)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Language to translate into
        #[arg(long, value_name = "LANG")]
        lang: String,

        /// Untranslated plural, returned for counts above one on a miss
        #[arg(long, value_name = "TEXT")]
        plural: Option<String>,

        /// Quantity selecting the plural form
        #[arg(long, value_name = "N", default_value_t = 1)]
        count: u64,

        /// Message to translate
        #[arg(value_name = "MESSAGE")]
        message: String,

        /// printf arguments interpolated into the translation
        #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Load a language and write one source back as MO and PO
    Resave {
        /// Configuration file (defaults to GETTEXT_CONFIG_PATH or ./gettext.yaml)
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Language to re-save
        #[arg(long, value_name = "LANG")]
        lang: String,

        /// Source identifier to write
        #[arg(value_name = "SOURCE")]
        source: String,
    },
}
