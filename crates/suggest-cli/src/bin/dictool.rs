use clap::{Parser, Subcommand};

use suggest_cli::commands::{config_ops, dict_ops};
use suggest_cli::trace_init::init_tracing;

#[derive(Parser)]
#[command(name = "dictool", about = "Predictive-text dictionary inspection tool")]
struct Cli {
    /// Log search internals (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Custom settings TOML, applied before the dictionary is opened
    #[arg(long, global = true)]
    settings: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show header version, flags and attributes
    Info {
        /// Dictionary file
        dict_file: String,
    },
    /// Print the stored probability of a word (exact spelling)
    Probability {
        /// Dictionary file
        dict_file: String,
        word: String,
    },
    /// Predict words following a previous word
    Bigrams {
        /// Dictionary file
        dict_file: String,
        /// Previous word
        previous: String,
        /// Only predictions starting with one of these characters
        #[arg(long, default_value = "")]
        prefix: String,
    },
    /// Check whether a bigram from FIRST to SECOND is stored
    ValidBigram {
        /// Dictionary file
        dict_file: String,
        first: String,
        second: String,
    },
    /// Suggest words for typed (or traced) input
    Suggest {
        /// Dictionary file
        dict_file: String,
        /// Typed characters, or the word to trace with --gesture
        input: String,
        /// Word before the one being typed
        #[arg(long)]
        prev: Option<String>,
        /// Input positions already committed (no corrections before it)
        #[arg(long, default_value = "0")]
        commit: usize,
        /// Trace INPUT across a QWERTY layout and run a gesture query
        #[arg(long)]
        gesture: bool,
        /// Allow one edit per typed position
        #[arg(long)]
        full_edit_distance: bool,
        /// Number of suggestions
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Some(file) = cli.settings.as_deref() {
        config_ops::load_settings(file);
    }

    match cli.command {
        Command::Info { dict_file } => dict_ops::info(&dict_file),
        Command::Probability { dict_file, word } => dict_ops::probability(&dict_file, &word),
        Command::Bigrams {
            dict_file,
            previous,
            prefix,
        } => dict_ops::bigrams(&dict_file, &previous, &prefix),
        Command::ValidBigram {
            dict_file,
            first,
            second,
        } => dict_ops::valid_bigram(&dict_file, &first, &second),
        Command::Suggest {
            dict_file,
            input,
            prev,
            commit,
            gesture,
            full_edit_distance,
            n,
        } => {
            let args = dict_ops::SuggestArgs {
                input: &input,
                previous: prev.as_deref(),
                commit_point: commit,
                gesture,
                full_edit_distance,
                max_results: n,
            };
            dict_ops::suggest(&dict_file, &args);
        }
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
