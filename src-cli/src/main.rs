//! docx-fill - Fill DOCX templates from form fields
//!
//! This is the main entry point for the command-line application.

mod commands;
mod settings;

use clap::{Parser, Subcommand};
use commands::{FormSource, MergeOverrides, SyntaxArg};
use mail_merge::GenerateError;
use settings::{SettingsManager, DEFAULT_SETTINGS_FILE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "docx-fill",
    about = "Fill placeholders in a DOCX template",
    long_about = "Replace {{name}}, {{rollNo}} and {{section}} placeholders in a DOCX template\n\
                  and save the result as <name>_<rollNo>.docx.",
    version
)]
struct Args {
    /// Settings file (JSON)
    #[arg(short, long, global = true, value_name = "FILE", default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Show detailed processing information
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct MergeFlags {
    /// Placeholder syntax used by the template
    #[arg(long, value_enum)]
    syntax: Option<SyntaxArg>,

    /// Fail when a placeholder is missing from the document body
    #[arg(long)]
    strict: bool,

    /// Leave headers and footers untouched
    #[arg(long)]
    no_headers: bool,

    /// Insert values without XML escaping
    #[arg(long)]
    no_escape: bool,
}

impl From<&MergeFlags> for MergeOverrides {
    fn from(flags: &MergeFlags) -> Self {
        Self {
            syntax: flags.syntax,
            strict: flags.strict,
            no_headers: flags.no_headers,
            no_escape: flags.no_escape,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fill the template with one set of form fields
    Generate {
        /// Template file
        #[arg(short, long, value_name = "DOCX")]
        template: Option<PathBuf>,

        /// Student name
        #[arg(long, required_unless_present = "form")]
        name: Option<String>,

        /// Roll number
        #[arg(long, required_unless_present = "form")]
        roll_no: Option<String>,

        /// Section
        #[arg(long, required_unless_present = "form")]
        section: Option<String>,

        /// Read the fields from a JSON file instead
        #[arg(long, value_name = "JSON", conflicts_with_all = ["name", "roll_no", "section"])]
        form: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        merge: MergeFlags,

        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the placeholders found in a template
    Inspect {
        /// Template file
        #[arg(short, long, value_name = "DOCX")]
        template: Option<PathBuf>,

        /// Placeholder syntax to look for
        #[arg(long, value_enum)]
        syntax: Option<SyntaxArg>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fill the template once per row of a CSV file
    Batch {
        /// Template file
        #[arg(short, long, value_name = "DOCX")]
        template: Option<PathBuf>,

        /// CSV file with name, rollNo and section columns
        #[arg(short, long, value_name = "CSV")]
        data: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        out_dir: Option<PathBuf>,

        #[command(flatten)]
        merge: MergeFlags,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a settings file with default values
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut manager = SettingsManager::new(&args.config);

    if let Commands::InitConfig { force } = args.command {
        return commands::init_config(&mut manager, force);
    }

    let settings = manager.load()?.clone();
    let mut out = std::io::stdout().lock();

    match args.command {
        Commands::Generate { template, name, roll_no, section, form, out_dir, merge, json } => {
            let source = match form {
                Some(path) => FormSource::JsonFile(path),
                None => FormSource::Fields {
                    name: name.unwrap_or_default(),
                    roll_no: roll_no.unwrap_or_default(),
                    section: section.unwrap_or_default(),
                },
            };
            commands::generate(&settings, template, source, out_dir, &MergeOverrides::from(&merge), json, &mut out)
        }
        Commands::Inspect { template, syntax, json } => {
            commands::inspect(&settings, template, syntax, json, &mut out)
        }
        Commands::Batch { template, data, out_dir, merge, json } => {
            commands::batch(&settings, template, &data, out_dir, &MergeOverrides::from(&merge), json, &mut out)
        }
        Commands::InitConfig { .. } => Ok(()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    tracing::debug!("Starting docx-fill");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            if let Some(generate_err) = err.downcast_ref::<GenerateError>() {
                eprintln!("hint: {}", generate_err.kind().advice());
            }
            ExitCode::FAILURE
        }
    }
}
