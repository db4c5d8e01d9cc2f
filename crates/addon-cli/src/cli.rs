use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the configuration file to stdout
    Config {
        /// Open the configuration file in editor
        /// Optional value can be passed to set as editor (default is $EDITOR)
        #[arg(required = false, short, long)]
        edit: Option<Option<String>>,
    },

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,

    /// Parse add-on lists and show the add-ons they describe
    #[command(arg_required_else_help = true)]
    Parse {
        /// Add-on list files
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// List format (xml or plain); guessed from the file name when omitted
        #[arg(required = false, short, long)]
        kind: Option<String>,
    },

    /// Show the add-ons listed in an unattended-install profile section
    #[command(arg_required_else_help = true)]
    Import {
        /// JSON file with an `add_on_products` section
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        profile: PathBuf,
    },

    /// Run add-on lists against a simulated package manager and print the profile section
    #[command(arg_required_else_help = true)]
    Export {
        /// Add-on list files
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,

        /// List format (xml or plain); guessed from the file name when omitted
        #[arg(required = false, short, long)]
        kind: Option<String>,

        /// Accept licenses and skip media prompts without asking
        #[arg(required = false, short, long)]
        yes: bool,
    },
}
