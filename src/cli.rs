//! CLI argument parsing for the assembler.
//!
//! The CLI only wires host-side I/O around the library; all decisions live in
//! `doc_assembler`.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "docasm",
    version,
    about = "Refine OCR-classified batches: keyword reclassification, fragment merging, auto-review",
    after_help = "Examples:\n  docasm run --batch /batches/BI12/batch.json\n  docasm run --batch batch.json --rules rules.properties --out assembled.json --json\n  docasm rules --batch /batches/BI12/batch.json\n  docasm micr 'c0042c a021000021a 0012345678c'\n  docasm config --stub > assembler.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log each classification and merge decision
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Run(RunArgs),
    Rules(RulesArgs),
    Micr(MicrArgs),
    Config(ConfigArgs),
}

/// Inputs shared by commands that resolve keyword rules.
#[derive(Args, Debug)]
pub struct RuleInputs {
    /// Keyword rule file (.properties or .json); defaults to the batch class script-config
    #[arg(long, value_name = "PATH")]
    pub rules: Option<PathBuf>,

    /// Engine config JSON (thresholds, merge types, rule file name)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "Assemble a batch: classify, merge, and mark for auto-review")]
pub struct RunArgs {
    /// Batch JSON to assemble
    #[arg(long, value_name = "PATH")]
    pub batch: PathBuf,

    #[command(flatten)]
    pub inputs: RuleInputs,

    /// Where to write the assembled batch (defaults to overwriting --batch)
    #[arg(long, value_name = "PATH", conflicts_with = "dry_run")]
    pub out: Option<PathBuf>,

    /// Also write the assembly report JSON here
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Print the report as JSON instead of a summary
    #[arg(long)]
    pub json: bool,

    /// Run the pipeline without writing the batch
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Load and list keyword rules in evaluation order")]
pub struct RulesArgs {
    /// Batch JSON whose context locates the rule file
    #[arg(long, value_name = "PATH", required_unless_present = "rules")]
    pub batch: Option<PathBuf>,

    #[command(flatten)]
    pub inputs: RuleInputs,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Check values for a bank-check MICR marker")]
pub struct MicrArgs {
    /// MICR field values to test
    #[arg(required = true, value_name = "VALUE")]
    pub values: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Print the effective engine config, or a default stub")]
pub struct ConfigArgs {
    /// Engine config JSON to load and validate
    #[arg(long, value_name = "PATH", conflicts_with = "stub")]
    pub config: Option<PathBuf>,

    /// Print the default config as a starting point for a config file
    #[arg(long)]
    pub stub: bool,
}
