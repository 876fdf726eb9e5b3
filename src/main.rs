use anyhow::{Context, Result};
use clap::Parser;
use doc_assembler::batch::load_batch;
use doc_assembler::config::{config_stub, default_config, load_config, AssemblerConfig};
use doc_assembler::micr::find_micr;
use doc_assembler::model::BatchContext;
use doc_assembler::output::{display_path, write_batch, write_json_atomic};
use doc_assembler::{assemble, AssemblyReport, HocrFileSource, KeywordRuleSet};
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{Command, ConfigArgs, MicrArgs, RootArgs, RuleInputs, RulesArgs, RunArgs};

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Run(args) => cmd_run(args),
        Command::Rules(args) => cmd_rules(args),
        Command::Micr(args) => cmd_micr(args),
        Command::Config(args) => cmd_config(args),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_engine_config(path: Option<&Path>) -> Result<AssemblerConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(default_config()),
    }
}

fn load_rules(
    inputs: &RuleInputs,
    ctx: Option<&BatchContext>,
    config: &AssemblerConfig,
) -> Result<KeywordRuleSet> {
    let path = match (&inputs.rules, ctx) {
        (Some(path), _) => path.clone(),
        (None, Some(ctx)) => ctx.keyword_config_path(&config.rules_file_name),
        (None, None) => anyhow::bail!("--rules or --batch is required to locate keyword rules"),
    };
    KeywordRuleSet::load(&path).with_context(|| format!("load keyword rules {}", path.display()))
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let config = load_engine_config(args.inputs.config.as_deref())?;
    let mut batch =
        load_batch(&args.batch).with_context(|| format!("load batch {}", args.batch.display()))?;
    let rules = load_rules(&args.inputs, Some(&batch.context), &config)?;

    let report = assemble(&mut batch, &rules, &HocrFileSource, &config)
        .with_context(|| format!("assemble batch {}", batch.context.instance_identifier))?;

    if !args.dry_run {
        let out = args.out.as_deref().unwrap_or(args.batch.as_path());
        write_batch(out, &batch)?;
        tracing::info!(path = %out.display(), "wrote assembled batch");
    }
    if let Some(report_path) = &args.report {
        write_json_atomic(report_path, &report)?;
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    } else {
        print_summary(&report, rules.source());
    }
    Ok(())
}

fn print_summary(report: &AssemblyReport, rules_path: Option<&Path>) {
    let cwd = std::env::current_dir().ok();
    println!("batch {}", report.batch_instance_identifier);
    if let Some(path) = rules_path {
        println!(
            "rules: {} from {}",
            report.rule_count,
            display_path(path, cwd.as_deref())
        );
    }
    println!(
        "documents: {} -> {} ({} merged)",
        report.documents_in, report.documents_out, report.merged
    );
    let classification = &report.classification;
    println!(
        "classified: {} short-text, {} keyword, {} check",
        classification.short_text_documents,
        classification.keyword_matches,
        classification.check_matches
    );
    for (label, count) in &classification.keyword_labels {
        println!("  {label}: {count}");
    }
    println!("auto-reviewed: {}", report.auto_reviewed);
}

#[derive(Serialize)]
struct RuleListing<'a> {
    source: Option<String>,
    rules: Vec<RuleEntry<'a>>,
}

#[derive(Serialize)]
struct RuleEntry<'a> {
    label: &'a str,
    pattern: &'a str,
}

fn cmd_rules(args: RulesArgs) -> Result<()> {
    let config = load_engine_config(args.inputs.config.as_deref())?;
    let batch = match &args.batch {
        Some(path) if args.inputs.rules.is_none() => Some(
            load_batch(path).with_context(|| format!("load batch {}", path.display()))?,
        ),
        _ => None,
    };
    let rules = load_rules(
        &args.inputs,
        batch.as_ref().map(|batch| &batch.context),
        &config,
    )?;

    let listing = RuleListing {
        source: rules.source().map(|path| path.display().to_string()),
        rules: rules
            .iter()
            .map(|rule| RuleEntry {
                label: &rule.label,
                pattern: rule.pattern(),
            })
            .collect(),
    };
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).context("serialize rule listing")?
        );
        return Ok(());
    }
    if let Some(source) = &listing.source {
        println!("{source}");
    }
    for (idx, rule) in listing.rules.iter().enumerate() {
        println!("{:>3}. {} = {}", idx + 1, rule.label, rule.pattern);
    }
    Ok(())
}

fn cmd_micr(args: MicrArgs) -> Result<()> {
    for value in &args.values {
        match find_micr(value) {
            Some(marker) => println!("match\t{marker}\t{value}"),
            None => println!("no-match\t-\t{value}"),
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    if args.stub {
        println!("{}", config_stub()?);
        return Ok(());
    }
    let config = load_engine_config(args.config.as_deref())?;
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("serialize config")?
    );
    Ok(())
}
