use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};

use linklens_core::{CleanResult, Config, ExportView, LinkLens, RuleKind};

/// Top-level CLI for the LinkLens link cleaner.
#[derive(Debug, Parser)]
#[command(name = "linklens")]
#[command(about = "LinkLens: strip tracking parameters from shared links", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Clean every URL found in the given text and print the result.
    Clean {
        /// Text to scan; reads stdin when omitted.
        text: Option<String>,

        /// Only process the first URL and print just the cleaned URL.
        #[arg(long)]
        first: bool,

        /// Emit the per-URL reports as JSON instead of human-readable text.
        #[arg(long)]
        json: bool,
    },

    /// Manage user rules.
    Rules {
        #[command(subcommand)]
        command: RulesCommand,
    },

    /// Show cumulative cleaning statistics.
    Stats {
        /// Reset the counters instead of showing them.
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Debug, Subcommand)]
enum RulesCommand {
    /// List user rules.
    List,

    /// Add a user rule.
    Add {
        /// Query parameter key (matched case-insensitively).
        key: String,

        /// Description of what the parameter does (blacklist only).
        #[arg(long, default_value = "")]
        label: String,

        /// Mark as high-sensitivity (device fingerprinting / ad tracking).
        #[arg(long)]
        danger: bool,

        /// Add to the whitelist instead of the blacklist.
        #[arg(long)]
        whitelist: bool,
    },

    /// Delete a user rule by key.
    Delete {
        /// Query parameter key.
        key: String,

        /// Delete from the whitelist instead of the blacklist.
        #[arg(long)]
        whitelist: bool,
    },

    /// Import rules from a JSON document; existing rules are never overwritten.
    Import {
        /// Path to the rule document.
        path: String,
    },

    /// Export rules as a JSON document to stdout.
    Export {
        /// Which collection to export.
        #[arg(long, value_enum, default_value = "user")]
        view: ExportArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExportArg {
    Builtin,
    User,
    Merged,
}

impl From<ExportArg> for ExportView {
    fn from(value: ExportArg) -> Self {
        match value {
            ExportArg::Builtin => ExportView::Builtin,
            ExportArg::User => ExportView::User,
            ExportArg::Merged => ExportView::Merged,
        }
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let lens = LinkLens::open(Config::default())?;
        tracing::debug!(config = ?lens.config(), "loaded configuration");

        match cli.command {
            Command::Clean { text, first, json } => clean(&lens, text, first, json),
            Command::Rules { command } => rules(&lens, command),
            Command::Stats { reset } => stats(&lens, reset),
        }
    }
}

fn clean(lens: &LinkLens, text: Option<String>, first: bool, json: bool) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => std::io::read_to_string(std::io::stdin())?,
    };

    if first {
        let Some(report) = lens.clean_first(&text)? else {
            bail!("no URL found in input");
        };
        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", report.cleaned_url);
            print_report(&report);
        }
        return Ok(());
    }

    let outcome = lens.clean_text(&text)?;
    if outcome.reports.is_empty() {
        bail!("no URL found in input");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.reports)?);
        return Ok(());
    }

    println!("{}", outcome.text);
    for report in &outcome.reports {
        print_report(report);
    }
    Ok(())
}

fn print_report(report: &CleanResult) {
    if !report.has_changes() {
        return;
    }
    eprintln!("cleaned: {}", report.original_url);
    for param in &report.removed_params {
        let danger = if param.danger { " [!]" } else { "" };
        let label = if param.label.is_empty() {
            String::new()
        } else {
            format!(" ({})", param.label)
        };
        eprintln!("  - {}={}{}{}", param.key, param.value, label, danger);
    }
}

fn rules(lens: &LinkLens, command: RulesCommand) -> Result<()> {
    match command {
        RulesCommand::List => {
            let rules = lens.user_rules();
            if rules.is_empty() {
                println!("no user rules");
                return Ok(());
            }
            for rule in rules {
                let danger = if rule.danger { " [!]" } else { "" };
                println!("{:<10} {}{}  {}", rule.kind.as_str(), rule.key, danger, rule.label);
            }
        }
        RulesCommand::Add {
            key,
            label,
            danger,
            whitelist,
        } => {
            let kind = if whitelist {
                RuleKind::Whitelist
            } else {
                RuleKind::Blacklist
            };
            let rule = lens.add_rule(&key, &label, danger, kind)?;
            println!("added {} rule: {}", rule.kind, rule.key);
        }
        RulesCommand::Delete { key, whitelist } => {
            let kind = if whitelist {
                RuleKind::Whitelist
            } else {
                RuleKind::Blacklist
            };
            let canonical = key.to_lowercase();
            let Some(rule) = lens
                .user_rules()
                .into_iter()
                .find(|r| r.kind == kind && r.canonical_key() == canonical)
            else {
                bail!("no {} rule with key {}", kind, key);
            };
            lens.delete_rule(rule.id)?;
            println!("deleted {} rule: {}", kind, key);
        }
        RulesCommand::Import { path } => {
            let text = std::fs::read_to_string(&path)?;
            let imported = lens.import_rules(&text)?;
            println!("imported {} rule(s)", imported);
        }
        RulesCommand::Export { view } => {
            print!("{}", lens.export_rules(view.into())?);
        }
    }
    Ok(())
}

fn stats(lens: &LinkLens, reset: bool) -> Result<()> {
    if reset {
        lens.reset_stats()?;
        println!("statistics reset");
        return Ok(());
    }

    let totals = lens.stats()?;
    println!("links cleaned:      {}", totals.total_links);
    println!("parameters removed: {}", totals.total_params);
    Ok(())
}
