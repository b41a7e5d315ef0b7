use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tree_splice::batch::{self, BatchOptions, FileFilter, FileOutcome};
use tree_splice::config::{load_from_path, RuleSet};
use tree_splice::sg::parse_lang;
use tree_splice::{Document, QueryPattern, SupportLang};

#[derive(Parser)]
#[command(name = "tree-splice")]
#[command(about = "Query syntax trees and apply structural edits", long_about = None)]
#[command(version)]
struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true, conflicts_with = "silent")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    silent: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a rule file to source files
    Run {
        /// Rule file (TOML)
        rules: PathBuf,

        /// Files or directories to process (default: current directory)
        paths: Vec<PathBuf>,

        /// Write changes back instead of printing a diff
        #[arg(short, long)]
        write: bool,

        /// Parse every file as this language
        #[arg(short, long)]
        lang: Option<String>,

        /// Only process paths matching these globs
        #[arg(long)]
        include: Vec<String>,

        /// Skip paths matching these globs
        #[arg(long)]
        exclude: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every node matching a pattern
    Query {
        /// ast-grep pattern, or S-expression query with --ts
        pattern: String,

        /// Files or directories to search (default: current directory)
        paths: Vec<PathBuf>,

        /// Treat the pattern as a tree-sitter query selecting `@match`
        #[arg(long)]
        ts: bool,

        /// Parse every file as this language
        #[arg(short, long)]
        lang: Option<String>,
    },

    /// Validate a rule file without running it
    Check {
        /// Rule file (TOML)
        rules: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.silent);

    match cli.command {
        Commands::Run {
            rules,
            paths,
            write,
            lang,
            include,
            exclude,
            json,
        } => cmd_run(&rules, paths, write, lang, include, exclude, json),

        Commands::Query {
            pattern,
            paths,
            ts,
            lang,
        } => cmd_query(&pattern, paths, ts, lang),

        Commands::Check { rules } => cmd_check(&rules),
    }
}

fn init_tracing(verbose: bool, silent: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose {
        "tree_splice=debug"
    } else if silent {
        "error"
    } else {
        "tree_splice=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn resolve_lang(name: Option<&str>) -> Result<Option<SupportLang>> {
    name.map(parse_lang).transpose().map_err(Into::into)
}

fn default_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths
    }
}

/// Helper: Show unified diff with colored +/- lines
fn display_diff(diff: &str) {
    for line in diff.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.dimmed()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{styled}");
    }
}

fn cmd_run(
    rules_path: &Path,
    paths: Vec<PathBuf>,
    write: bool,
    lang: Option<String>,
    include: Vec<String>,
    exclude: Vec<String>,
    json: bool,
) -> Result<()> {
    let config = load_from_path(rules_path)?;

    // Command-line options override the rule file's meta section.
    let lang = resolve_lang(lang.as_deref().or(config.meta.lang.as_deref()))?;
    let include = if include.is_empty() {
        config.meta.include.clone()
    } else {
        include
    };
    let exclude = [config.meta.exclude.clone(), exclude].concat();
    let filter = FileFilter::new(&include, &exclude).context("invalid glob")?;

    let files = batch::discover(&default_paths(paths), &filter, lang)?;
    let rules = RuleSet::new(config);
    let options = BatchOptions { write, lang };
    let report = batch::run(&files, &rules, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for file in &report.files {
            let path = file.path.display();
            match &file.outcome {
                FileOutcome::Unchanged => {}
                FileOutcome::Changed { diff } => {
                    println!("{} {}: would change", "⊙".yellow(), path);
                    display_diff(diff);
                }
                FileOutcome::Written { diff } => {
                    println!("{} {}: written", "✓".green(), path);
                    display_diff(diff);
                }
                FileOutcome::Failed { reason } => {
                    eprintln!("{} {}: Failed - {}", "✗".red(), path, reason);
                }
            }
        }

        println!();
        println!("{}", "Summary:".bold());
        println!("  {} files", report.files.len());
        let verb = if write { "written" } else { "would change" };
        println!("  {} {}", format!("{}", report.changed()).green(), verb);
        println!("  {} failed", format!("{}", report.failed()).red());
    }

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_query(pattern: &str, paths: Vec<PathBuf>, ts: bool, lang: Option<String>) -> Result<()> {
    let lang = resolve_lang(lang.as_deref())?;
    let files = batch::discover(&default_paths(paths), &FileFilter::default(), lang)?;
    let pattern = if ts {
        QueryPattern::TreeSitter(pattern)
    } else {
        QueryPattern::AstGrep(pattern)
    };

    let mut total = 0;
    let mut failed = 0;
    for path in &files {
        let doc = match lang {
            Some(lang) => Document::from_path_as(path, lang),
            None => Document::from_path(path),
        };
        let matches = doc.map_err(anyhow::Error::from).and_then(|doc| {
            let selection = doc.query(pattern)?;
            Ok(selection.map(|ctx| {
                let node = ctx.node();
                let at = node.start_position();
                (at.row + 1, at.column + 1, ctx.text().to_string())
            }))
        });

        match matches {
            Ok(matches) => {
                for (line, column, text) in matches {
                    let first_line = text.lines().next().unwrap_or_default();
                    println!(
                        "{}:{}:{}: {}",
                        path.display().to_string().cyan(),
                        line,
                        column,
                        first_line
                    );
                    total += 1;
                }
            }
            Err(err) => {
                eprintln!("{} {}: {:#}", "✗".red(), path.display(), err);
                failed += 1;
            }
        }
    }

    println!();
    println!("{} matches in {} files", total, files.len());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_check(rules_path: &Path) -> Result<()> {
    match load_from_path(rules_path) {
        Ok(config) => {
            println!(
                "{} {}: {} rules",
                "✓".green(),
                rules_path.display(),
                config.rules.len()
            );
            for rule in &config.rules {
                println!("  - {}", rule.id);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {}", "✗".red(), err);
            std::process::exit(1);
        }
    }
}
