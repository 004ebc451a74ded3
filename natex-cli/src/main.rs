use clap::{Parser, Subcommand};
use colored::Colorize;
use natex_core::{CompiledPattern, MacroRegistry, Natex, Vars, parse};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "natex")]
#[command(about = "Natex - natural language patterns compiled to regular expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an expression and print its tree
    Parse {
        /// The Natex expression
        expression: String,
    },
    /// Compile an expression to a regular expression
    Compile {
        /// The Natex expression
        expression: String,
        /// Seed a variable, as name=value (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// Show every compilation step
        #[arg(short, long)]
        debug: bool,
    },
    /// Match an utterance against an expression
    Match {
        /// The Natex expression
        expression: String,
        /// The utterance to match as a whole
        utterance: String,
        /// Seed a variable, as name=value (repeatable)
        #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,
        /// Show every compilation step
        #[arg(short, long)]
        debug: bool,
    },
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{}`", s)),
    }
}

/// Log to stderr, only when RUST_LOG asks for it
fn init_tracing() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { expression } => cmd_parse(&expression),
        Commands::Compile {
            expression,
            vars,
            debug,
        } => cmd_compile(&expression, vars.into_iter().collect(), debug),
        Commands::Match {
            expression,
            utterance,
            vars,
            debug,
        } => cmd_match(&expression, &utterance, vars.into_iter().collect(), debug),
    }
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), error);
    std::process::exit(1);
}

fn print_trace(pattern: &CompiledPattern) {
    if let Some(trace) = pattern.trace() {
        println!("{}", "Steps:".bold());
        for step in trace.steps() {
            println!("  {:18} {}", step.label.cyan(), step.rendering);
        }
        println!();
    }
}

fn cmd_parse(expression: &str) {
    let term = parse(expression).unwrap_or_else(|e| fail(e));

    println!("{}", "Parsed expression".bold());
    println!("  Input: {}", expression.cyan());
    println!("  Kind:  {}", term.kind());
    println!();
    println!("{}", "Tree:".bold());
    println!("{:#?}", term);
}

fn cmd_compile(expression: &str, vars: Vars, debug: bool) {
    let natex = Natex::new(expression, MacroRegistry::new());
    let pattern = natex
        .compile(&vars, None, debug)
        .unwrap_or_else(|e| fail(e));

    if debug {
        print_trace(&pattern);
    }
    println!("{}", "Output:".bold());
    println!("  {}", pattern.as_str().green());
}

fn cmd_match(expression: &str, utterance: &str, mut vars: Vars, debug: bool) {
    let natex = Natex::new(expression, MacroRegistry::new());
    let result = natex
        .matches(utterance, &mut vars, None, debug)
        .unwrap_or_else(|e| fail(e));
    tracing::debug!(matched = result.is_match(), "match finished");

    if debug {
        print_trace(result.pattern());
    }
    println!("  Pattern:   {}", result.pattern().as_str().cyan());
    println!("  Utterance: {}", utterance.yellow());
    println!();

    if !result.is_match() {
        println!("{}", "✗ No match".red());
        std::process::exit(1);
    }

    println!("{}", "✓ Match".green().bold());
    if !result.captures().is_empty() {
        println!();
        println!("{}", "Captures:".bold());
        let mut captures: Vec<_> = result.captures().iter().collect();
        captures.sort();
        for (name, value) in captures {
            println!("  ${} = {}", name, value.green());
        }
    }
}
