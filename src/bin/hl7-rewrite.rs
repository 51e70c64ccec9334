//! hl7-rewrite CLI - apply, check and compile HL7v2 rewrite rule sets

use clap::{Parser, Subcommand};
use hl7_rewrite::codegen;
use hl7_rewrite::{
    check_template, AppConfig, JsonFileStore, MessageTemplate, Rewriter, RuleSet, TemplateCatalog,
};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hl7-rewrite")]
#[command(version, about = "Rule-driven HL7v2 message rewriting and code generation", long_about = None)]
struct Cli {
    /// Path to hl7-rewrite.yaml (default: ./hl7-rewrite.yaml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a message with a rule set
    Apply {
        /// Rule set file (.yaml/.yml or .json)
        #[arg(short, long)]
        rules: PathBuf,

        /// Message file (default: stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a standalone Rust rewrite unit from a rule set
    Generate {
        /// Rule set file (.yaml/.yml or .json)
        #[arg(short, long)]
        rules: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generated function name (overrides config)
        #[arg(short, long)]
        function: Option<String>,
    },

    /// Report structural issues in a rule set
    Validate {
        /// Rule set file (.yaml/.yml or .json)
        #[arg(short, long)]
        rules: PathBuf,
    },

    /// Run a rule set over stored templates and compare with expected output
    Check {
        /// Rule set file (.yaml/.yml or .json)
        #[arg(short, long)]
        rules: PathBuf,

        /// Only check this template
        #[arg(short, long)]
        template: Option<String>,
    },

    /// Manage message templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List template names
    List,

    /// Print a template's input and expected output
    Show {
        name: String,
    },

    /// Add or replace a template
    Add {
        name: String,

        /// Input message file
        #[arg(short, long)]
        input: PathBuf,

        /// Expected output file
        #[arg(short, long)]
        expected: PathBuf,
    },

    /// Remove a user template
    Remove {
        name: String,
    },
}

fn main() {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Apply { rules, input, output } => apply(&rules, input, output),
        Commands::Generate { rules, output, function } => generate(&config, &rules, output, function),
        Commands::Validate { rules } => validate(&rules),
        Commands::Check { rules, template } => check(&config, &rules, template),
        Commands::Templates { command } => templates(&config, command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_rules(path: &Path) -> Result<RuleSet, String> {
    RuleSet::load_from_file(path).map_err(|e| format!("Failed to load rules {}: {}", path.display(), e))
}

fn read_text(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn write_output(output: Option<PathBuf>, contents: &str) -> Result<(), String> {
    match output {
        Some(path) => codegen::fs_utils::write_file(&path, contents)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e)),
        None => io::stdout()
            .write_all(contents.as_bytes())
            .map_err(|e| format!("Failed to write to stdout: {}", e)),
    }
}

fn apply(rules: &Path, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<(), String> {
    let rewriter = Rewriter::new(load_rules(rules)?);

    let text = match input {
        Some(path) => read_text(&path)?,
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            text
        }
    };

    let rewritten = rewriter.rewrite(&text).map_err(|e| e.to_string())?;
    write_output(output, &rewritten)
}

fn generate(
    config: &AppConfig,
    rules: &Path,
    output: Option<PathBuf>,
    function: Option<String>,
) -> Result<(), String> {
    let rule_set = load_rules(rules)?;

    let mut codegen_config = config.codegen();
    if let Some(function) = function {
        codegen_config.function_name = function;
    }

    match output {
        Some(path) => {
            codegen::generate_to_file(&rule_set, &codegen_config, &path)?;
            Ok(())
        }
        None => write_output(None, &codegen::generate(&rule_set, &codegen_config)),
    }
}

fn validate(rules: &Path) -> Result<(), String> {
    let rule_set = load_rules(rules)?;
    let issues = rule_set.validate();

    if issues.is_empty() {
        println!("✓ {} ({} filters): no issues", rule_set.name, rule_set.filters.len());
    } else {
        println!("⚠ {} ({} filters): {} issues", rule_set.name, rule_set.filters.len(), issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
    }
    Ok(())
}

fn check(config: &AppConfig, rules: &Path, only: Option<String>) -> Result<(), String> {
    let rewriter = Rewriter::new(load_rules(rules)?);
    let catalog = load_catalog(config)?;

    let selected: Vec<&MessageTemplate> = match &only {
        Some(name) => vec![catalog
            .get(name)
            .ok_or_else(|| format!("Template not found: {}", name))?],
        None => catalog.iter().collect(),
    };

    let mut failures = 0;
    for template in selected {
        match check_template(template, &rewriter) {
            Ok(result) if result.matches => println!("✓ {}", result.name),
            Ok(result) => {
                failures += 1;
                println!("✗ {}", result.name);
                for line in &result.mismatched_lines {
                    println!("    line {} differs", line);
                }
            }
            Err(e) => {
                failures += 1;
                println!("✗ {}: {}", template.name, e);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} template(s) did not match", failures));
    }
    Ok(())
}

fn load_catalog(config: &AppConfig) -> Result<TemplateCatalog, String> {
    let store = JsonFileStore::new(&config.templates_path);
    TemplateCatalog::load(&store).map_err(|e| {
        format!("Failed to load templates {}: {}", config.templates_path.display(), e)
    })
}

fn templates(config: &AppConfig, command: TemplateCommands) -> Result<(), String> {
    let mut store = JsonFileStore::new(&config.templates_path);
    let mut catalog = load_catalog(config)?;

    match command {
        TemplateCommands::List => {
            for template in catalog.iter() {
                println!("{}", template.name);
            }
            Ok(())
        }
        TemplateCommands::Show { name } => {
            let template = catalog
                .get(&name)
                .ok_or_else(|| format!("Template not found: {}", name))?;
            println!("# {}", template.name);
            println!("## input");
            println!("{}", template.input);
            println!("## expected");
            println!("{}", template.expected);
            Ok(())
        }
        TemplateCommands::Add { name, input, expected } => {
            let template = MessageTemplate::new(name, read_text(&input)?, read_text(&expected)?);
            hl7_rewrite::Message::parse(&template.input)
                .map_err(|e| format!("Template input is not a valid message: {}", e))?;

            let replaced = catalog.insert(template).is_some();
            catalog.save(&mut store).map_err(|e| e.to_string())?;
            println!("✓ {} template", if replaced { "Replaced" } else { "Added" });
            Ok(())
        }
        TemplateCommands::Remove { name } => {
            catalog.remove(&name).map_err(|e| e.to_string())?;
            catalog.save(&mut store).map_err(|e| e.to_string())?;
            println!("✓ Removed {}", name);
            Ok(())
        }
    }
}
