use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use vitest_lens_core::root::absolutize;
use vitest_lens_core::{
    build_name_pattern, pattern_matches, resolve_project_root, Config, LaunchBuilder,
    NeverCancelled, RunMode, SourceFile, TestDeclaration, TestWalker,
};

mod lines;

use lines::LineIndex;

#[derive(Parser)]
#[command(name = "vitest-lens")]
#[command(about = "Run and debug individual Vitest tests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the language server on stdin/stdout
    Serve,
    /// List the suites and tests declared in a file
    Discover {
        file: PathBuf,
        /// Print declarations as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the launch configuration for the test declared on a line
    Launch {
        file: PathBuf,
        /// 1-based line of the declaration's name
        #[arg(long)]
        line: usize,
        /// Attach the debugger instead of a plain run
        #[arg(long)]
        debug: bool,
    },
    /// Print the name pattern for the test declared on a line
    Pattern {
        file: PathBuf,
        /// 1-based line of the declaration's name
        #[arg(long)]
        line: usize,
        /// Check the pattern against a full test name
        #[arg(long, value_name = "FULL_NAME")]
        matches: Option<String>,
    },
    /// Print the project root for a file
    Root { file: PathBuf },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // stdout carries the protocol in `serve`, so logs always go to stderr
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let cli = Cli::parse();
    let config = Config::load().wrap_err("failed to load configuration")?;

    match cli.command {
        Commands::Serve => {
            tracing::info!("starting language server on stdio");
            vitest_lens_lsp::serve_stdio(config).await;
        }
        Commands::Discover { file, json } => {
            let (source, declarations) = discover_file(&config, &file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&declarations)?);
            } else {
                print_declarations(&source, &declarations);
            }
        }
        Commands::Launch { file, line, debug } => {
            let (source, declarations) = discover_file(&config, &file)?;
            let declaration = declaration_on_line(&source, &declarations, line)?;
            let mode = if debug { RunMode::Debug } else { RunMode::Run };

            let spec = LaunchBuilder::new(config).build(declaration, mode)?;
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
        Commands::Pattern {
            file,
            line,
            matches,
        } => {
            let (source, declarations) = discover_file(&config, &file)?;
            let declaration = declaration_on_line(&source, &declarations, line)?;
            let pattern = build_name_pattern(declaration, config.launch.pattern_policy);
            println!("{}", pattern);

            if let Some(full_name) = matches {
                let matched = pattern_matches(&pattern, &full_name)
                    .wrap_err_with(|| format!("invalid pattern {}", pattern))?;
                println!("{}: {}", full_name, if matched { "matches" } else { "no match" });
            }
        }
        Commands::Root { file } => {
            let root = resolve_project_root(&absolutize(&file), &config.runner)?;
            println!("{}", root.display());
        }
        Commands::Config => {
            print!("{}", config.to_toml_string());
        }
    }

    Ok(())
}

fn discover_file(config: &Config, file: &Path) -> Result<(SourceFile, Vec<TestDeclaration>)> {
    let source = SourceFile::read(absolutize(file))?;
    let discovery = TestWalker::new(&config.discovery).discover(&source, NeverCancelled);
    tracing::debug!(
        file = %source.path().display(),
        count = discovery.declarations.len(),
        "discovered declarations"
    );
    Ok((source, discovery.declarations))
}

/// The innermost declaration whose name literal starts on `line`.
fn declaration_on_line<'a>(
    source: &SourceFile,
    declarations: &'a [TestDeclaration],
    line: usize,
) -> Result<&'a TestDeclaration> {
    let index = LineIndex::new(source.text());

    declarations
        .iter()
        .filter(|declaration| index.line_of(declaration.span.start) == line)
        .max_by_key(|declaration| declaration.ancestor_names.len())
        .ok_or_else(|| {
            eyre!(
                "no test or suite declared on {}:{}",
                source.path().display(),
                line
            )
        })
}

fn print_declarations(source: &SourceFile, declarations: &[TestDeclaration]) {
    if declarations.is_empty() {
        println!("No tests found in {}", source.path().display());
        return;
    }

    let index = LineIndex::new(source.text());
    for declaration in declarations {
        println!(
            "{:>5}  {}{:<5} {}",
            index.line_of(declaration.span.start),
            "  ".repeat(declaration.ancestor_names.len()),
            declaration.kind.as_str(),
            declaration.name
        );
    }
}
