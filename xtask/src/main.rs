use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for genscore")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy with warnings denied
    Clippy,
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
    },
    /// Run tests, optionally limited to one or more core modules
    Test {
        /// Run doc tests only
        #[arg(long)]
        doc: bool,
        /// Modules to test (default: the whole workspace)
        #[arg(long = "module", value_enum)]
        modules: Vec<Module>,
    },
    /// Run benchmarks
    Bench,
    /// Run a CP/M Z80 exerciser (zexdoc/zexall) through z80run
    Exerciser {
        /// Path to the .com image
        #[arg(default_value = "zexdoc.com")]
        image: String,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
}

/// Core module with its own unit test tree
#[derive(Clone, Copy, ValueEnum)]
enum Module {
    Cpu,
    Io,
    Eeprom,
    Config,
}

impl Module {
    fn path(self) -> &'static str {
        match self {
            Module::Cpu => "core::cpu",
            Module::Io => "core::io",
            Module::Eeprom => "core::eeprom",
            Module::Config => "core::config",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => run_ci(),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy => run_clippy(),
        Commands::Build { release } => run_build(release),
        Commands::Test { doc, modules } => run_test(doc, &modules),
        Commands::Bench => cargo(&["bench"]),
        Commands::Exerciser { image, release } => run_exerciser(&image, release),
    }
}

fn run_ci() -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true))?;
    run_task("Clippy", run_clippy)?;
    run_task("Build", || run_build(false))?;
    run_task("Test", || run_test(false, &[]))?;

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    if check {
        cargo(&["fmt", "--all", "--", "--check"])
    } else {
        cargo(&["fmt", "--all"])
    }
}

fn run_clippy() -> Result<()> {
    cargo(&["clippy", "--all-targets", "--", "-D", "warnings"])
}

fn run_build(release: bool) -> Result<()> {
    if release {
        cargo(&["build", "--release"])
    } else {
        cargo(&["build"])
    }
}

fn run_test(doc: bool, modules: &[Module]) -> Result<()> {
    if doc {
        return cargo(&["test", "--doc"]);
    }
    if modules.is_empty() {
        return cargo(&["test", "--workspace"]);
    }

    let mut failed = Vec::new();
    for module in modules {
        println!("{} Running {} tests...", "→".blue(), module.path().bold());
        match cargo(&["test", "--lib", module.path()]) {
            Ok(()) => println!("{} {} passed\n", "✓".green(), module.path()),
            Err(_) => {
                println!("{} {} failed\n", "✗".red(), module.path());
                failed.push(module.path());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Module tests failed: {}", failed.join(", "))
    }
}

fn run_exerciser(image: &str, release: bool) -> Result<()> {
    println!("{}", "=== Z80 Exerciser ===".bold().blue());

    if !Path::new(image).exists() {
        println!(
            "{} Exerciser image not found: {}",
            "✗".red().bold(),
            image.yellow()
        );
        println!(
            "\n{} Place zexdoc.com or zexall.com in the project root.",
            "ℹ".blue()
        );
        anyhow::bail!("Exerciser image not found");
    }

    println!("{} Image: {}", "✓".green(), image.cyan());

    let start = Instant::now();
    let mut args = vec!["run"];
    if release {
        args.push("--release");
    }
    args.extend(["--bin", "z80run", "--", image, "--cpm"]);
    cargo(&args)?;

    println!(
        "\n{} Exerciser completed in {}",
        "✓".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn run_task<F>(name: &str, task: F) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    println!("{} {}", "→".blue(), name);

    let start = Instant::now();
    match task() {
        Ok(()) => {
            println!(
                "{} {} ({:.2}s)",
                "✓".green().bold(),
                name,
                start.elapsed().as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), name);
            Err(e)
        }
    }
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo")
        .args(args)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("cargo {} failed with exit code: {}", args.join(" "), status);
    }
    Ok(())
}
