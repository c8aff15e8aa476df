//! Add command implementation for statik CLI.
//!
//! Resolves the requested modules, stages them under `Modules/extras/` and
//! registers them in `Modules/Setup`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Args, ValueEnum};
use statik_core::{
    CythonTranspiler, FilesystemImporter, FreezeConfig, FreezeReport, Freezer, ModuleRequest,
    PackageImporter, PythonImporter, PythonInterpreter, PythonScanner, SourceOverrideMap,
};

use crate::colors;

/// Result type for CLI operations.
pub type CliResult = anyhow::Result<()>;

/// How package members are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Walker {
    /// Import the package in the host interpreter
    Python,
    /// List the package directory on disk
    Filesystem,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Modules to add, each optionally pinned as name=path/to/source
    modules: Vec<ModuleRequest>,

    /// Driver script whose imports are added as well
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Modules never to add, comma separated
    #[arg(short, long, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Extra directory to search for modules (repeatable, searched in order)
    #[arg(short = 'p', long = "path")]
    paths: Vec<PathBuf>,

    /// Also add the imports of every requested module
    #[arg(short, long)]
    deps: bool,

    /// Native source trees of packages, as pkg:/dir,pkg2:/dir
    #[arg(long)]
    src: Option<SourceOverrideMap>,

    /// Show what would be added without changing any file
    #[arg(short = 't', long = "test")]
    dry_run: bool,

    /// How package members are enumerated
    #[arg(long, value_enum, default_value_t = Walker::Python)]
    walker: Walker,

    /// Don't search the interpreter's sys.path
    #[arg(long)]
    no_sys_path: bool,

    /// Runtime source tree containing Modules/
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

impl AddArgs {
    fn needs_interpreter(&self) -> bool {
        self.script.is_some() || self.deps || self.walker == Walker::Python || !self.no_sys_path
    }
}

/// Add modules to the runtime build.
pub fn execute(args: &AddArgs) -> CliResult {
    if args.modules.is_empty() && args.script.is_none() {
        anyhow::bail!("Nothing to add: name at least one module or pass --script");
    }
    if let Some(script) = &args.script {
        if !script.is_file() {
            anyhow::bail!("Script not found: {}", script.display());
        }
    }

    let start = Instant::now();

    let python = if args.needs_interpreter() {
        match PythonInterpreter::detect() {
            Ok(python) => Some(python),
            Err(e) if args.script.is_some() || args.deps => return Err(e.into()),
            Err(e) => {
                tracing::warn!("{}; continuing without it", e);
                None
            }
        }
    } else {
        None
    };

    let mut config = FreezeConfig::for_root(&args.root)
        .with_search_dirs(args.paths.iter().cloned())
        .with_excluded(args.exclude.iter().cloned())
        .with_overrides(args.src.clone().unwrap_or_default())
        .with_deep(args.deps)
        .with_dry_run(args.dry_run);

    if let (Some(python), false) = (&python, args.no_sys_path) {
        let sys_path = python
            .sys_path()
            .context("Failed to read the interpreter's sys.path")?;
        config = config.with_fallback_dirs(sys_path);
    }

    let manifest_path = config.dirs.require_manifest()?.to_path_buf();

    println!(
        "\n{}statik{} - Adding modules to {}{}{}\n",
        colors::BOLD,
        colors::RESET,
        colors::CYAN,
        manifest_path.display(),
        colors::RESET
    );

    let scanner = PythonScanner::new(
        python
            .clone()
            .unwrap_or_else(|| PythonInterpreter::new("python3")),
    );
    let transpiler = CythonTranspiler::detect();
    let python_importer;
    let importer: &dyn PackageImporter = match (&python, args.walker) {
        (Some(python), Walker::Python) => {
            python_importer = PythonImporter::new(python.clone());
            &python_importer
        }
        (None, Walker::Python) => {
            tracing::warn!("No interpreter for --walker python, listing packages on disk");
            &FilesystemImporter
        }
        (_, Walker::Filesystem) => &FilesystemImporter,
    };

    colors::step("Resolving modules");
    let freezer = Freezer::new(config, &scanner, &transpiler, importer);
    let report = freezer.run(&args.modules, args.script.as_deref())?;
    colors::done(&format!("{} modules", report.closure.len()));

    print_report(&report, args.dry_run);

    println!();
    println!(
        "{}Time:{} {:.2}s",
        colors::DIM,
        colors::RESET,
        start.elapsed().as_secs_f64()
    );

    if !report.is_success() {
        anyhow::bail!(
            "{} module(s) failed: {}",
            report.failures.len(),
            report.failed_modules().join(", ")
        );
    }

    Ok(())
}

fn print_report(report: &FreezeReport, dry_run: bool) {
    println!();
    for name in &report.activated {
        println!("{}  ** Activated{} {}", colors::GREEN, colors::RESET, name);
    }
    for artifact in &report.staged {
        println!(
            "{}  ** Added{} {} {}({}){}",
            colors::GREEN,
            colors::RESET,
            artifact.module,
            colors::DIM,
            artifact.relative_path,
            colors::RESET
        );
    }
    for name in &report.planned {
        println!("{}  ** Would add{} {}", colors::YELLOW, colors::RESET, name);
    }
    for name in &report.skipped {
        tracing::debug!("Skipped unresolvable dependency {}", name);
    }
    for failure in &report.failures {
        println!(
            "{}  ** Failed{} {}: {}",
            colors::RED,
            colors::RESET,
            failure.module,
            failure.error.with_hint()
        );
    }

    println!();
    if dry_run {
        println!(
            "{}Dry run:{} {} to activate, {} to add, nothing written",
            colors::YELLOW,
            colors::RESET,
            report.activated.len(),
            report.planned.len()
        );
    } else if report.manifest_written {
        println!(
            "{}Updated:{} {} activated, {} added",
            colors::GREEN,
            colors::RESET,
            report.activated.len(),
            report.staged.len()
        );
    } else {
        println!("{}Up to date:{} nothing to add", colors::GREEN, colors::RESET);
    }
}
