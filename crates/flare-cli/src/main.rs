use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

mod commands;

/// Flare ActionScript build orchestrator.
///
/// Flare drives the external AIR/Flex compiler toolchain (compc, mxmlc)
/// from a flare.toml project manifest: it resolves project dependencies,
/// sequences the compilation steps, and invokes the compilers with
/// reproducible argument lists.
///
/// EXAMPLES:
///     flare build                  Build the project in the current directory
///     flare compile-swc            Compile only the library archive
///     flare classes                Regenerate the class manifest
///     flare clean                  Delete the build directory
///     flare ide                    Generate the IDE module descriptor
///
/// ENVIRONMENT VARIABLES:
///     FLARE_SDK    SDK root directory (overridden by --sdk)
#[derive(Parser)]
#[command(name = "flare")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Arguments shared by every step-running command
#[derive(Args)]
struct StepOpts {
    /// Project directory (defaults to the current directory)
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,
    /// SDK root directory
    #[arg(long, env = "FLARE_SDK")]
    sdk: Option<PathBuf>,
    /// Verbose output with per-step progress
    #[arg(long, short = 'v')]
    verbose: bool,
    /// Output the run summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the project
    ///
    /// Runs every step the project's artifact selection requires: archive
    /// compilation, executable compilation or extraction, and anything
    /// those depend on, including dependency projects. Steps whose inputs
    /// have not changed since the last run are skipped.
    ///
    /// EXAMPLES:
    ///     flare build                   Incremental build
    ///     flare build --clean           Build from scratch
    ///     flare build --json            Machine-readable summary
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        opts: StepOpts,
        /// Delete the build directory before building
        #[arg(long)]
        clean: bool,
        /// Quiet output (errors only)
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Compile the library archive (SWC)
    ///
    /// Invokes the compc tool for this project and any dependency
    /// projects it consumes.
    CompileSwc {
        #[command(flatten)]
        opts: StepOpts,
    },

    /// Compile the executable (SWF) from the entry point
    ///
    /// Invokes the mxmlc tool. Requires 'build.main_class' in flare.toml.
    CompileSwf {
        #[command(flatten)]
        opts: StepOpts,
    },

    /// Generate the class manifest
    ///
    /// Walks the source roots and writes the list of every discovered
    /// class to build/tmp/classes.xml.
    Classes {
        #[command(flatten)]
        opts: StepOpts,
    },

    /// Extract the executable from the compiled archive
    ///
    /// Copies the inner SWF out of an existing build/libs/library.swc.
    /// The archive itself is not rebuilt here; run 'compile-swc' or
    /// 'build' first.
    ExtractSwf {
        #[command(flatten)]
        opts: StepOpts,
    },

    /// Delete the build directory
    Clean {
        #[command(flatten)]
        opts: StepOpts,
    },

    /// Generate the IDE module descriptor
    ///
    /// Writes a Flex-flavored IntelliJ module file for the project under
    /// the workspace's .idea/modules/ tree.
    ///
    /// EXAMPLES:
    ///     flare ide                          Workspace root is the cwd
    ///     flare ide --workspace-root ../..   Explicit workspace root
    Ide {
        /// Project directory (defaults to the current directory)
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Workspace root owning the .idea directory
        #[arg(long, default_value = ".")]
        workspace_root: PathBuf,
        /// Print the generated file path as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// EXAMPLES:
    ///     flare completions bash > /etc/bash_completion.d/flare
    ///     flare completions zsh > ~/.zfunc/_flare
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<()> = match cli.command {
        Commands::Build { opts, clean, quiet } => commands::build::run(commands::build::BuildArgs {
            project_dir: opts.project_dir,
            sdk: opts.sdk,
            clean,
            verbose: opts.verbose,
            quiet,
            json: opts.json,
        }),
        Commands::CompileSwc { opts } => run_step(flare_build::planner::steps::COMPILE_SWC, opts),
        Commands::CompileSwf { opts } => run_step(flare_build::planner::steps::COMPILE_SWF, opts),
        Commands::Classes { opts } => {
            run_step(flare_build::planner::steps::ENUMERATE_CLASSES, opts)
        }
        Commands::ExtractSwf { opts } => run_step(flare_build::planner::steps::EXTRACT_SWF, opts),
        Commands::Clean { opts } => run_step(flare_build::planner::steps::CLEAN, opts),
        Commands::Ide {
            project_dir,
            workspace_root,
            json,
        } => commands::ide::run(commands::ide::IdeArgs {
            project_dir,
            workspace_root,
            json,
        }),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "flare", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(error) = result {
        eprintln!("error: {error:#}");
        std::process::exit(1);
    }
}

fn run_step(step: &str, opts: StepOpts) -> Result<()> {
    commands::step::run(
        step,
        commands::step::StepArgs {
            project_dir: opts.project_dir,
            sdk: opts.sdk,
            verbose: opts.verbose,
            json: opts.json,
        },
    )
}
