use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_relver::cli::{
    open_workspace, ChangeArgs, ChangelogArgs, ChangelogOutcome, VersionArgs,
};
use git_relver::domain::IncrementLevel;
use git_relver::git::Repository;
use git_relver::{ui, RelverError};

#[derive(Parser)]
#[command(
    name = "git-relver",
    version,
    about = "Bump manifest versions, tag releases and write changelogs"
)]
struct Cli {
    #[arg(long, global = true, help = "Show debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bump project versions, commit and tag the release
    Version {
        #[arg(long, help = "Where to look for projects when none are configured")]
        project_path: Option<PathBuf>,

        #[arg(long, help = "Increment type: None, Patch, Minor or Major")]
        increment_type: Option<IncrementLevel>,

        #[arg(long, help = "Allow projects without a version field")]
        skip_version_tag_check: bool,

        #[arg(long, help = "Write versions without committing (implies --no-tag)")]
        no_commit: bool,

        #[arg(long, help = "Commit without creating a release tag")]
        no_tag: bool,

        #[arg(long, help = "Set every project to this exact version")]
        use_version: Option<String>,
    },

    /// Generate the changelog for the latest release
    Changelog {
        #[arg(long, help = "Where to look for projects when none are configured")]
        project_path: Option<PathBuf>,

        #[arg(long, help = "Print the changelog instead of writing CHANGELOG.md")]
        output_to_console: bool,

        #[arg(long, help = "Print the title of the latest release and exit")]
        release_name: bool,

        #[arg(long, help = "Print the tag name of the latest release and exit")]
        tag_name: bool,

        #[arg(long, help = "Write the changelog without committing")]
        no_commit: bool,
    },

    /// Record a change file for the next release
    Change {
        #[arg(long, help = "Where to look for projects when none are configured")]
        project_path: Option<PathBuf>,

        #[arg(long, help = "Project the change belongs to")]
        project_name: Option<String>,

        #[arg(long, help = "Increment type: None, Patch, Minor or Major")]
        increment_type: Option<IncrementLevel>,

        #[arg(short, long, help = "Changelog message")]
        message: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<RelverError>() {
            Some(relver) if relver.is_user_error() => {
                ui::display_error(&relver.to_string());
                ExitCode::from(1)
            }
            _ => {
                ui::display_internal_error(&format!("{:?}", err));
                ExitCode::from(2)
            }
        },
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve a user-supplied path against the current directory
fn absolute(path: Option<PathBuf>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) if path.is_relative() => {
            let cwd = std::env::current_dir().context("Failed to read the current directory")?;
            Ok(Some(cwd.join(path)))
        }
        other => Ok(other),
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Version {
            project_path,
            increment_type,
            skip_version_tag_check,
            no_commit,
            no_tag,
            use_version,
        } => {
            let project_path = absolute(project_path)?;
            let mut orchestrator = open_workspace(project_path.as_deref())?;
            let outcome = orchestrator.run_version(&VersionArgs {
                project_path,
                increment_type,
                skip_version_check: skip_version_tag_check,
                no_commit,
                no_tag,
                use_version,
            })?;

            for warning in &outcome.warnings {
                ui::display_boundary_warning(warning);
            }
            if outcome.plan.is_empty() {
                return Ok(());
            }

            ui::display_version_plan(&outcome.plan, orchestrator.repository().root());
            match (&outcome.commit, &outcome.tag) {
                (Some(_), Some(tag)) => ui::display_success(&format!("Released {}", tag)),
                (Some(_), None) => ui::display_success("Committed the new versions"),
                _ => ui::display_status("Versions written and staged; nothing was committed"),
            }
        }
        Command::Changelog {
            project_path,
            output_to_console,
            release_name,
            tag_name,
            no_commit,
        } => {
            let project_path = absolute(project_path)?;
            let mut orchestrator = open_workspace(project_path.as_deref())?;
            let outcome = orchestrator.run_changelog(&ChangelogArgs {
                project_path,
                output_to_console,
                release_name,
                tag_name,
                no_commit,
            })?;

            match outcome {
                ChangelogOutcome::ReleaseName(name) | ChangelogOutcome::TagName(name) => {
                    println!("{}", name);
                }
                ChangelogOutcome::Rendered { markdown, warnings } => {
                    for warning in &warnings {
                        ui::display_boundary_warning(warning);
                    }
                    ui::display_changelog(&markdown);
                }
                ChangelogOutcome::Persisted {
                    path,
                    commit,
                    warnings,
                    ..
                } => {
                    for warning in &warnings {
                        ui::display_boundary_warning(warning);
                    }
                    if commit.is_some() {
                        ui::display_success(&format!("Updated and committed {}", path.display()));
                    } else {
                        ui::display_success(&format!("Updated {}", path.display()));
                    }
                }
            }
        }
        Command::Change {
            project_path,
            project_name,
            increment_type,
            message,
        } => {
            let project_path = absolute(project_path)?;
            let mut orchestrator = open_workspace(project_path.as_deref())?;
            let outcome = orchestrator.run_change(&ChangeArgs {
                project_path,
                project_name,
                increment_type,
                message,
            })?;

            ui::display_success(&format!("Created {}", outcome.path.display()));
        }
    }

    Ok(())
}
