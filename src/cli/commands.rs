//! Command dispatch: one handler per subcommand

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::NewFilter;
use crate::cli::args::{ClmCommand, Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::{output, render, shell};
use crate::config::{global_config_path, Settings};
use crate::domain::{StagingDirection, StagingStep};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::TerminalPrompt;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        None => print_help(),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(Commands::Config { command }) => run_config(cli, command),
        Some(Commands::Shell) => {
            let services = connect(cli)?;
            shell::run(&services)
        }
        Some(Commands::Clm(cmd)) => {
            let services = connect(cli)?;
            let quiet = services.settings.quiet;
            let stdout = io::stdout();
            run_clm(cmd, &services, quiet, &mut stdout.lock())
        }
    }
}

fn print_help() -> CliResult<()> {
    Cli::command()
        .print_help()
        .map_err(|e| InfraError::io("print help", e).into())
}

/// Settings from files and environment with command-line flags on top.
pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        settings.server = server.clone();
    }
    if let Some(username) = &cli.username {
        settings.username = username.clone();
    }
    if let Some(password) = &cli.password {
        settings.password = Some(password.clone());
    }
    if cli.nossl {
        settings.nossl = true;
    }
    if cli.quiet {
        settings.quiet = true;
    }
    Ok(settings)
}

fn connect(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    Ok(ServiceContainer::connect(settings, &TerminalPrompt)?)
}

// ============================================================
// config
// ============================================================

fn config_path(cli: &Cli) -> CliResult<PathBuf> {
    cli.config
        .clone()
        .or_else(global_config_path)
        .ok_or_else(|| CliError::InvalidArgs("cannot determine config directory".into()))
}

fn run_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            println!("{}", settings.to_toml()?);
        }
        ConfigCommands::Init => {
            let path = config_path(cli)?;
            init_config(&path)?;
            println!("Created {}", path.display());
        }
        ConfigCommands::Path => {
            let path = config_path(cli)?;
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} (not found)", path.display());
            }
        }
    }
    Ok(())
}

/// Write the commented template; never overwrites.
pub fn init_config(path: &Path) -> CliResult<()> {
    if path.exists() {
        return Err(CliError::InvalidArgs(format!(
            "config file already exists: {}",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}

// ============================================================
// lifecycle commands
// ============================================================

/// Run one lifecycle command against a connected session, writing to `out`.
#[instrument(skip(services, out))]
pub fn run_clm(
    cmd: &ClmCommand,
    services: &ServiceContainer,
    quiet: bool,
    out: &mut dyn Write,
) -> CliResult<()> {
    let content = services.content();
    let mut lines: Vec<String> = Vec::new();

    match cmd {
        ClmCommand::ProjectList => {
            lines.extend(content.list_projects()?.into_iter().map(|p| p.label));
        }
        ClmCommand::ProjectListEnv { project } => {
            lines.extend(
                content
                    .list_environments(project)?
                    .into_iter()
                    .map(|e| e.label),
            );
        }
        ClmCommand::ProjectListSrc { project } => {
            lines.extend(
                content
                    .list_sources(project)?
                    .into_iter()
                    .map(|s| s.channel_label),
            );
        }
        ClmCommand::ProjectListFilter { project } => {
            lines.extend(
                content
                    .list_project_filters(project)?
                    .into_iter()
                    .map(|f| f.filter.name),
            );
        }
        ClmCommand::FilterListCriterias => {
            lines = render::criteria(&content.filter_criteria()?);
        }
        ClmCommand::ProjectDetails { project } => {
            lines = render::project_details(&content.project_details(project)?);
        }
        ClmCommand::ProjectBuild { project } => {
            emit(out, &format!("Building project {project}"))?;
            content.build(project)?;
        }
        ClmCommand::ProjectPromote {
            project,
            environment,
        } => {
            emit(
                out,
                &format!("Promoting project {project} environment {environment}"),
            )?;
            content.promote(project, environment)?;
        }
        ClmCommand::ProjectCreate {
            label,
            name,
            description,
        } => {
            emit(out, &format!("Creating project: {label}"))?;
            content.create_project(label, name, description.as_deref().unwrap_or_default())?;
        }
        ClmCommand::ProjectAttacheSource {
            project,
            source,
            source_type,
        } => {
            emit(out, &format!("Attaching source(s) to project {project}:"))?;
            let mut write_err = None;
            content.attach_sources(project, source, source_type, |s| {
                if let Err(e) = emit(out, &format!("- {s}")) {
                    write_err.get_or_insert(e);
                }
            })?;
            if let Some(e) = write_err {
                return Err(e);
            }
        }
        ClmCommand::ProjectDetacheSource {
            project,
            source,
            source_type,
        } => {
            emit(out, &format!("Detaching source(s) from project {project}:"))?;
            let mut write_err = None;
            content.detach_sources(project, source, source_type, |s| {
                if let Err(e) = emit(out, &format!("- {s}")) {
                    write_err.get_or_insert(e);
                }
            })?;
            if let Some(e) = write_err {
                return Err(e);
            }
        }
        ClmCommand::ProjectAddEnv {
            project,
            label,
            name,
            description,
        } => {
            emit(
                out,
                &format!("Creating Environment {label} in project {project}:"),
            )?;
            let predecessor = content.add_environment(project, label, name, description)?;
            debug!("appended {} after {:?}", label, predecessor);
        }
        ClmCommand::ProjectDelEnv {
            project,
            environment,
        } => {
            emit(
                out,
                &format!("Remove Environment {environment} from project {project}:"),
            )?;
            content.remove_environment(project, environment)?;
        }
        ClmCommand::ProjectStagingFull { reverse, project } => {
            let direction = if *reverse {
                emit(out, &output::header_text("Reverse Staging"))?;
                StagingDirection::Reverse
            } else {
                emit(out, &output::header_text("Forward Staging"))?;
                StagingDirection::Forward
            };
            let mut write_err = None;
            services.staging().run(project, direction, |step| {
                let line = match step {
                    StagingStep::Build => "- building".to_string(),
                    StagingStep::Promote(env) => format!("- promoting {env}"),
                };
                if let Err(e) = emit(out, &line) {
                    write_err.get_or_insert(e);
                }
            })?;
            if let Some(e) = write_err {
                return Err(e);
            }
        }
        ClmCommand::FilterList => {
            lines = render::filter_list(&content.list_filters()?);
        }
        ClmCommand::FilterCreate {
            name,
            rule,
            entity_type,
            field,
            matcher,
            value,
        } => {
            emit(out, &format!("Creating filter {name}"))?;
            content.create_filter(&NewFilter {
                name: name.clone(),
                rule: rule.clone(),
                entity_type: entity_type.clone(),
                field: field.clone(),
                matcher: matcher.clone(),
                value: value.clone(),
            })?;
        }
        ClmCommand::ProjectAttacheFilter { project, filter } => {
            let id = content.attach_filter(project, filter)?;
            lines.push(format!("Attache filter {filter}({id}) to project {project}"));
        }
        ClmCommand::ProjectDetacheFilter { project, filter } => {
            let id = content.detach_filter(project, filter)?;
            lines.push(format!("Detach filter {filter}({id}) from project {project}"));
        }
        ClmCommand::FilterCreateAppstream {
            project,
            channel,
            prefix,
        } => {
            emit(
                out,
                &format!("Creating AppStream filters with prefix {prefix}"),
            )?;
            content.create_appstream_filters(project, channel, prefix)?;
        }
        ClmCommand::ProjectStatus { project } => {
            lines = render::environment_status(&content.environment_status(project)?, quiet);
        }
        ClmCommand::EnvDiff {
            project,
            env1,
            env2,
        } => {
            let mut write_err = None;
            let diff = content.env_diff(project, env1, env2, |src, dst| {
                if let Err(e) = emit(out, &format!("Analyzing differences : {src} -> {dst}")) {
                    write_err.get_or_insert(e);
                }
            })?;
            if let Some(e) = write_err {
                return Err(e);
            }
            lines = render::env_diff(&diff)
                .iter()
                .map(|l| output::diff_text(l))
                .collect();
        }
    }

    for line in &lines {
        emit(out, line)?;
    }
    Ok(())
}

fn emit(out: &mut dyn Write, line: &str) -> CliResult<()> {
    writeln!(out, "{line}").map_err(|e| InfraError::io("write output", e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_missing_file_when_init_config_then_template_written() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sub").join("clmsh.toml");

        init_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[staging]"));
    }

    #[test]
    fn given_existing_file_when_init_config_then_refuses() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clmsh.toml");
        std::fs::write(&path, "server = \"x\"\n").unwrap();

        let err = init_config(&path).unwrap_err();

        assert!(matches!(err, CliError::InvalidArgs(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "server = \"x\"\n");
    }
}
