//! Command dispatch: settings, service wiring and output

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::{Assignment, Document};
use crate::cli::args::{Cli, Commands, ConfigCommands, OutputArgs};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, project_config_path, Settings};
use crate::domain::{ConflictPolicy, Fill, PackOptions, Value};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `pathtree --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            return Ok(());
        }
        Commands::Config { command } => return _config(cli, command),
        _ => {}
    }

    let container = ServiceContainer::new(load_settings(cli)?);
    match command {
        Commands::Unpack { file, limit, out } => _unpack(&container, file, *limit, out),
        Commands::Pack {
            file,
            keys,
            limit,
            order,
            base,
            fill,
            fill_key,
            fill_each,
            out,
        } => {
            let fill = fill_from_args(fill.as_deref(), *fill_key, fill_each);
            let options = PackOptions {
                delimiter: container.settings.delimiter.clone(),
                limit: *limit,
                order: order.unwrap_or(container.settings.order),
                base: base.clone(),
                fill,
            };
            _pack(&container, file.as_deref(), keys, &options, out)
        }
        Commands::Merge {
            base,
            incoming,
            policy,
            overrides,
            out,
        } => _merge(
            &container,
            base,
            incoming,
            policy.unwrap_or(container.settings.policy),
            overrides,
            out,
        ),
        Commands::Get { file, key } => _get(&container, file, key),
        Commands::Show { file } => _show(&container, file),
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}

fn project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("get current directory", e))),
    }
}

/// Load layered settings and apply the global `--delimiter` flag.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = project_dir(cli)?;
    let mut settings = Settings::load(Some(&dir))?;
    if let Some(delimiter) = &cli.delimiter {
        if delimiter.is_empty() {
            return Err(CliError::InvalidArgs(
                "--delimiter must not be empty".to_string(),
            ));
        }
        settings.delimiter = delimiter.clone();
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn fill_from_args(fill: Option<&str>, fill_key: bool, fill_each: &[String]) -> Fill {
    if fill_key {
        Fill::Key
    } else if !fill_each.is_empty() {
        Fill::Each(fill_each.iter().map(|raw| Value::infer(raw)).collect())
    } else {
        fill.map(|raw| Fill::Value(Value::infer(raw)))
            .unwrap_or_default()
    }
}

/// Write `document` to `--output`, or render it to stdout.
fn emit(container: &ServiceContainer, document: Document, out: &OutputArgs) -> CliResult<()> {
    match &out.output {
        Some(path) => {
            container.documents.save(&document, path)?;
            output::action("wrote", &path.display());
        }
        None => {
            let format = out.format.unwrap_or(container.settings.format);
            let text = container
                .documents
                .render(&Value::Mapping(document.tree), format)?;
            print!("{text}");
        }
    }
    Ok(())
}

#[instrument(skip(container, out))]
fn _unpack(
    container: &ServiceContainer,
    file: &Path,
    limit: Option<usize>,
    out: &OutputArgs,
) -> CliResult<()> {
    let entries = container
        .trees
        .flatten(file, &container.settings.delimiter, limit)?;
    emit(container, Document::new(entries), out)
}

#[instrument(skip(container, options, out))]
fn _pack(
    container: &ServiceContainer,
    file: Option<&Path>,
    keys: &[String],
    options: &PackOptions,
    out: &OutputArgs,
) -> CliResult<()> {
    let document = match file {
        Some(path) => container.trees.pack_file(path, options)?,
        None => Document::new(container.trees.pack_keys(keys, options)?),
    };
    emit(container, document, out)
}

#[instrument(skip(container, overrides, out))]
fn _merge(
    container: &ServiceContainer,
    base: &Path,
    incoming: &[PathBuf],
    policy: ConflictPolicy,
    overrides: &[Assignment],
    out: &OutputArgs,
) -> CliResult<()> {
    let outcome = container.trees.merge_files(
        base,
        incoming,
        policy,
        overrides,
        &container.settings.delimiter,
    )?;
    for conflict in &outcome.conflicts {
        output::log(&["conflict:", conflict.as_str()], false);
    }
    emit(container, outcome.document, out)
}

#[instrument(skip(container))]
fn _get(container: &ServiceContainer, file: &Path, key: &str) -> CliResult<()> {
    match container
        .trees
        .lookup(file, key, &container.settings.delimiter)?
    {
        Some(value) => {
            output::info(&value);
            Ok(())
        }
        None => Err(CliError::InvalidArgs(format!(
            "key not found in {}: {key}",
            file.display()
        ))),
    }
}

#[instrument(skip(container))]
fn _show(container: &ServiceContainer, file: &Path) -> CliResult<()> {
    let tree = container.trees.outline(file)?;
    output::info(&tree);
    Ok(())
}

fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            print!("{}", settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &describe_path(&path)),
                None => output::action("global", "(no config directory)"),
            }
            let local = project_config_path(&project_dir(cli)?);
            output::action("project", &describe_path(&local));
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                project_config_path(&project_dir(cli)?)
            };
            if path.exists() {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            let container = ServiceContainer::new(Settings::default());
            container
                .fs
                .ensure_parent(&path)
                .map_err(|e| InfraError::io(format!("create directory for {}", path.display()), e))?;
            container
                .fs
                .write(&path, &Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("created", &path.display());
            Ok(())
        }
    }
}

fn describe_path(path: &Path) -> String {
    if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found)", path.display())
    }
}
