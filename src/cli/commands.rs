//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{ExportOutcome, FilterMode, Prepared};
use crate::application::{FilterSelector, StaticSelector};
use crate::cli::args::{Cli, Commands, ConfigCommands, SelectionArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{prune_owned, strip, DisplayLabels, FacetSet, TreeDisplay};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::{JsonExporter, ModelDocument, SkimFacetSelector};

/// Execute a parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Facets { model, by_kind }) => cmd_facets(model, *by_kind),
        Some(Commands::Tree {
            model,
            selection,
            facets,
        }) => cmd_tree(model, selection, *facets),
        Some(Commands::Export {
            model,
            output,
            selection,
            interactive,
        }) => cmd_export(model, output.as_deref(), selection, *interactive),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `tailor --help`".to_string(),
        )),
    }
}

/// Directory searched for the local `.tailor.toml`.
fn model_dir(model: &Path) -> &Path {
    model.parent().unwrap_or_else(|| Path::new(""))
}

/// Reject model paths that exist but are not files, such as directories.
fn check_model(fs: &dyn FileSystem, model: &Path) -> CliResult<()> {
    if fs.exists(model) && !fs.is_file(model) {
        return Err(CliError::InvalidArgs(format!(
            "model {} is not a file",
            model.display()
        )));
    }
    Ok(())
}

fn container_for(model: &Path) -> CliResult<ServiceContainer> {
    let settings = Settings::load(Some(model_dir(model)))?;
    Ok(ServiceContainer::new(settings))
}

fn filter_mode(by_kind: bool) -> FilterMode {
    if by_kind {
        FilterMode::Kinds
    } else {
        FilterMode::Facets
    }
}

/// Load the model and derive its annotated hierarchy and default filter.
fn prepare(
    container: &ServiceContainer,
    model: &Path,
    mode: FilterMode,
) -> CliResult<(ModelDocument, Prepared)> {
    check_model(container.fs.as_ref(), model)?;
    let doc = ModelDocument::load(container.fs.as_ref(), model)?;
    let prepared = container.export_service.prepare(
        doc.root_package(),
        &doc.source(),
        &doc.vocabulary,
        mode,
    )?;
    Ok((doc, prepared))
}

#[instrument(level = "debug")]
fn cmd_facets(model: &Path, by_kind: bool) -> CliResult<()> {
    let container = container_for(model)?;
    let (_, prepared) = prepare(&container, model, filter_mode(by_kind))?;

    if by_kind {
        output::info(&prepared.default.to_tree_string());
        return Ok(());
    }
    for facet in prepared.default.children() {
        output::header(facet.name());
        for value in facet.children() {
            output::detail(value.name());
        }
    }
    Ok(())
}

#[instrument(level = "debug")]
fn cmd_tree(model: &Path, selection: &SelectionArgs, show_facets: bool) -> CliResult<()> {
    let container = container_for(model)?;
    let (_, Prepared { annotated, default }) =
        prepare(&container, model, filter_mode(selection.by_kind))?;

    let selector = StaticSelector::new(selection.select.clone(), selection.deselect.clone());
    let filter = selector.narrow(&default)?;
    let pruned = prune_owned(annotated, &filter);
    debug!("cmd_tree: retained {} nodes", pruned.len());

    if show_facets {
        let labels = container.settings.display_labels();
        let rendered = pruned.map_labels(|node| {
            format!("{}  {}", node.entity, facet_summary(&node.facets, &labels))
        });
        output::info(&rendered.to_tree_string());
    } else {
        output::info(&strip(pruned).to_tree_string());
    }
    Ok(())
}

/// `[Facet=v1|v2, ...]` in facet name order.
fn facet_summary(facets: &FacetSet, labels: &DisplayLabels) -> String {
    let parts = facets.iter().map(|(facet, values)| {
        format!(
            "{}={}",
            facet,
            values.iter().map(|v| labels.display(v)).join("|")
        )
    });
    format!("[{}]", parts.format(", "))
}

/// Default export file: `<output_dir>/<root name>.json`.
fn default_output(settings: &Settings, root_name: &str) -> PathBuf {
    let stem: String = root_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let stem = if stem.trim().is_empty() {
        "export".to_string()
    } else {
        stem
    };
    settings.export.output_dir.join(format!("{stem}.json"))
}

#[instrument(level = "debug")]
fn cmd_export(
    model: &Path,
    output_path: Option<&Path>,
    selection: &SelectionArgs,
    interactive: bool,
) -> CliResult<()> {
    let container = container_for(model)?;
    check_model(container.fs.as_ref(), model)?;
    let doc = ModelDocument::load(container.fs.as_ref(), model)?;
    let root = doc.root_package();

    let path = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(&container.settings, &root.data.name));
    let exporter = JsonExporter::new(
        Arc::clone(&container.fs),
        path,
        container.settings.export.pretty,
    );

    let selector: Box<dyn FilterSelector> = if interactive {
        Box::new(SkimFacetSelector::new(Arc::clone(&container.selector)))
    } else {
        Box::new(StaticSelector::new(
            selection.select.clone(),
            selection.deselect.clone(),
        ))
    };

    let outcome = container.export_service.run(
        root,
        &doc.source(),
        &doc.vocabulary,
        filter_mode(selection.by_kind),
        selector.as_ref(),
        &exporter,
    )?;

    match outcome {
        ExportOutcome::Cancelled => output::warning("export cancelled, nothing written"),
        ExportOutcome::Exported { retained } => output::success(&format!(
            "exported {} entities to {}",
            retained,
            exporter.path().display()
        )),
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { model } => {
            let settings = Settings::load(model.as_deref().map(model_dir))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path { model } => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"<no home directory>"),
            }
            let dir = model.as_deref().map(model_dir).unwrap_or(Path::new("."));
            let local = local_config_path(dir);
            output::action("local", &local.display());
        }
    }
    Ok(())
}
