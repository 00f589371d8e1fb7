use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::report::render_batch;
use super::types::{Actions, App, DisplayOptions, RunSummary, Settings};
use crate::cli::Cli;
use crate::config::{AppConfig, MatchStyle};
use crate::error::GridError;
use crate::grid::{
    Dispatcher, FilterSet, ListingClient, MatchMode, MatchOptions, Namespace, Progress, Prompt,
    SortSpec, ToolRunner, TransferOptions, TreeWalker,
};
use crate::style::{Palette, Role};

fn expand_tilde(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

impl Settings {
    /// Validate the argument combination and freeze everything the run needs.
    pub fn from_cli(cli: &Cli, config: &AppConfig) -> Result<Self> {
        if cli.move_files && cli.directories.len() != 2 {
            return Err(GridError::usage(format!(
                "Cannot perform move of files between directories. {} specified",
                cli.directories.len()
            ))
            .into());
        }
        if cli.mkdir && cli.directories.is_empty() {
            return Err(GridError::usage("--mkdir needs at least one directory").into());
        }

        let user = config.resolve_user(cli.user.as_deref())?;
        let namespace = Namespace::new(&config.namespace, &user, config.schemes.clone());

        let mode = match (cli.wildcards, config.match_style) {
            (false, _) => MatchMode::Substring,
            (true, MatchStyle::Regex) => MatchMode::Regex,
            (true, MatchStyle::Glob) => MatchMode::Glob,
        };
        let options = MatchOptions {
            mode,
            case_insensitive: cli.case_insensitive,
        };
        let filters = FilterSet::new(
            &cli.search,
            &cli.reject,
            &cli.exclude,
            options,
            cli.dirs_only,
        )?;

        let sort = SortSpec {
            key: if cli.sort || cli.sort_key.is_some() {
                Some(cli.sort_key.unwrap_or_default())
            } else {
                None
            },
            descending: cli.reverse,
        };

        let display = DisplayOptions {
            bare: cli.bare,
            verbose: cli.verbose || cli.long,
            permissions: cli.permissions || cli.long,
            unique_runcards: cli.unique_runcards,
        };

        let local_output = match cli.output_directory.as_deref() {
            Some(raw) => expand_tilde(raw),
            None => std::env::current_dir().context("Cannot determine current directory")?,
        };

        Ok(Self {
            namespace,
            directories: cli.directories.clone(),
            filters,
            sort,
            recursive: cli.recursive,
            display,
            actions: Actions {
                copy: cli.copy,
                move_files: cli.move_files,
                delete: cli.delete,
                mkdir: cli.mkdir,
                upload: cli.copy_to_grid.clone(),
            },
            local_output,
            output_directory: cli.output_directory.clone(),
            threads: cli.threads,
            transfer: TransferOptions {
                timeout: cli.timeout,
                force: cli.force,
                parents: cli.parents,
                verbose: cli.tool_verbose,
            },
            reprint_threshold: config.reprint_threshold,
            palette: Palette::new(&config.colours, !cli.bare),
        })
    }
}

impl App {
    pub fn new(
        settings: Settings,
        runner: Box<dyn ToolRunner>,
        prompt: Box<dyn Prompt>,
        progress: Box<dyn Progress>,
    ) -> Self {
        Self {
            settings,
            runner,
            prompt,
            progress,
        }
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(
            self.runner.as_ref(),
            &self.settings.namespace,
            &self.settings.transfer,
            self.progress.as_ref(),
            self.settings.threads,
        )
    }

    /// Run the invocation, writing listings to `out` and per-directory
    /// errors to `err`.
    pub fn run(&self, out: &mut dyn Write, err: &mut dyn Write) -> Result<RunSummary> {
        let settings = &self.settings;
        let mut summary = RunSummary::default();

        if let Some(files) = &settings.actions.upload {
            summary.transfers = self
                .dispatcher()
                .upload(files, settings.output_directory.as_deref())?;
            return Ok(summary);
        }

        if settings.actions.mkdir {
            summary.transfers = self.dispatcher().mkdir(&settings.directories);
            return Ok(summary);
        }

        if settings.actions.copy {
            ensure_output_dir(&settings.local_output)?;
        }

        if settings.directories.is_empty() {
            self.walk("", settings.recursive, out, err, &mut summary)?;
        } else if !settings.actions.move_files {
            for dir in &settings.directories {
                self.walk(dir, settings.recursive, out, err, &mut summary)?;
            }
        } else {
            // Only the source of a move is listed, and only one level deep.
            self.walk(&settings.directories[0], false, out, err, &mut summary)?;
        }

        Ok(summary)
    }

    fn walk(
        &self,
        root: &str,
        recursive: bool,
        out: &mut dyn Write,
        err: &mut dyn Write,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let settings = &self.settings;
        let client = ListingClient::new(self.runner.as_ref(), &settings.namespace);
        let walker = TreeWalker::new(client, &settings.filters, settings.sort, root, recursive);
        let dispatcher = self.dispatcher();

        for batch in walker {
            summary.directories_listed += 1;
            if let Some(e) = &batch.error {
                summary.listing_errors += 1;
                let message = format!("ERROR: {}", e);
                writeln!(err, "{}", settings.palette.paint(&message, Role::Error))?;
            }
            for malformed in &batch.malformed {
                summary.malformed_lines += 1;
                writeln!(
                    err,
                    "{}",
                    settings.palette.paint(&format!("ERROR: {}", malformed), Role::Error)
                )?;
            }

            let lines = render_batch(
                &batch,
                &settings.display,
                &settings.palette,
                settings.reprint_threshold,
            );
            for line in lines {
                writeln!(out, "{}", line)?;
            }
            out.flush()?;

            if batch.is_empty() {
                continue;
            }
            if settings.actions.copy {
                summary.transfers.merge(dispatcher.copy(
                    &batch.matched,
                    &settings.filters,
                    &settings.local_output,
                ));
            }
            if settings.actions.move_files {
                summary
                    .transfers
                    .merge(dispatcher.move_files(&batch.matched, &settings.directories)?);
            }
            if settings.actions.delete {
                summary
                    .transfers
                    .merge(dispatcher.delete(&batch.matched, self.prompt.as_ref()));
            }
        }
        Ok(())
    }
}

fn ensure_output_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create output directory {:?}", path))?;
        tracing::info!("Created output directory {:?}", path);
    }
    Ok(())
}
