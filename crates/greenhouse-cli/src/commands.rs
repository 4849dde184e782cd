use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use greenhouse_model::DocumentId;
use greenhouse_query::{Pagination, QueryFilter, query};
use greenhouse_store::{DocumentStore, FileStore, PersistenceError};
use greenhouse_validate::Pipeline;
use serde::Serialize;
use tracing::info_span;

use greenhouse_cli::summary::{
    describe_metadata, describe_outcome, describe_page, diagnostics_table, rows_table,
};
use greenhouse_cli::{IngestOutcome, combined_exit_code, ingest_with};

use crate::cli::{IngestArgs, QueryArgs, ShowArgs, ValidateArgs};

#[derive(Serialize)]
struct FileOutcome<'a> {
    file: &'a Path,
    #[serde(flatten)]
    outcome: &'a IngestOutcome,
}

/// Ingest every file; returns the process exit code.
pub fn run_ingest(data_dir: &Path, args: &IngestArgs) -> Result<i32> {
    let store = open_store(data_dir)?;
    let pipeline = Pipeline::new();

    let mut outcomes: Vec<(&PathBuf, IngestOutcome)> = Vec::with_capacity(args.files.len());
    for file in &args.files {
        let span = info_span!("ingest", file = %file.display());
        let _guard = span.enter();
        let bytes = read_input(file)?;
        let outcome = ingest_with(&pipeline, &store, &bytes).map_err(persistence_context)?;
        outcomes.push((file, outcome));
    }

    if args.json {
        let report: Vec<FileOutcome<'_>> = outcomes
            .iter()
            .map(|(file, outcome)| FileOutcome {
                file: file.as_path(),
                outcome,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (file, outcome) in &outcomes {
            println!("{}: {}", file.display(), describe_outcome(outcome));
        }
    }
    Ok(combined_exit_code(outcomes.iter().map(|(_, outcome)| outcome)))
}

/// Validate one file without storing it; returns the process exit code.
pub fn run_validate(args: &ValidateArgs) -> Result<i32> {
    let bytes = read_input(&args.file)?;
    let report = Pipeline::new().run(&bytes);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if let Some(metadata) = &report.metadata {
            println!("{}", describe_metadata(metadata));
        }
        if report.is_valid() {
            println!("{}: valid", args.file.display());
        } else {
            println!(
                "{}: {} finding(s)",
                args.file.display(),
                report.diagnostics.len()
            );
            println!("{}", diagnostics_table(&report.diagnostics));
        }
    }
    Ok(if report.is_valid() { 0 } else { 1 })
}

pub fn run_show(data_dir: &Path, args: &ShowArgs) -> Result<()> {
    let id = DocumentId::new(args.id.as_str()).context("invalid document id")?;
    let store = open_store(data_dir)?;

    if args.metadata {
        let Some(record) = store.load_metadata(&id).map_err(persistence_context)? else {
            bail!("document {id} not found");
        };
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let Some(raw) = store.load_raw(&id).map_err(persistence_context)? else {
            bail!("document {id} not found");
        };
        let mut stdout = io::stdout().lock();
        stdout.write_all(&raw).context("write document")?;
        stdout.flush().context("write document")?;
    }
    Ok(())
}

pub fn run_query(data_dir: &Path, args: &QueryArgs) -> Result<()> {
    let mut filter = QueryFilter::new();
    if let Some(kind) = &args.kind {
        filter = filter.with_kind(kind.as_str());
    }
    if let Some(status) = args.status {
        filter = filter.with_status(status);
    }
    if let Some(start) = &args.start {
        filter = filter.with_start(start)?;
    }
    if let Some(end) = &args.end {
        filter = filter.with_end(end)?;
    }
    let pagination = Pagination::new(args.page, args.per_page)?;

    let store = open_store(data_dir)?;
    let records = store.list_all_metadata().map_err(persistence_context)?;
    let page = query(&records, &filter, pagination);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        if !page.items.is_empty() {
            println!("{}", rows_table(&page));
        }
        println!("{}", describe_page(&page));
    }
    Ok(())
}

fn open_store(data_dir: &Path) -> Result<FileStore> {
    FileStore::open(data_dir).map_err(persistence_context)
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("read {}", path.display()))
}

/// Fold the user-facing message and hint into the error chain.
fn persistence_context(error: PersistenceError) -> anyhow::Error {
    let mut message = error.user_message();
    if let Some(suggestion) = error.suggestion() {
        message.push_str(&format!(" ({suggestion})"));
    }
    anyhow::Error::new(error).context(message)
}
