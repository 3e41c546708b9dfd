//! Implementation of the QMS CLI commands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::context::QmsContext;
use crate::repository::LookupTable;
use crate::types::config::{Config, CONFIG_FILE};
use crate::types::evaluation::EvaluationRow;
use crate::{QmsError, QmsResult};

/// Opens the configured backend.
#[cfg(feature = "sqlite")]
fn open_context(config: &Config) -> QmsResult<QmsContext> {
    QmsContext::open(config)
}

#[cfg(not(feature = "sqlite"))]
fn open_context(config: &Config) -> QmsResult<QmsContext> {
    tracing::warn!("Built without SQLite support, using an empty in-memory backend");
    Ok(QmsContext::in_memory(config))
}

/// Initializes configuration in the specified directory.
pub async fn init(path: Option<PathBuf>) -> QmsResult<()> {
    let target_dir = path.unwrap_or_else(|| PathBuf::from("."));

    if !target_dir.exists() {
        std::fs::create_dir_all(&target_dir)?;
        tracing::info!("Directory created: {}", target_dir.display());
    }

    let config_path = target_dir.join(CONFIG_FILE);

    if config_path.exists() {
        println!("Configuration already exists at: {}", config_path.display());
        return Ok(());
    }

    let config = Config::default_config();
    config.save(&config_path)?;

    println!("QMS initialized successfully!");
    println!("Configuration created at: {}", config_path.display());
    println!("Database: {}", config.backend.db_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Import evaluation rows: qms import rows.json");
    println!("  2. List sheet summaries:   qms summary");

    Ok(())
}

/// Imports evaluation rows from a JSON array in one request.
pub async fn import(input: &Path, config: &Config) -> QmsResult<()> {
    if !input.exists() {
        return Err(QmsError::NotFound(input.display().to_string()));
    }

    let content = std::fs::read_to_string(input)?;
    let rows: Vec<EvaluationRow> = serde_json::from_str(&content)?;

    let without_sheet = rows.iter().filter(|r| r.grouping_key().is_none()).count();
    if without_sheet > 0 {
        println!(
            "Warning: {} rows have no sheet id and will not appear in summaries.",
            without_sheet
        );
    }

    let ctx = open_context(config)?;

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message(format!("Importing {} rows...", rows.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = ctx.assessments.insert_rows(&rows).await;
    spinner.finish_and_clear();

    let stored = result?;
    println!("Imported {} evaluation rows.", stored.len());

    Ok(())
}

/// Prints sheet summaries, newest first.
pub async fn summary(json: bool, config: &Config) -> QmsResult<()> {
    let ctx = open_context(config)?;
    let summaries = ctx.assessments.list_summaries().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No assessment sheets yet.");
        return Ok(());
    }

    println!(
        "{:<20} {:<12} {:<20} {:<20} {:>9} {:>7}",
        "Sheet", "Date", "Evaluator", "Unit", "Passed", "Score"
    );
    for s in &summaries {
        println!(
            "{:<20} {:<12} {:<20} {:<20} {:>9} {:>7.2}",
            s.sheet_id,
            s.evaluated_at.map(|d| d.to_string()).unwrap_or_default(),
            s.evaluated_by.as_deref().unwrap_or("-"),
            s.evaluated_unit.as_deref().unwrap_or("-"),
            format!("{}/{}", s.passed_criteria, s.total_criteria),
            s.score
        );
    }

    Ok(())
}

/// Prints one sheet's score tree.
pub async fn sheet(id: &str, config: &Config) -> QmsResult<()> {
    let ctx = open_context(config)?;
    let (rows, breakdown) = ctx.assessments.sheet_breakdown(id).await?;

    if rows.is_empty() {
        return Err(QmsError::NotFound(format!("sheet {}", id)));
    }

    let passed = rows.iter().filter(|r| r.passed).count();
    println!("Sheet {} - {} rows, {} passed", id, rows.len(), passed);
    println!("Score: {:.2}\n", breakdown.score);

    for section in &breakdown.sections {
        println!("{} ({:.2})", section.name, section.score);
        for chapter in &section.chapters {
            println!("  {} ({:.2})", chapter.name, chapter.score);
            for criterion in &chapter.criteria {
                println!(
                    "    {:<10} {} ({} rows)",
                    criterion.code, criterion.level, criterion.rows
                );
            }
        }
    }

    Ok(())
}

/// Deletes a sheet after confirmation.
pub async fn delete_sheet(id: &str, yes: bool, config: &Config) -> QmsResult<()> {
    if !yes {
        let confirmed = dialoguer::Confirm::new()
            .with_prompt(format!("Delete every row of sheet '{}'?", id))
            .default(false)
            .interact()
            .map_err(|e| QmsError::Prompt(e.to_string()))?;

        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let ctx = open_context(config)?;
    let deleted = ctx.assessments.delete_sheet(id).await?;

    if deleted == 0 {
        println!("Sheet '{}' has no rows.", id);
    } else {
        println!("Deleted {} rows of sheet '{}'.", deleted, id);
    }

    Ok(())
}

/// Prints lookup table sizes.
pub async fn lookups(config: &Config) -> QmsResult<()> {
    let ctx = open_context(config)?;

    println!("Lookup tables ({}):", ctx.backend_name());
    for table in LookupTable::ALL {
        let items = ctx.lookups.get(table).await?;
        println!("  {:<18} {} items", table.to_string(), items.len());
    }

    Ok(())
}

/// Prints version.
pub fn version() {
    println!("qms {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Hospital quality management toolkit");
}
