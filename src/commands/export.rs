use crate::api::Mode;
use crate::args::ExportArgs;
use crate::commands::{open, Out};
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::{Category, Entry};
use crate::{utils, Config, Result};
use anyhow::anyhow;

const HEADERS: [&str; 6] = ["id", "category", "date", "subject", "value", "notes"];

/// Writes entries to a CSV file at `args.path`, one row per entry, categories in their usual order
/// and entries most recent first within each. Returns the number of rows written.
pub async fn export(config: Config, mode: Mode, args: ExportArgs) -> Result<Out<usize>> {
    let repo = open(&config, mode).await?;
    let categories = match args.category {
        Some(category) => vec![category],
        None => Category::ALL.to_vec(),
    };
    let entries: Vec<Entry> = categories.into_iter().flat_map(|c| repo.list(c)).collect();

    let csv = to_csv(&entries).pub_result(ErrorType::Io)?;
    utils::write(&args.path, csv).await.pub_result(ErrorType::Io)?;
    Ok(Out::new(
        format!("Wrote {} entries to {}", entries.len(), args.path.display()),
        entries.len(),
    ))
}

fn to_csv(entries: &[Entry]) -> Res<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;
    for entry in entries {
        writer.write_record([
            entry.id().map(|id| id.as_str()).unwrap_or_default(),
            entry.category().slug().as_str(),
            entry.date().to_string().as_str(),
            entry.subject(),
            entry.value().normalize().to_string().as_str(),
            entry.notes(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| anyhow!("Unable to finish writing CSV: {}", e.error()))
}
