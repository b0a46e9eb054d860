use crate::api::Mode;
use crate::args::ListArgs;
use crate::commands::{format_value, open, Out};
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use serde_json::Value;
use std::fmt::Write;

/// Lists the entries of one category, most recent first, as JSON objects in the backend's shape.
pub async fn list(config: Config, mode: Mode, args: ListArgs) -> Result<Out<Vec<Value>>> {
    let category = args.category;
    let repo = open(&config, mode).await?;
    let mut entries = repo.list(category);
    let total = entries.len();
    if let Some(limit) = args.limit {
        entries.truncate(limit);
    }

    let mut message = format!(
        "{} entries in {} (showing {})\n",
        total,
        category.label(),
        entries.len()
    );
    let mut rows = Vec::with_capacity(entries.len());
    for entry in &entries {
        let _ = writeln!(
            message,
            "  {}  {:<24} {:>12}  {}",
            entry.date(),
            entry.subject(),
            format_value(category.unit(), entry.value()),
            entry.kind_label()
        );
        rows.push(entry.to_json().pub_result(ErrorType::Sync)?);
    }
    Ok(Out::new(message, rows))
}
