use crate::api::Mode;
use crate::args::AddArgs;
use crate::commands::{format_value, open, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::EntryForm;
use crate::{Config, Result};
use serde_json::Value;

/// Validates `key=value` fields as a form of `args.category` and submits the entry.
///
/// # Errors
///
/// - A `Validation` error listing every bad field. Nothing is submitted.
/// - A `Sync` error if the backend does not acknowledge the entry. Run the command again.
pub async fn add(config: Config, mode: Mode, args: AddArgs) -> Result<Out<Value>> {
    let form = EntryForm::from_pairs(args.category, &args.fields)?;
    let mut repo = open(&config, mode).await?;
    let entry = repo.add_form(&form).await?;
    let message = format!(
        "Added {} entry {} for {} ({})",
        entry.category().label(),
        entry.id().map(|id| id.as_str()).unwrap_or_default(),
        entry.subject(),
        format_value(entry.category().unit(), entry.value())
    );
    Ok(Out::new(message, entry.to_json().pub_result(ErrorType::Sync)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn args(category: Category, fields: &[&str]) -> AddArgs {
        AddArgs {
            category,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_add_bus_pass() {
        let out = add(
            crate::test::config(),
            Mode::Test,
            args(
                Category::BusPasses,
                &[
                    "date=2026-05-01",
                    "clientName=Lee Park",
                    "passType=7-Day Pass",
                    "cost=$22.50",
                ],
            ),
        )
        .await
        .unwrap();
        let json = out.structure().unwrap();
        assert_eq!(json["passType"], "7-Day Pass");
        assert_eq!(json["quantity"], 1);
        assert!(json["id"].is_string());
        assert!(out.message().contains("$22.50"));
    }

    #[tokio::test]
    async fn test_add_reports_validation_errors() {
        let err = add(
            crate::test::config(),
            Mode::Test,
            args(Category::Water, &["date=2026-13-01", "amount=-3"]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        let errors = err.validation_errors().unwrap();
        assert!(errors.get("date").is_some());
        assert!(errors.get("amount").is_some());
        assert!(errors.get("clientName").is_some());
        assert!(errors.get("provider").is_some());
    }
}
