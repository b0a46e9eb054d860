//! Raw form input and its validation into an `Entry`.
//!
//! A form submits strings. Every field is checked before anything reaches the repository and all
//! failures are reported together, keyed by the same wire name the form uses for the input.

use crate::error::ValidationErrors;
use crate::model::entry::{
    BusPass, Details, Diapers, DonationGiven, DonationReceived, Rent, Rideshare, Utility,
};
use crate::model::{Amount, Category, Choice, Entry};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::str::FromStr;

/// The raw string fields submitted for one category's entry form.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EntryForm {
    category: Category,
    fields: BTreeMap<String, String>,
}

impl EntryForm {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            fields: BTreeMap::new(),
        }
    }

    /// Builds a form from `key=value` pairs, as given on the command line.
    pub fn from_pairs<I, S>(category: Category, pairs: I) -> Result<Self, ValidationErrors>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut form = Self::new(category);
        let mut errors = ValidationErrors::new();
        for pair in pairs {
            let pair = pair.as_ref();
            match pair.split_once('=') {
                Some((key, value)) => form.set(key.trim(), value),
                None => errors.push(pair, "expected a key=value pair"),
            }
        }
        errors.into_result().map(|_| form)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Sets the raw value of `field`, replacing any previous value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let _ = self.fields.insert(field.into(), value.into());
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Validates every field and, if all pass, builds the entry.
    pub fn validate(&self) -> Result<Entry, ValidationErrors> {
        let mut v = Validator {
            fields: &self.fields,
            errors: ValidationErrors::new(),
        };
        let date = v.date("date");
        let details = v.details(self.category);
        let notes = v.optional_text("notes");
        v.errors.into_result()?;

        // A parser only returns None after pushing an error.
        match (date, details) {
            (Some(date), Some(details)) => Ok(Entry::new(date, details).with_notes(notes)),
            _ => {
                let mut errors = ValidationErrors::new();
                errors.push("form", "incomplete");
                Err(errors)
            }
        }
    }
}

/// Collects errors while pulling typed values out of the raw fields. Parsers return `Option` so
/// a failed field can be recorded without stopping the others.
struct Validator<'a> {
    fields: &'a BTreeMap<String, String>,
    errors: ValidationErrors,
}

impl Validator<'_> {
    /// Parses every field of `category` before combining them, so that one bad field does not
    /// hide errors in the fields after it.
    fn details(&mut self, category: Category) -> Option<Details> {
        match category {
            Category::Diapers => {
                let client_name = self.text("clientName");
                let diapers_qty = self.quantity("diapersQty");
                let packs = self.optional_quantity("packs");
                let diaper_size = self.choice("diaperSize");
                Some(Details::Diapers(Diapers {
                    client_name: client_name?,
                    diapers_qty: diapers_qty?,
                    packs: packs?,
                    diaper_size: diaper_size?,
                }))
            }
            Category::DonationsGiven => {
                let client_name = self.text("clientName");
                let item_type = self.choice("itemType");
                let quantity = self.quantity("quantity");
                Some(Details::DonationGiven(DonationGiven {
                    client_name: client_name?,
                    item_type: item_type?,
                    quantity: quantity?,
                }))
            }
            Category::DonationsReceived => {
                let donor_name = self.text("donorName");
                let item_type = self.choice("itemType");
                let quantity = self.quantity("quantity");
                let estimated_value = self.optional_amount("estimatedValue");
                Some(Details::DonationReceived(DonationReceived {
                    donor_name: donor_name?,
                    item_type: item_type?,
                    quantity: quantity?,
                    estimated_value: estimated_value?,
                }))
            }
            Category::BusPasses => {
                let client_name = self.text("clientName");
                let pass_type = self.choice("passType");
                let quantity = self.optional_quantity_or("quantity", 1);
                let cost = self.amount("cost");
                Some(Details::BusPass(BusPass {
                    client_name: client_name?,
                    pass_type: pass_type?,
                    quantity: quantity?,
                    cost: cost?,
                }))
            }
            Category::Rideshare => {
                let client_name = self.text("clientName");
                let cost = self.amount("cost");
                let pickup = self.text("pickup");
                let destination = self.text("destination");
                let purpose = self.choice("purpose");
                Some(Details::Rideshare(Rideshare {
                    client_name: client_name?,
                    cost: cost?,
                    pickup: pickup?,
                    destination: destination?,
                    purpose: purpose?,
                }))
            }
            Category::Water => Some(Details::Water(self.utility()?)),
            Category::Electric => Some(Details::Electric(self.utility()?)),
            Category::Rent => {
                let client_name = self.text("clientName");
                let amount = self.amount("amount");
                let landlord = self.optional_text("landlord");
                Some(Details::Rent(Rent {
                    client_name: client_name?,
                    amount: amount?,
                    landlord,
                }))
            }
        }
    }

    fn utility<P>(&mut self) -> Option<Utility<P>>
    where
        P: Choice + FromStr,
    {
        let client_name = self.text("clientName");
        let amount = self.amount("amount");
        // Optional, as on stored records.
        let account_number = self.optional_text("accountNumber");
        let provider = self.choice("provider");
        Some(Utility {
            client_name: client_name?,
            amount: amount?,
            account_number,
            provider: provider?,
        })
    }

    fn raw(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    fn required(&mut self, field: &str) -> Option<String> {
        let value = self.raw(field).map(str::to_string);
        match value {
            Some(s) => Some(s),
            None => {
                self.errors.push(field, "is required");
                None
            }
        }
    }

    fn date(&mut self, field: &str) -> Option<NaiveDate> {
        let raw = self.required(field)?;
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(d) => Some(d),
            Err(_) => {
                self.errors
                    .push(field, format!("'{raw}' is not a valid date (YYYY-MM-DD)"));
                None
            }
        }
    }

    fn text(&mut self, field: &str) -> Option<String> {
        self.required(field)
    }

    fn optional_text(&self, field: &str) -> String {
        self.raw(field).unwrap_or_default().to_string()
    }

    fn parse_quantity(&mut self, field: &str, raw: &str) -> Option<u32> {
        if raw.starts_with('-') {
            self.errors.push(field, "must not be negative");
            return None;
        }
        match raw.parse::<u32>() {
            Ok(n) => Some(n),
            Err(_) => {
                self.errors
                    .push(field, format!("'{raw}' is not a whole number"));
                None
            }
        }
    }

    fn quantity(&mut self, field: &str) -> Option<u32> {
        let raw = self.required(field)?;
        self.parse_quantity(field, &raw)
    }

    fn optional_quantity_or(&mut self, field: &str, default: u32) -> Option<u32> {
        match self.raw(field).map(str::to_string) {
            Some(raw) => self.parse_quantity(field, &raw),
            None => Some(default),
        }
    }

    fn optional_quantity(&mut self, field: &str) -> Option<u32> {
        self.optional_quantity_or(field, 0)
    }

    fn parse_amount(&mut self, field: &str, raw: &str) -> Option<Amount> {
        match Amount::from_str(raw) {
            Ok(a) => Some(a),
            Err(e) => {
                self.errors.push(field, e.to_string());
                None
            }
        }
    }

    fn amount(&mut self, field: &str) -> Option<Amount> {
        let raw = self.required(field)?;
        self.parse_amount(field, &raw)
    }

    fn optional_amount(&mut self, field: &str) -> Option<Amount> {
        match self.raw(field).map(str::to_string) {
            Some(raw) => self.parse_amount(field, &raw),
            None => Some(Amount::ZERO),
        }
    }

    fn choice<T>(&mut self, field: &str) -> Option<T>
    where
        T: Choice + FromStr,
    {
        let raw = self.required(field)?;
        match T::from_str(&raw) {
            Ok(c) => Some(c),
            Err(_) => {
                self.errors.push(
                    field,
                    format!("'{raw}' is not one of: {}", T::allowed()),
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DiaperSize, ElectricProvider};
    use crate::test::date;
    use rust_decimal::Decimal;

    fn diaper_form() -> EntryForm {
        EntryForm::new(Category::Diapers)
            .with("date", "2026-05-04")
            .with("clientName", "Darnell Price")
            .with("diapersQty", "40")
            .with("packs", "2")
            .with("diaperSize", "Size 5")
    }

    #[test]
    fn test_valid_diaper_form() {
        let entry = diaper_form().with("notes", " first visit ").validate().unwrap();
        assert_eq!(entry.date(), date("2026-05-04"));
        assert_eq!(entry.value(), Decimal::from(40));
        assert_eq!(entry.notes(), "first visit");
        match entry.details() {
            Details::Diapers(d) => {
                assert_eq!(d.diaper_size, DiaperSize::Size5);
                assert_eq!(d.packs, 2);
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_reports_every_failing_field() {
        let errors = EntryForm::new(Category::Electric)
            .with("date", "2026-13-40")
            .with("amount", "-75")
            .with("provider", "Gas Co")
            .validate()
            .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.get("date").unwrap().contains("not a valid date"));
        assert_eq!(errors.get("clientName"), Some("is required"));
        assert!(errors.get("amount").unwrap().contains("negative"));
        assert!(errors.get("provider").unwrap().contains("Duke Energy"));
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let errors = diaper_form().with("diapersQty", "-10").validate().unwrap_err();
        assert_eq!(errors.get("diapersQty"), Some("must not be negative"));
    }

    #[test]
    fn test_out_of_enum_is_not_coerced() {
        let errors = diaper_form().with("diaperSize", "size 5").validate().unwrap_err();
        assert!(errors.get("diaperSize").is_some());
    }

    #[test]
    fn test_optional_fields_default() {
        let entry = EntryForm::new(Category::BusPasses)
            .with("date", "2026-05-04")
            .with("clientName", "Lee Park")
            .with("passType", "Day Pass")
            .with("cost", "$5")
            .validate()
            .unwrap();
        assert_eq!(entry.value(), Decimal::from(5));
        match entry.details() {
            Details::BusPass(b) => assert_eq!(b.quantity, 1),
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_from_pairs() {
        let form = EntryForm::from_pairs(
            Category::Electric,
            [
                "date=2026-02-01",
                "clientName=Rosa Diaz",
                "amount=$212.40",
                "accountNumber=55-901",
                "provider=Duke Energy",
            ],
        )
        .unwrap();
        let entry = form.validate().unwrap();
        match entry.details() {
            Details::Electric(u) => assert_eq!(u.provider, ElectricProvider::DukeEnergy),
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_utility_account_number_is_optional() {
        let entry = EntryForm::new(Category::Water)
            .with("date", "2026-02-01")
            .with("clientName", "Rosa Diaz")
            .with("amount", "48.10")
            .with("provider", "City Water")
            .validate()
            .unwrap();
        let stored = Entry::from_json(
            Category::Water,
            serde_json::json!({
                "date": "2026-02-01",
                "clientName": "Rosa Diaz",
                "amount": 48.10,
                "provider": "City Water"
            }),
        )
        .unwrap();
        assert_eq!(entry.details(), stored.details());
        match entry.details() {
            Details::Water(u) => assert_eq!(u.account_number, ""),
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[test]
    fn test_malformed_or_huge_amount_is_rejected() {
        for amount in ["--5", "-$-5", "79228162514264337593543950335"] {
            let errors = EntryForm::new(Category::Rent)
                .with("date", "2026-02-01")
                .with("clientName", "Rosa Diaz")
                .with("amount", amount)
                .validate()
                .unwrap_err();
            assert_eq!(errors.len(), 1, "{amount}");
            assert!(errors.get("amount").is_some(), "{amount}");
        }
    }

    #[test]
    fn test_from_pairs_rejects_missing_equals() {
        let errors = EntryForm::from_pairs(Category::Rent, ["amount"]).unwrap_err();
        assert_eq!(errors.get("amount"), Some("expected a key=value pair"));
    }
}
