//! The `Entry` type: one recorded assistance transaction.

use crate::error::{Res, ValidationErrors};
use crate::model::{
    Amount, BusPassType, Category, DiaperSize, DonationItem, ElectricProvider, RidePurpose,
    WaterProvider,
};
use anyhow::Context;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{self, Display, Formatter};

/// A backend-assigned entry identifier. Backends hand these out as either numbers or strings, so
/// both are accepted and kept as a string.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(EntryId(n.to_string())),
            Raw::Text(s) if s.trim().is_empty() => {
                Err(serde::de::Error::custom("entry id must not be empty"))
            }
            Raw::Text(s) => Ok(EntryId(s)),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diapers {
    pub client_name: String,
    pub diapers_qty: u32,
    #[serde(default)]
    pub packs: u32,
    pub diaper_size: DiaperSize,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationGiven {
    pub client_name: String,
    pub item_type: DonationItem,
    pub quantity: u32,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceived {
    pub donor_name: String,
    pub item_type: DonationItem,
    pub quantity: u32,
    #[serde(default)]
    pub estimated_value: Amount,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusPass {
    pub client_name: String,
    pub pass_type: BusPassType,
    #[serde(default = "one")]
    pub quantity: u32,
    pub cost: Amount,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rideshare {
    pub client_name: String,
    pub cost: Amount,
    pub pickup: String,
    pub destination: String,
    pub purpose: RidePurpose,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utility<P> {
    pub client_name: String,
    pub amount: Amount,
    #[serde(default)]
    pub account_number: String,
    pub provider: P,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rent {
    pub client_name: String,
    pub amount: Amount,
    #[serde(default)]
    pub landlord: String,
}

fn one() -> u32 {
    1
}

/// The category-specific part of an entry. The variant *is* the category, so an entry can never
/// belong to two collections.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Details {
    Diapers(Diapers),
    DonationGiven(DonationGiven),
    DonationReceived(DonationReceived),
    BusPass(BusPass),
    Rideshare(Rideshare),
    Water(Utility<WaterProvider>),
    Electric(Utility<ElectricProvider>),
    Rent(Rent),
}

impl Details {
    pub fn category(&self) -> Category {
        match self {
            Details::Diapers(_) => Category::Diapers,
            Details::DonationGiven(_) => Category::DonationsGiven,
            Details::DonationReceived(_) => Category::DonationsReceived,
            Details::BusPass(_) => Category::BusPasses,
            Details::Rideshare(_) => Category::Rideshare,
            Details::Water(_) => Category::Water,
            Details::Electric(_) => Category::Electric,
            Details::Rent(_) => Category::Rent,
        }
    }
}

/// One assistance transaction.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Entry {
    id: Option<EntryId>,
    date: NaiveDate,
    notes: String,
    details: Details,
}

impl Entry {
    /// Creates an entry that has not been persisted yet.
    pub fn new(date: NaiveDate, details: Details) -> Self {
        Self {
            id: None,
            date,
            notes: String::new(),
            details,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub(crate) fn with_id(mut self, id: EntryId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<&EntryId> {
        self.id.as_ref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn details(&self) -> &Details {
        &self.details
    }

    pub fn category(&self) -> Category {
        self.details.category()
    }

    /// The client (or donor) this entry is about.
    pub fn subject(&self) -> &str {
        match &self.details {
            Details::Diapers(d) => &d.client_name,
            Details::DonationGiven(d) => &d.client_name,
            Details::DonationReceived(d) => &d.donor_name,
            Details::BusPass(d) => &d.client_name,
            Details::Rideshare(d) => &d.client_name,
            Details::Water(d) => &d.client_name,
            Details::Electric(d) => &d.client_name,
            Details::Rent(d) => &d.client_name,
        }
    }

    /// The value aggregates sum for this entry: a quantity for diapers and donations, dollars for
    /// everything else. See `Category::value_field`.
    pub fn value(&self) -> Decimal {
        match &self.details {
            Details::Diapers(d) => Decimal::from(d.diapers_qty),
            Details::DonationGiven(d) => Decimal::from(d.quantity),
            Details::DonationReceived(d) => Decimal::from(d.quantity),
            Details::BusPass(d) => d.cost.value(),
            Details::Rideshare(d) => d.cost.value(),
            Details::Water(d) => d.amount.value(),
            Details::Electric(d) => d.amount.value(),
            Details::Rent(d) => d.amount.value(),
        }
    }

    /// The label of the enumerated sub-type this entry falls under, used for per-category
    /// breakdowns. Rent has no enumeration and groups by landlord.
    pub fn kind_label(&self) -> String {
        match &self.details {
            Details::Diapers(d) => d.diaper_size.to_string(),
            Details::DonationGiven(d) => d.item_type.to_string(),
            Details::DonationReceived(d) => d.item_type.to_string(),
            Details::BusPass(d) => d.pass_type.to_string(),
            Details::Rideshare(d) => d.purpose.to_string(),
            Details::Water(d) => d.provider.to_string(),
            Details::Electric(d) => d.provider.to_string(),
            Details::Rent(d) if d.landlord.trim().is_empty() => "Unspecified".to_string(),
            Details::Rent(d) => d.landlord.trim().to_string(),
        }
    }

    /// Checks the fields the type system cannot: required text must be present.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.subject().trim().is_empty() {
            errors.push(self.category().subject_field(), "is required");
        }
        if let Details::Rideshare(r) = &self.details {
            if r.pickup.trim().is_empty() {
                errors.push("pickup", "is required");
            }
            if r.destination.trim().is_empty() {
                errors.push("destination", "is required");
            }
        }
        errors.into_result()
    }

    /// Serializes the entry into the flat JSON object its backend collection expects.
    pub fn to_json(&self) -> Res<serde_json::Value> {
        let value = match &self.details {
            Details::Diapers(d) => self.wire(d),
            Details::DonationGiven(d) => self.wire(d),
            Details::DonationReceived(d) => self.wire(d),
            Details::BusPass(d) => self.wire(d),
            Details::Rideshare(d) => self.wire(d),
            Details::Water(d) => self.wire(d),
            Details::Electric(d) => self.wire(d),
            Details::Rent(d) => self.wire(d),
        };
        value.with_context(|| format!("Unable to serialize {} entry", self.category()))
    }

    fn wire<D: Serialize>(&self, details: &D) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(Wire {
            id: self.id.clone(),
            date: self.date,
            notes: self.notes.clone(),
            details,
        })
    }

    /// Parses one entry of `category` from the backend's JSON.
    pub fn from_json(category: Category, value: serde_json::Value) -> Res<Self> {
        let entry = match category {
            Category::Diapers => parse(value, Details::Diapers),
            Category::DonationsGiven => parse(value, Details::DonationGiven),
            Category::DonationsReceived => parse(value, Details::DonationReceived),
            Category::BusPasses => parse(value, Details::BusPass),
            Category::Rideshare => parse(value, Details::Rideshare),
            Category::Water => parse(value, Details::Water),
            Category::Electric => parse(value, Details::Electric),
            Category::Rent => parse(value, Details::Rent),
        };
        entry.with_context(|| format!("Unable to parse {category} entry"))
    }
}

fn parse<D, F>(value: serde_json::Value, wrap: F) -> serde_json::Result<Entry>
where
    D: DeserializeOwned,
    F: FnOnce(D) -> Details,
{
    let wire: Wire<D> = serde_json::from_value(value)?;
    Ok(Entry {
        id: wire.id,
        date: wire.date,
        notes: wire.notes,
        details: wrap(wire.details),
    })
}

/// The flat JSON shape shared by every backend collection.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Wire<D> {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<EntryId>,
    #[serde(with = "iso_date")]
    date: NaiveDate,
    #[serde(default)]
    notes: String,
    #[serde(flatten)]
    details: D,
}

/// Dates go out as `YYYY-MM-DD`. Coming in, a full ISO timestamp is truncated to its date.
mod iso_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub(super) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let day = s.get(..10).unwrap_or(&s);
        NaiveDate::parse_from_str(day, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{date, diapers, rideshare};
    use serde_json::json;

    #[test]
    fn test_category_follows_details() {
        let entry = diapers("2026-03-02", "Marcus Reed", 20);
        assert_eq!(entry.category(), Category::Diapers);
        assert_eq!(entry.subject(), "Marcus Reed");
        assert_eq!(entry.value(), Decimal::from(20));
        assert!(entry.id().is_none());
    }

    #[test]
    fn test_from_json_diapers() {
        let value = json!({
            "id": 17,
            "date": "2026-02-11T00:00:00.000Z",
            "clientName": "Andre Lewis",
            "diapersQty": 48,
            "packs": 2,
            "diaperSize": "Size 4",
            "notes": "twins"
        });
        let entry = Entry::from_json(Category::Diapers, value).unwrap();
        assert_eq!(entry.id(), Some(&EntryId::new("17")));
        assert_eq!(entry.date(), date("2026-02-11"));
        assert_eq!(entry.notes(), "twins");
        assert_eq!(entry.kind_label(), "Size 4");
        assert_eq!(entry.value(), Decimal::from(48));
    }

    #[test]
    fn test_from_json_accepts_mongo_style_id() {
        let value = json!({
            "_id": "65f0c2a9e4b0a1b2c3d4e5f6",
            "date": "2026-01-05",
            "clientName": "Tasha Green",
            "amount": 310.5,
            "accountNumber": "88-1200",
            "provider": "City Water"
        });
        let entry = Entry::from_json(Category::Water, value).unwrap();
        assert_eq!(entry.id().unwrap().as_str(), "65f0c2a9e4b0a1b2c3d4e5f6");
        assert_eq!(entry.notes(), "");
    }

    #[test]
    fn test_from_json_rejects_out_of_enum() {
        let value = json!({
            "date": "2026-01-05",
            "clientName": "Tasha Green",
            "amount": 120,
            "provider": "Gas Company"
        });
        assert!(Entry::from_json(Category::Electric, value).is_err());
    }

    #[test]
    fn test_from_json_rejects_negative_amount() {
        let value = json!({
            "date": "2026-01-05",
            "clientName": "Tasha Green",
            "amount": -120,
        });
        assert!(Entry::from_json(Category::Rent, value).is_err());
    }

    #[test]
    fn test_to_json_is_flat_and_omits_missing_id() {
        let entry = rideshare("2026-04-01", "Joe Banks", 1850).with_notes("clinic");
        let value = entry.to_json().unwrap();
        assert_eq!(
            value,
            json!({
                "date": "2026-04-01",
                "notes": "clinic",
                "clientName": "Joe Banks",
                "cost": 18.5,
                "pickup": "Shelter",
                "destination": "County Clinic",
                "purpose": "Medical Appointment"
            })
        );
    }

    #[test]
    fn test_validate_requires_subject() {
        let entry = diapers("2026-03-02", "  ", 5);
        let errors = entry.validate().unwrap_err();
        assert_eq!(errors.get("clientName"), Some("is required"));
    }

    #[test]
    fn test_bus_pass_quantity_defaults_to_one() {
        let value = json!({
            "date": "2026-01-05",
            "clientName": "Lee Park",
            "passType": "Day Pass",
            "cost": "$5.00"
        });
        let entry = Entry::from_json(Category::BusPasses, value).unwrap();
        match entry.details() {
            Details::BusPass(b) => assert_eq!(b.quantity, 1),
            other => panic!("unexpected details {other:?}"),
        }
    }
}
