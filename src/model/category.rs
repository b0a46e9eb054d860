use serde::{Deserialize, Serialize};

/// The eight kinds of assistance the dashboard tracks. Each has its own backend collection.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Diapers,
    DonationsGiven,
    DonationsReceived,
    BusPasses,
    Rideshare,
    Water,
    Electric,
    Rent,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

/// What an aggregate over a category is counting.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// A count of items handed out or received.
    Quantity,
    /// Dollars spent.
    Dollars,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Diapers,
        Category::DonationsGiven,
        Category::DonationsReceived,
        Category::BusPasses,
        Category::Rideshare,
        Category::Water,
        Category::Electric,
        Category::Rent,
    ];

    /// The path segment of this category's backend collection, e.g. `bus-passes`.
    pub fn slug(&self) -> String {
        self.to_string()
    }

    /// The heading used for this category on the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Diapers => "Diapers",
            Category::DonationsGiven => "Donations Given",
            Category::DonationsReceived => "In-Kind Donations",
            Category::BusPasses => "Bus Passes",
            Category::Rideshare => "Rideshare",
            Category::Water => "Water",
            Category::Electric => "Electric",
            Category::Rent => "Rent",
        }
    }

    /// The chart color for this category.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Diapers => "#4f9dde",
            Category::DonationsGiven => "#f2a541",
            Category::DonationsReceived => "#9b6fd1",
            Category::BusPasses => "#45b29d",
            Category::Rideshare => "#e05d5d",
            Category::Water => "#3cc1d6",
            Category::Electric => "#f0d43a",
            Category::Rent => "#7a8b99",
        }
    }

    pub fn unit(&self) -> Unit {
        match self {
            Category::Diapers | Category::DonationsGiven | Category::DonationsReceived => {
                Unit::Quantity
            }
            Category::BusPasses
            | Category::Rideshare
            | Category::Water
            | Category::Electric
            | Category::Rent => Unit::Dollars,
        }
    }

    /// The wire name of the field that aggregates sum for this category.
    pub fn value_field(&self) -> &'static str {
        match self {
            Category::Diapers => "diapersQty",
            Category::DonationsGiven | Category::DonationsReceived => "quantity",
            Category::BusPasses | Category::Rideshare => "cost",
            Category::Water | Category::Electric | Category::Rent => "amount",
        }
    }

    /// The wire name of the field naming who the entry is about.
    pub fn subject_field(&self) -> &'static str {
        match self {
            Category::DonationsReceived => "donorName",
            _ => "clientName",
        }
    }
}
