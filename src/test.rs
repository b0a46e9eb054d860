//! Shared test fixtures.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::model::{
    Amount, BusPass, BusPassType, Details, DiaperSize, Diapers, DonationItem, DonationReceived,
    Entry, Rent, RidePurpose, Rideshare,
};
use crate::Config;
use chrono::NaiveDate;

/// Parses a `YYYY-MM-DD` date.
pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// A config pointing at a backend that is never contacted.
pub fn config() -> Config {
    Config::new("http://localhost:8080").unwrap()
}

pub fn diapers(day: &str, client: &str, qty: u32) -> Entry {
    Entry::new(
        date(day),
        Details::Diapers(Diapers {
            client_name: client.to_string(),
            diapers_qty: qty,
            packs: 1,
            diaper_size: DiaperSize::Size3,
        }),
    )
}

pub fn donation_received(day: &str, donor: &str, quantity: u32) -> Entry {
    Entry::new(
        date(day),
        Details::DonationReceived(DonationReceived {
            donor_name: donor.to_string(),
            item_type: DonationItem::Diapers,
            quantity,
            estimated_value: Amount::ZERO,
        }),
    )
}

pub fn bus_pass(day: &str, client: &str, cents: u64) -> Entry {
    Entry::new(
        date(day),
        Details::BusPass(BusPass {
            client_name: client.to_string(),
            pass_type: BusPassType::ThirtyOneDay,
            quantity: 1,
            cost: Amount::from_cents(cents),
        }),
    )
}

pub fn rideshare(day: &str, client: &str, cents: u64) -> Entry {
    Entry::new(
        date(day),
        Details::Rideshare(Rideshare {
            client_name: client.to_string(),
            cost: Amount::from_cents(cents),
            pickup: "Shelter".to_string(),
            destination: "County Clinic".to_string(),
            purpose: RidePurpose::MedicalAppointment,
        }),
    )
}

pub fn rent(day: &str, client: &str, cents: u64) -> Entry {
    rent_with_landlord(day, client, cents, "")
}

pub fn rent_with_landlord(day: &str, client: &str, cents: u64, landlord: &str) -> Entry {
    Entry::new(
        date(day),
        Details::Rent(Rent {
            client_name: client.to_string(),
            amount: Amount::from_cents(cents),
            landlord: landlord.to_string(),
        }),
    )
}
