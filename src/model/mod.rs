//! Types that represent the core data model: the eight assistance categories and their entries.
mod amount;
mod category;
pub(crate) mod entry;
mod form;
mod kinds;

pub use amount::{Amount, AmountError};
pub use category::{Category, Unit};
pub use entry::{
    BusPass, Details, Diapers, DonationGiven, DonationReceived, Entry, EntryId, Rent, Rideshare,
    Utility,
};
pub use form::EntryForm;
pub use kinds::{
    BusPassType, Choice, DiaperSize, DonationItem, ElectricProvider, RidePurpose, WaterProvider,
};
