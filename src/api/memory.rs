//! Implements the `Backend` trait with in-memory data.
//!
//! Note: this is compiled even in the "production" version of this app so that the whole CLI can
//! be run, top-to-bottom, without a portal backend (see `Mode::Test`).

use crate::api::Backend;
use crate::error::Res;
use crate::model::{
    Amount, BusPass, BusPassType, Category, Details, DiaperSize, Diapers, DonationGiven,
    DonationItem, DonationReceived, ElectricProvider, Entry, EntryId, Rent, RidePurpose,
    Rideshare, Utility, WaterProvider,
};
use anyhow::{anyhow, bail};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::trace;

/// How the in-memory backend answers the next submissions.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub enum SubmitBehavior {
    /// Store the entry and return it with a fresh id.
    #[default]
    Acknowledge,
    /// Return an error without storing anything.
    Fail,
    /// Never answer.
    Hang,
    /// Store the entry but return it without an id.
    OmitId,
    /// Return the entry with this id instead of a fresh one.
    ReuseId(EntryId),
}

/// The data held by a `MemoryBackend`. Shared, so that a test can inspect or change it after
/// handing the backend to a repository.
#[derive(Debug, Default)]
pub struct MemoryState {
    pub entries: BTreeMap<Category, Vec<Entry>>,
    pub behavior: SubmitBehavior,
    pub submissions: usize,
    next_id: u64,
}

impl MemoryState {
    fn assign_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId::new(self.next_id.to_string())
    }

    /// Stores `entry`, giving it an id if it does not have one.
    pub fn insert(&mut self, entry: Entry) -> Entry {
        let entry = match entry.id() {
            Some(_) => entry,
            None => {
                let id = self.assign_id();
                entry.with_id(id)
            }
        };
        self.entries
            .entry(entry.category())
            .or_default()
            .push(entry.clone());
        entry
    }

    pub fn count(&self, category: Category) -> usize {
        self.entries.get(&category).map(Vec::len).unwrap_or(0)
    }
}

/// An implementation of the `Backend` trait that holds its data in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding `entries`. Entries without an id are given one.
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let backend = Self::new();
        if let Ok(mut state) = backend.state.lock() {
            for entry in entries {
                let _ = state.insert(entry);
            }
        }
        backend
    }

    /// Creates a backend seeded with a few months of demo activity ending today.
    pub fn seeded() -> Self {
        Self::with_entries(seed_entries(chrono::Local::now().date_naive()))
    }

    /// A handle to the shared state.
    pub fn state(&self) -> Arc<Mutex<MemoryState>> {
        Arc::clone(&self.state)
    }

    /// Changes how the next submissions are answered.
    pub fn set_behavior(&self, behavior: SubmitBehavior) {
        if let Ok(mut state) = self.state.lock() {
            state.behavior = behavior;
        }
    }

    fn lock(&self) -> Res<std::sync::MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("The in-memory backend state is poisoned"))
    }
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn fetch(&mut self, category: Category) -> Res<Vec<Entry>> {
        let state = self.lock()?;
        Ok(state.entries.get(&category).cloned().unwrap_or_default())
    }

    async fn submit(&mut self, entry: &Entry) -> Res<Entry> {
        let behavior = {
            let mut state = self.lock()?;
            state.submissions += 1;
            state.behavior.clone()
        };
        trace!("Memory backend answering {} submission with {behavior:?}", entry.category());
        match behavior {
            SubmitBehavior::Acknowledge => {
                let stored = self.lock()?.insert(entry.clone());
                Ok(stored)
            }
            SubmitBehavior::Fail => bail!("The backend refused the {} entry", entry.category()),
            SubmitBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                bail!("The backend never answered")
            }
            SubmitBehavior::OmitId => {
                let _ = self.lock()?.insert(entry.clone());
                Ok(entry.clone())
            }
            SubmitBehavior::ReuseId(id) => Ok(entry.clone().with_id(id)),
        }
    }
}

/// Demo entries spread over the months before `today`.
pub(crate) fn seed_entries(today: NaiveDate) -> Vec<Entry> {
    let day = |days_ago: u64| today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
    let dollars = |cents: u64| Amount::from_cents(cents);
    vec![
        Entry::new(
            day(2),
            Details::Diapers(Diapers {
                client_name: "Marcus Reed".to_string(),
                diapers_qty: 50,
                packs: 2,
                diaper_size: DiaperSize::Size4,
            }),
        ),
        Entry::new(
            day(35),
            Details::Diapers(Diapers {
                client_name: "Andre Lewis".to_string(),
                diapers_qty: 84,
                packs: 3,
                diaper_size: DiaperSize::Newborn,
            }),
        )
        .with_notes("twins"),
        Entry::new(
            day(9),
            Details::DonationGiven(DonationGiven {
                client_name: "Darnell Price".to_string(),
                item_type: DonationItem::CarSeat,
                quantity: 1,
            }),
        ),
        Entry::new(
            day(61),
            Details::DonationReceived(DonationReceived {
                donor_name: "First Baptist Outreach".to_string(),
                item_type: DonationItem::Wipes,
                quantity: 120,
                estimated_value: dollars(36_000),
            }),
        ),
        Entry::new(
            day(14),
            Details::BusPass(BusPass {
                client_name: "Lee Park".to_string(),
                pass_type: BusPassType::ThirtyOneDay,
                quantity: 1,
                cost: dollars(5_000),
            }),
        ),
        Entry::new(
            day(20),
            Details::Rideshare(Rideshare {
                client_name: "Joe Banks".to_string(),
                cost: dollars(1_850),
                pickup: "Shelter".to_string(),
                destination: "Family Court".to_string(),
                purpose: RidePurpose::CourtDate,
            }),
        ),
        Entry::new(
            day(48),
            Details::Water(Utility {
                client_name: "Tasha Green".to_string(),
                amount: dollars(8_925),
                account_number: "88-1200".to_string(),
                provider: WaterProvider::CityWater,
            }),
        ),
        Entry::new(
            day(27),
            Details::Electric(Utility {
                client_name: "Rosa Diaz".to_string(),
                amount: dollars(21_240),
                account_number: "55-901".to_string(),
                provider: ElectricProvider::DukeEnergy,
            }),
        ),
        Entry::new(
            day(90),
            Details::Rent(Rent {
                client_name: "Marcus Reed".to_string(),
                amount: dollars(65_000),
                landlord: "Oak Street Apartments".to_string(),
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{date, diapers};

    #[tokio::test]
    async fn test_acknowledge_assigns_sequential_ids() {
        let mut backend = MemoryBackend::new();
        let a = backend.submit(&diapers("2026-01-01", "A", 1)).await.unwrap();
        let b = backend.submit(&diapers("2026-01-02", "B", 2)).await.unwrap();
        assert_eq!(a.id().unwrap().as_str(), "1");
        assert_eq!(b.id().unwrap().as_str(), "2");
        assert_eq!(backend.fetch(Category::Diapers).await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_fail_stores_nothing() {
        let mut backend = MemoryBackend::new();
        backend.set_behavior(SubmitBehavior::Fail);
        assert!(backend.submit(&diapers("2026-01-01", "A", 1)).await.is_err());
        let state = backend.state();
        let state = state.lock().unwrap();
        assert_eq!(state.count(Category::Diapers), 0);
        assert_eq!(state.submissions, 1);
    }

    #[tokio::test]
    async fn test_fetch_empty_category() {
        let mut backend = MemoryBackend::new();
        assert!(backend.fetch(Category::Rent).await.unwrap().is_empty());
    }

    #[test]
    fn test_seed_covers_every_category() {
        let entries = seed_entries(date("2026-10-17"));
        for category in Category::ALL {
            assert!(
                entries.iter().any(|e| e.category() == category),
                "no seed entry for {category}"
            );
        }
        assert!(entries.iter().all(|e| e.validate().is_ok()));
    }
}
