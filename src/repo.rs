//! The entry repository: the only owner of the in-memory entry collections.
//!
//! Collections are append-ordered. An entry is added optimistically, submitted to the backend and
//! either replaced by the acknowledged entry (which carries the backend-assigned id) or rolled
//! back. Readers never see collections directly; they get ordered copies from `list` or a
//! `Snapshot` for aggregation.

use crate::api::Backend;
use crate::error::{Error, ErrorType, IntoResult, Res, ValidationErrors};
use crate::model::{Category, Entry, EntryForm, EntryId};
use crate::{Config, Result};
use anyhow::{anyhow, bail, Context};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// An entry together with the position it was appended at, which breaks date ties.
#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    entry: Entry,
}

/// Owns the entry collections and the backend they are synchronized with.
pub struct Repository {
    backend: Box<dyn Backend + Send>,
    sync_timeout: Duration,
    collections: BTreeMap<Category, Vec<Slot>>,
    next_seq: u64,
}

impl Repository {
    /// Creates an empty repository. Nothing is fetched until `load` or `load_all` is called.
    pub fn new(backend: Box<dyn Backend + Send>, config: &Config) -> Self {
        Self {
            backend,
            sync_timeout: config.sync_timeout(),
            collections: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Overrides how long `add` waits for an acknowledgment.
    pub fn with_sync_timeout(mut self, sync_timeout: Duration) -> Self {
        self.sync_timeout = sync_timeout;
        self
    }

    /// Replaces the `category` collection with what the backend currently holds. Returns the
    /// number of entries loaded.
    pub async fn load(&mut self, category: Category) -> Result<usize> {
        let fetched = self
            .backend
            .fetch(category)
            .await
            .with_context(|| format!("Unable to load {category} entries"))
            .pub_result(ErrorType::Sync)?;

        let mut seen = BTreeSet::new();
        let mut slots = Vec::with_capacity(fetched.len());
        for entry in fetched {
            if let Some(id) = entry.id() {
                if !seen.insert(id.clone()) {
                    warn!("Ignoring a second {category} entry with id {id}");
                    continue;
                }
            }
            slots.push(self.slot(entry));
        }
        let count = slots.len();
        debug!("Loaded {count} {category} entries");
        let _ = self.collections.insert(category, slots);
        Ok(count)
    }

    /// Loads every category.
    pub async fn load_all(&mut self) -> Result<usize> {
        let mut total = 0;
        for category in Category::ALL {
            total += self.load(category).await?;
        }
        Ok(total)
    }

    /// The entries of `category`, most recent first. Entries sharing a date are listed in reverse
    /// insertion order, so the newest addition is on top.
    pub fn list(&self, category: Category) -> Vec<Entry> {
        let mut slots: Vec<&Slot> = self
            .collections
            .get(&category)
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        slots.sort_by(|a, b| {
            b.entry
                .date()
                .cmp(&a.entry.date())
                .then_with(|| b.seq.cmp(&a.seq))
        });
        slots.into_iter().map(|s| s.entry.clone()).collect()
    }

    pub fn len(&self, category: Category) -> usize {
        self.collections.get(&category).map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.values().all(Vec::is_empty)
    }

    /// An owned copy of every collection, in insertion order.
    pub fn snapshot(&self) -> Snapshot {
        let entries = self
            .collections
            .iter()
            .map(|(category, slots)| (*category, slots.iter().map(|s| s.entry.clone()).collect()))
            .collect();
        Snapshot { entries }
    }

    /// Validates a raw form and adds the resulting entry.
    pub async fn add_form(&mut self, form: &EntryForm) -> Result<Entry> {
        let entry = form.validate()?;
        self.add(form.category(), entry).await
    }

    /// Adds `entry` to `category` and submits it to the backend.
    ///
    /// # Errors
    ///
    /// - A `Validation` error if the entry is malformed, belongs to a different category or
    ///   already has an id. Nothing is appended or submitted.
    /// - A `Sync` error if the backend fails, does not answer within the sync timeout, or answers
    ///   without a usable id. The optimistic entry is removed again and the add can be retried.
    pub async fn add(&mut self, category: Category, entry: Entry) -> Result<Entry> {
        check_addable(category, &entry)?;

        let slot = self.slot(entry.clone());
        let seq = slot.seq;
        self.collections.entry(category).or_default().push(slot);

        match self.acknowledge(&entry).await {
            Ok(acknowledged) => {
                self.replace(category, seq, acknowledged.clone());
                info!(
                    "Added {category} entry {} for {}",
                    acknowledged.id().map(EntryId::as_str).unwrap_or_default(),
                    acknowledged.subject()
                );
                Ok(acknowledged)
            }
            Err(e) => {
                self.remove(category, seq);
                warn!("Rolled back {category} entry for {}: {e:#}", entry.subject());
                Err(Error::new(ErrorType::Sync, e))
            }
        }
    }

    /// Submits `entry` and checks the backend's answer.
    async fn acknowledge(&mut self, entry: &Entry) -> Res<Entry> {
        let category = entry.category();
        let acknowledged =
            match tokio::time::timeout(self.sync_timeout, self.backend.submit(entry)).await {
                Ok(result) => result.context("The backend did not accept the entry")?,
                Err(_) => bail!(
                    "The backend did not acknowledge the entry within {:?}, please try again",
                    self.sync_timeout
                ),
            };
        if acknowledged.category() != category {
            bail!(
                "The backend acknowledged a {} entry for a {category} submission",
                acknowledged.category()
            );
        }
        let id = acknowledged
            .id()
            .ok_or_else(|| anyhow!("The backend acknowledged the entry without an id"))?;
        if self.contains_id(category, id) {
            bail!("The backend assigned id {id}, which is already in use");
        }
        Ok(acknowledged)
    }

    fn contains_id(&self, category: Category, id: &EntryId) -> bool {
        self.collections
            .get(&category)
            .map(|slots| slots.iter().any(|s| s.entry.id() == Some(id)))
            .unwrap_or(false)
    }

    fn slot(&mut self, entry: Entry) -> Slot {
        self.next_seq += 1;
        Slot {
            seq: self.next_seq,
            entry,
        }
    }

    fn replace(&mut self, category: Category, seq: u64, entry: Entry) {
        if let Some(slot) = self
            .collections
            .get_mut(&category)
            .and_then(|slots| slots.iter_mut().find(|s| s.seq == seq))
        {
            slot.entry = entry;
        }
    }

    fn remove(&mut self, category: Category, seq: u64) {
        if let Some(slots) = self.collections.get_mut(&category) {
            slots.retain(|s| s.seq != seq);
        }
    }
}

fn check_addable(category: Category, entry: &Entry) -> std::result::Result<(), ValidationErrors> {
    let mut errors = match entry.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };
    if entry.category() != category {
        errors.push(
            "category",
            format!("a {} entry cannot be added to {category}", entry.category()),
        );
    }
    if entry.id().is_some() {
        errors.push("id", "is assigned by the backend and must be empty");
    }
    errors.into_result()
}

/// A read-only copy of the entry collections at one moment. Aggregates are computed from this so
/// that they always match what the repository held when the snapshot was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: BTreeMap<Category, Vec<Entry>>,
}

impl Snapshot {
    /// Builds a snapshot directly from entries, each placed in its own category.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let mut map: BTreeMap<Category, Vec<Entry>> = BTreeMap::new();
        for entry in entries {
            map.entry(entry.category()).or_default().push(entry);
        }
        Self { entries: map }
    }

    /// The entries of `category` in insertion order.
    pub fn entries(&self, category: Category) -> &[Entry] {
        self.entries
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every entry, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values().flatten()
    }

    /// The entries of `category`, or of every category when `None`.
    pub fn select(&self, category: Option<Category>) -> Box<dyn Iterator<Item = &Entry> + '_> {
        match category {
            Some(c) => Box::new(self.entries(c).iter()),
            None => Box::new(self.iter()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryBackend, SubmitBehavior};
    use crate::model::Details;
    use crate::test::{config, date, diapers, rent};

    fn repo(backend: &MemoryBackend) -> Repository {
        Repository::new(Box::new(backend.clone()), &config())
    }

    #[tokio::test]
    async fn test_add_assigns_backend_id() {
        let backend = MemoryBackend::new();
        let mut repo = repo(&backend);
        let added = repo
            .add(Category::Diapers, diapers("2026-03-01", "Marcus Reed", 20))
            .await
            .unwrap();
        assert_eq!(added.id().unwrap().as_str(), "1");
        assert_eq!(repo.list(Category::Diapers), vec![added]);
        assert_eq!(backend.state().lock().unwrap().count(Category::Diapers), 1);
    }

    #[tokio::test]
    async fn test_list_most_recent_first_with_stable_ties() {
        let backend = MemoryBackend::new();
        let mut repo = repo(&backend);
        for (day, name) in [
            ("2026-03-01", "first"),
            ("2026-03-05", "second"),
            ("2026-03-01", "third"),
            ("2026-02-20", "fourth"),
        ] {
            repo.add(Category::Diapers, diapers(day, name, 1))
                .await
                .unwrap();
        }
        let names: Vec<String> = repo
            .list(Category::Diapers)
            .iter()
            .map(|e| e.subject().to_string())
            .collect();
        assert_eq!(names, vec!["second", "third", "first", "fourth"]);
    }

    #[tokio::test]
    async fn test_failed_submit_rolls_back() {
        let backend = MemoryBackend::new();
        let mut repo = repo(&backend);
        repo.add(Category::Rent, rent("2026-01-01", "Kept", 100_00))
            .await
            .unwrap();

        backend.set_behavior(SubmitBehavior::Fail);
        let err = repo
            .add(Category::Rent, rent("2026-01-02", "Dropped", 200_00))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Sync);
        assert!(err.is_retryable());
        assert_eq!(repo.len(Category::Rent), 1);
        assert_eq!(repo.list(Category::Rent)[0].subject(), "Kept");

        // A retry after the backend recovers goes through.
        backend.set_behavior(SubmitBehavior::Acknowledge);
        repo.add(Category::Rent, rent("2026-01-02", "Dropped", 200_00))
            .await
            .unwrap();
        assert_eq!(repo.len(Category::Rent), 2);
    }

    #[tokio::test]
    async fn test_unacknowledged_submit_times_out_and_rolls_back() {
        let backend = MemoryBackend::new();
        backend.set_behavior(SubmitBehavior::Hang);
        let mut repo = repo(&backend).with_sync_timeout(Duration::from_millis(20));
        let err = repo
            .add(Category::Diapers, diapers("2026-03-01", "Marcus Reed", 20))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("did not acknowledge"));
        assert_eq!(repo.len(Category::Diapers), 0);
    }

    #[tokio::test]
    async fn test_acknowledgment_without_id_rolls_back() {
        let backend = MemoryBackend::new();
        backend.set_behavior(SubmitBehavior::OmitId);
        let mut repo = repo(&backend);
        let err = repo
            .add(Category::Diapers, diapers("2026-03-01", "Marcus Reed", 20))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Sync);
        assert!(repo.list(Category::Diapers).is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_refused() {
        let backend = MemoryBackend::new();
        let mut repo = repo(&backend);
        let first = repo
            .add(Category::Diapers, diapers("2026-03-01", "A", 20))
            .await
            .unwrap();
        backend.set_behavior(SubmitBehavior::ReuseId(first.id().unwrap().clone()));
        let err = repo
            .add(Category::Diapers, diapers("2026-03-02", "B", 30))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already in use"));
        assert_eq!(repo.list(Category::Diapers), vec![first]);
    }

    #[tokio::test]
    async fn test_invalid_entry_never_reaches_backend() {
        let backend = MemoryBackend::new();
        let mut repo = repo(&backend);

        let err = repo
            .add(Category::Rent, diapers("2026-03-01", "Marcus Reed", 20))
            .await
            .unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert!(err.validation_errors().unwrap().get("category").is_some());

        let with_id = diapers("2026-03-01", "Marcus Reed", 20).with_id(EntryId::new("9"));
        let err = repo.add(Category::Diapers, with_id).await.unwrap_err();
        assert!(err.validation_errors().unwrap().get("id").is_some());

        let err = repo
            .add(Category::Diapers, diapers("2026-03-01", "", 20))
            .await
            .unwrap_err();
        assert!(err.validation_errors().unwrap().get("clientName").is_some());

        assert_eq!(backend.state().lock().unwrap().submissions, 0);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_add_form() {
        let backend = MemoryBackend::new();
        let mut repo = repo(&backend);
        let form = EntryForm::new(Category::Rent)
            .with("date", "2026-06-01")
            .with("clientName", "Rosa Diaz")
            .with("amount", "$650");
        let added = repo.add_form(&form).await.unwrap();
        assert!(matches!(added.details(), Details::Rent(_)));

        let bad = form.with("amount", "-650");
        let err = repo.add_form(&bad).await.unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Validation);
        assert_eq!(repo.len(Category::Rent), 1);
    }

    #[tokio::test]
    async fn test_load_replaces_collection_and_skips_duplicate_ids() {
        let backend = MemoryBackend::with_entries([
            diapers("2026-01-01", "A", 1),
            diapers("2026-01-02", "B", 2),
        ]);
        {
            let state = backend.state();
            let mut state = state.lock().unwrap();
            let duplicate = diapers("2026-01-03", "C", 3).with_id(EntryId::new("1"));
            state.entries.get_mut(&Category::Diapers).unwrap().push(duplicate);
        }
        let mut repo = repo(&backend);
        assert_eq!(repo.load(Category::Diapers).await.unwrap(), 2);
        assert_eq!(repo.len(Category::Diapers), 2);
        assert_eq!(repo.list(Category::Diapers)[0].date(), date("2026-01-02"));

        // Loading again replaces rather than appends.
        assert_eq!(repo.load_all().await.unwrap(), 2);
        assert_eq!(repo.len(Category::Diapers), 2);
    }

    #[test]
    fn test_snapshot_select() {
        let snapshot = Snapshot::from_entries([
            diapers("2026-01-01", "A", 1),
            rent("2026-01-01", "B", 100),
            diapers("2026-01-02", "C", 2),
        ]);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.entries(Category::Diapers).len(), 2);
        assert_eq!(snapshot.select(Some(Category::Rent)).count(), 1);
        assert_eq!(snapshot.select(None).count(), 3);
        assert!(snapshot.entries(Category::Water).is_empty());
    }
}
