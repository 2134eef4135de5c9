//! The paste lifecycle manager: create, read-with-view-increment, delete,
//! and list over an injected [`PasteStore`].
//!
//! Reading is the one operation with a write side effect: every successful
//! read increments `currentViews` and persists it. A paste created with a
//! view cap of 1 therefore reads `Found` exactly once and `Expired` after
//! that. Expired pastes stay in storage; only `delete` removes records.
//!
//! All operations run the whole load-evaluate-mutate-save window under one
//! lock, so concurrent readers of an almost-exhausted paste cannot both
//! observe an under-limit count and push it past the cap.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use pastebox_common::paste::AccessState;
use pastebox_common::{CreatePasteRequest, Error, ExpiresIn, Paste, PasteSummary, ViewLimit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::short_code::{self, ShortCode, ID_LENGTH};
use crate::store::PasteStore;

/// Outcome of a read. `Expired` covers both the time bound and the view
/// bound; the record is still present in storage.
#[derive(Debug)]
pub enum ReadOutcome {
    Found(Paste),
    Expired,
    NotFound,
}

struct Inner<S> {
    store: S,
    rng: StdRng,
}

pub struct LifecycleManager<S> {
    inner: Mutex<Inner<S>>,
}

impl<S: PasteStore> LifecycleManager<S> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, StdRng::from_entropy())
    }

    /// Like [`Self::new`] but with a caller-controlled RNG, for deterministic
    /// id generation in tests.
    pub fn with_rng(store: S, rng: StdRng) -> Self {
        Self {
            inner: Mutex::new(Inner { store, rng }),
        }
    }

    /// Validates the request, appends a fresh record with zero views, and
    /// returns its id.
    pub fn create(&self, request: CreatePasteRequest) -> Result<String, Error> {
        if request.content.trim().is_empty() {
            return Err(Error::Validation(
                "paste content cannot be empty".to_string(),
            ));
        }

        let expires_in: ExpiresIn = request.expires_in.parse()?;
        let view_limit: ViewLimit = request.max_views.parse()?;

        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let mut pastes = inner.store.load()?;
        let id = fresh_id(&mut inner.rng, &pastes)?;

        let now = Utc::now();
        pastes.push(Paste {
            id: id.clone(),
            title: Paste::normalize_title(&request.title),
            content: request.content,
            created_at: now,
            expires_at: expires_in.expires_at(now),
            max_views: view_limit.max_views(),
            current_views: 0,
            is_private: request.is_private,
        });
        inner.store.save(&pastes)?;

        Ok(id)
    }

    /// Looks up a paste, refusing expired ones. A successful read increments
    /// the view count by exactly one and persists it before returning the
    /// post-increment record.
    pub fn read(&self, id: &str) -> Result<ReadOutcome, Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let mut pastes = inner.store.load()?;

        let Some(paste) = pastes.iter_mut().find(|paste| paste.id == id) else {
            return Ok(ReadOutcome::NotFound);
        };

        // Expiration is evaluated before the increment side effect, so an
        // at-limit paste never counts further views.
        if paste.evaluate_access(Utc::now()) == AccessState::Expired {
            return Ok(ReadOutcome::Expired);
        }

        paste.increment_view();
        let found = paste.clone();
        inner.store.save(&pastes)?;

        Ok(ReadOutcome::Found(found))
    }

    /// Removes the record if present. Returns whether anything was removed;
    /// removing a missing id is not an error here.
    pub fn delete(&self, id: &str) -> Result<bool, Error> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let mut pastes = inner.store.load()?;

        let before = pastes.len();
        pastes.retain(|paste| paste.id != id);
        if pastes.len() == before {
            return Ok(false);
        }

        inner.store.save(&pastes)?;
        Ok(true)
    }

    /// Summaries of every stored paste, newest first. Listing is
    /// informational: expired pastes are not filtered out, since expiration
    /// is enforced only at read time.
    pub fn list(&self) -> Result<Vec<PasteSummary>, Error> {
        let guard = self.lock()?;
        let pastes = guard.store.load()?;

        let mut summaries: Vec<PasteSummary> = pastes.iter().map(PasteSummary::from).collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<S>>, Error> {
        self.inner
            .lock()
            .map_err(|_| Error::Storage("lifecycle state lock poisoned".to_string()))
    }
}

// Try finding an unused id; give up after 1000 attempts. With a 32-character
// alphabet and 8 positions a collision is already vanishingly unlikely.
fn fresh_id(rng: &mut StdRng, pastes: &[Paste]) -> Result<String, Error> {
    for _ in 0..1000 {
        let code: ShortCode<ID_LENGTH> = rng.sample(short_code::Generator);
        let id = code.to_string();
        if !pastes.iter().any(|paste| paste.id == id) {
            return Ok(id);
        }
    }

    Err(Error::Storage(
        "failed to generate a unique paste id".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::store::MemoryStore;

    use super::*;

    fn manager() -> LifecycleManager<MemoryStore> {
        LifecycleManager::new(MemoryStore::default())
    }

    fn request(content: &str, expires_in: &str, max_views: &str) -> CreatePasteRequest {
        CreatePasteRequest {
            title: String::new(),
            content: content.to_string(),
            expires_in: expires_in.to_string(),
            max_views: max_views.to_string(),
            is_private: false,
        }
    }

    fn stored(id: &str, offset_secs: i64) -> Paste {
        Paste {
            id: id.to_string(),
            title: "stored".to_string(),
            content: "stored content".to_string(),
            created_at: Utc::now() + Duration::seconds(offset_secs),
            expires_at: None,
            max_views: None,
            current_views: 0,
            is_private: false,
        }
    }

    #[test]
    fn create_then_read_counts_one_view() {
        let manager = manager();
        let id = manager.create(request("hello", "never", "unlimited")).unwrap();

        match manager.read(&id).unwrap() {
            ReadOutcome::Found(paste) => {
                assert_eq!(paste.current_views, 1);
                assert_eq!(paste.content, "hello");
            }
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn blank_title_becomes_untitled() {
        let manager = manager();
        let id = manager.create(request("hello", "never", "unlimited")).unwrap();

        let ReadOutcome::Found(paste) = manager.read(&id).unwrap() else {
            panic!("expected Found");
        };
        assert_eq!(paste.title, "Untitled");
    }

    #[test]
    fn empty_content_is_rejected() {
        let manager = manager();
        for content in ["", "   ", "\n\t"] {
            assert!(matches!(
                manager.create(request(content, "never", "unlimited")),
                Err(Error::Validation(_))
            ));
        }
    }

    #[test]
    fn malformed_selectors_are_rejected() {
        let manager = manager();
        assert!(matches!(
            manager.create(request("hello", "soon", "unlimited")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            manager.create(request("hello", "never", "0")),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            manager.create(request("hello", "never", "many")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn view_cap_allows_exactly_n_reads() {
        let manager = manager();
        let id = manager.create(request("capped", "never", "3")).unwrap();

        for expected in 1..=3 {
            match manager.read(&id).unwrap() {
                ReadOutcome::Found(paste) => assert_eq!(paste.current_views, expected),
                other => panic!("read {expected} should be Found, got {other:?}"),
            }
        }

        assert!(matches!(manager.read(&id).unwrap(), ReadOutcome::Expired));
        assert!(matches!(manager.read(&id).unwrap(), ReadOutcome::Expired));

        // The stored count never passed the cap.
        let summaries = manager.list().unwrap();
        assert_eq!(summaries[0].current_views, 3);
    }

    #[test]
    fn burn_after_reading_scenario() {
        let manager = manager();
        let id = manager.create(request("hello", "10m", "1")).unwrap();

        let ReadOutcome::Found(paste) = manager.read(&id).unwrap() else {
            panic!("first read should be Found");
        };
        assert_eq!(paste.current_views, 1);
        assert_eq!(paste.title, "Untitled");

        assert!(matches!(manager.read(&id).unwrap(), ReadOutcome::Expired));
    }

    #[test]
    fn past_deadline_reads_expired_without_counting() {
        let mut paste = stored("2345CFGH", 0);
        paste.expires_at = Some(Utc::now() - Duration::hours(1));
        let manager = LifecycleManager::new(MemoryStore::seeded(vec![paste]));

        assert!(matches!(
            manager.read("2345CFGH").unwrap(),
            ReadOutcome::Expired
        ));
        assert_eq!(manager.list().unwrap()[0].current_views, 0);
    }

    #[test]
    fn expired_pastes_stay_listed() {
        let mut paste = stored("2345CFGH", 0);
        paste.expires_at = Some(Utc::now() - Duration::hours(1));
        let manager = LifecycleManager::new(MemoryStore::seeded(vec![paste]));

        assert_eq!(manager.list().unwrap().len(), 1);
    }

    #[test]
    fn unknown_id_reads_not_found() {
        let manager = manager();
        assert!(matches!(
            manager.read("missing1").unwrap(),
            ReadOutcome::NotFound
        ));
    }

    #[test]
    fn delete_then_read_is_not_found() {
        let manager = manager();
        let id = manager.create(request("hello", "never", "unlimited")).unwrap();

        assert!(manager.delete(&id).unwrap());
        assert!(matches!(manager.read(&id).unwrap(), ReadOutcome::NotFound));
        // Idempotent: a second delete simply removes nothing.
        assert!(!manager.delete(&id).unwrap());
    }

    #[test]
    fn list_orders_newest_first() {
        let manager = LifecycleManager::new(MemoryStore::seeded(vec![
            stored("paste111", -30),
            stored("paste333", -10),
            stored("paste222", -20),
        ]));

        let ids: Vec<String> = manager
            .list()
            .unwrap()
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(ids, ["paste333", "paste222", "paste111"]);
    }

    #[test]
    fn list_truncates_long_content_previews() {
        let manager = manager();
        manager
            .create(request(&"a".repeat(150), "never", "unlimited"))
            .unwrap();

        let summaries = manager.list().unwrap();
        assert_eq!(summaries[0].content_preview.chars().count(), 103);
        assert!(summaries[0].content_preview.ends_with("..."));
    }

    #[test]
    fn id_generation_skips_a_colliding_id() {
        // Pre-seed the store with exactly the id a seeded RNG would produce
        // first, then check that create retries instead of duplicating it.
        let first = StdRng::seed_from_u64(42)
            .sample::<ShortCode<ID_LENGTH>, _>(short_code::Generator)
            .to_string();

        let manager = LifecycleManager::with_rng(
            MemoryStore::seeded(vec![stored(&first, 0)]),
            StdRng::seed_from_u64(42),
        );
        let id = manager.create(request("hello", "never", "unlimited")).unwrap();

        assert_ne!(id, first);
        assert_eq!(id.len(), ID_LENGTH);
    }
}
