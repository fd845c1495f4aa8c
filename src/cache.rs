//! Per-rule cache of text stores, keyed by locale.
//!
//! Each locale maps to a [`SoftRef`] holding the stores for every style of
//! that locale. A holder may be reclaimed at any time, either explicitly or
//! because the cache grew past its capacity; a reclaimed holder is a miss and
//! the stores are simply rebuilt. Two threads missing on the same locale may
//! both populate and both install a holder, the last one wins. Population is
//! idempotent so nothing depends on it happening only once.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::locale::Locale;
use crate::text::{TextStore, TextStyle};

/// The text of one locale as handed out by a rule, before stores are built.
pub type TextByStyle = HashMap<TextStyle, BTreeMap<i32, String>>;

pub type StoresByStyle = HashMap<TextStyle, Arc<TextStore>>;

pub const DEFAULT_CACHE_CAPACITY: usize = 32;

// ------------- SoftRef -------------
/// A holder whose referent may vanish under memory pressure.
#[derive(Debug)]
pub struct SoftRef<T> {
    referent: RwLock<Option<Arc<T>>>,
}
impl<T> SoftRef<T> {
    pub fn new(referent: Arc<T>) -> Self {
        Self {
            referent: RwLock::new(Some(referent)),
        }
    }
    pub fn get(&self) -> Option<Arc<T>> {
        // a poisoned holder counts as reclaimed
        self.referent.read().ok().and_then(|slot| slot.clone())
    }
    pub fn reclaim(&self) {
        let mut slot = self.referent.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
    pub fn is_reclaimed(&self) -> bool {
        self.get().is_none()
    }
}

// ------------- TextStoreCache -------------
#[derive(Debug)]
pub struct TextStoreCache {
    holders: DashMap<Locale, Arc<SoftRef<StoresByStyle>>>,
    capacity: usize,
}

impl TextStoreCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            holders: DashMap::new(),
            capacity: capacity.max(1),
        }
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the store for the locale and style, building every style of the
    /// locale through `populate` when there is no live holder.
    pub fn store<F>(&self, locale: &Locale, style: TextStyle, populate: F) -> Result<Option<Arc<TextStore>>>
    where
        F: FnOnce(&Locale) -> TextByStyle,
    {
        // the map guard is released before populating
        let held = self.holders.get(locale).and_then(|holder| holder.value().get());
        if let Some(stores) = held {
            trace!(%locale, ?style, "text store cache hit");
            return Ok(stores.get(&style).cloned());
        }
        let mut stores = StoresByStyle::new();
        for (text_style, value_text) in populate(locale) {
            let store = TextStore::new(locale.clone(), value_text)?;
            stores.insert(text_style, Arc::new(store));
        }
        debug!(%locale, styles = stores.len(), "populated text stores");
        let stores = Arc::new(stores);
        self.holders
            .insert(locale.clone(), Arc::new(SoftRef::new(Arc::clone(&stores))));
        self.relieve(locale);
        Ok(stores.get(&style).cloned())
    }

    // reclaims other locales once more of them are resident than the capacity allows
    fn relieve(&self, keep: &Locale) {
        if self.resident() <= self.capacity {
            return;
        }
        let victims: Vec<Arc<SoftRef<StoresByStyle>>> = self
            .holders
            .iter()
            .filter(|entry| entry.key() != keep && !entry.value().is_reclaimed())
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let excess = self.resident().saturating_sub(self.capacity);
        for holder in victims.into_iter().take(excess) {
            holder.reclaim();
        }
        self.holders.retain(|_, holder| !holder.is_reclaimed());
        debug!(capacity = self.capacity, "reclaimed text stores over capacity");
    }

    pub fn reclaim(&self, locale: &Locale) {
        if let Some(holder) = self.holders.get(locale) {
            holder.value().reclaim();
            debug!(%locale, "reclaimed text stores");
        }
    }
    pub fn reclaim_all(&self) {
        for holder in self.holders.iter() {
            holder.value().reclaim();
        }
    }
    /// Number of locales with a holder, reclaimed or not.
    pub fn tracked(&self) -> usize {
        self.holders.len()
    }
    /// Number of locales whose stores are currently held.
    pub fn resident(&self) -> usize {
        self.holders
            .iter()
            .filter(|entry| !entry.value().is_reclaimed())
            .count()
    }
}

impl Default for TextStoreCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}
