use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::KeyValueStore;

use super::dataset::Dataset;
use super::i18n::Language;

pub(crate) const SELECTION_KEY: &str = "selectedAnimeIndices";
pub(crate) const LANGUAGE_KEY: &str = "language";

/// Addresses one dataset entry as `<year>-<position>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct SelectionIndex {
    pub(crate) year: u16,
    pub(crate) position: usize,
}

impl SelectionIndex {
    pub(crate) fn new(year: u16, position: usize) -> Self {
        Self { year, position }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid anime index '{raw}': expected <year>-<position>")]
pub(crate) struct ParseIndexError {
    raw: String,
}

impl FromStr for SelectionIndex {
    type Err = ParseIndexError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let err = || ParseIndexError {
            raw: raw.to_string(),
        };
        let (year, position) = raw.split_once('-').ok_or_else(err)?;
        if !is_digits(year) || !is_digits(position) {
            return Err(err());
        }
        Ok(Self {
            year: year.parse().map_err(|_| err())?,
            position: position.parse().map_err(|_| err())?,
        })
    }
}

fn is_digits(part: &str) -> bool {
    !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit())
}

impl fmt::Display for SelectionIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.position)
    }
}

/// Selected indices in insertion order, stored verbatim. Entries that no
/// longer parse or resolve stay until toggled off or cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct SelectionSet {
    entries: Vec<String>,
}

impl SelectionSet {
    pub(crate) fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[String] {
        &self.entries
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Matches on the parsed index, so `"2020-01"` counts as `"2020-1"`.
    pub(crate) fn contains(&self, index: SelectionIndex) -> bool {
        self.indices().any(|entry| entry == index)
    }

    /// Removes every entry equal to the index when present, appends it
    /// otherwise.
    pub(crate) fn toggled(&self, index: SelectionIndex) -> Self {
        if self.contains(index) {
            Self {
                entries: self
                    .entries
                    .iter()
                    .filter(|entry| entry.parse::<SelectionIndex>().ok() != Some(index))
                    .cloned()
                    .collect(),
            }
        } else {
            let mut entries = self.entries.clone();
            entries.push(index.to_string());
            Self { entries }
        }
    }

    pub(crate) fn all_eligible(dataset: &Dataset) -> Self {
        Self::from_entries(dataset.eligible_indices().map(|index| index.to_string()))
    }

    /// Parsed view of the entries; malformed ones are skipped.
    pub(crate) fn indices(&self) -> impl Iterator<Item = SelectionIndex> + '_ {
        self.entries.iter().filter_map(|entry| entry.parse().ok())
    }
}

/// A value mirrored into a [`KeyValueStore`] entry as JSON.
#[derive(Debug)]
pub(crate) struct PersistedValue<T> {
    key: &'static str,
    value: T,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Restores the stored value. Anything that does not decode as `T`
    /// falls back to `default`; decoded values are not validated.
    pub(crate) fn load(store: &dyn KeyValueStore, key: &'static str, default: T) -> Result<Self> {
        let value = match store.get_raw(key)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!(key, error = %err, "discarding unreadable stored value");
                    default
                }
            },
            None => default,
        };
        Ok(Self { key, value })
    }

    pub(crate) fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value with `updater(previous)`. The store is written
    /// first; on a failed write the in-memory value stays unchanged.
    pub(crate) fn set<F>(&mut self, store: &dyn KeyValueStore, updater: F) -> Result<()>
    where
        F: FnOnce(&T) -> T,
    {
        let next = updater(&self.value);
        let raw = serde_json::to_string(&next)?;
        store.set_raw(self.key, &raw)?;
        self.value = next;
        debug!(key = self.key, "persisted state");
        Ok(())
    }
}

/// Selection and language, owned by whichever front end is running.
pub(crate) struct AppState<'s> {
    store: &'s dyn KeyValueStore,
    selection: PersistedValue<SelectionSet>,
    language: PersistedValue<Language>,
}

impl<'s> AppState<'s> {
    pub(crate) fn load(store: &'s dyn KeyValueStore) -> Result<Self> {
        Ok(Self {
            store,
            selection: PersistedValue::load(store, SELECTION_KEY, SelectionSet::default())?,
            language: PersistedValue::load(store, LANGUAGE_KEY, Language::default())?,
        })
    }

    pub(crate) fn selection(&self) -> &SelectionSet {
        self.selection.get()
    }

    pub(crate) fn language(&self) -> Language {
        *self.language.get()
    }

    pub(crate) fn is_selected(&self, index: SelectionIndex) -> bool {
        self.selection().contains(index)
    }

    pub(crate) fn toggle(&mut self, index: SelectionIndex) -> Result<()> {
        self.selection
            .set(self.store, |previous| previous.toggled(index))
    }

    pub(crate) fn select_all(&mut self, dataset: &Dataset) -> Result<()> {
        self.selection
            .set(self.store, |_| SelectionSet::all_eligible(dataset))
    }

    pub(crate) fn clear(&mut self) -> Result<()> {
        self.selection.set(self.store, |_| SelectionSet::default())
    }

    pub(crate) fn set_language(&mut self, language: Language) -> Result<()> {
        self.language.set(self.store, |_| language)
    }

    pub(crate) fn toggle_language(&mut self) -> Result<()> {
        self.language.set(self.store, |previous| previous.other())
    }
}
