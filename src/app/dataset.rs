use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::config::DatasetConfig;

use super::i18n::Language;
use super::selection::SelectionIndex;

/// Only the first entries of each year are shown, counted and selectable.
pub(crate) const VISIBLE_PER_YEAR: usize = 12;

const BUILTIN_EN: &str = include_str!("../../data/anime-en.json");
const BUILTIN_ZH: &str = include_str!("../../data/anime-zh.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct AnimeRecord {
    pub(crate) title: String,
}

/// Year-bucketed title table for one language. Years iterate ascending.
#[derive(Debug, Clone, Default)]
pub(crate) struct Dataset {
    years: BTreeMap<u16, Vec<AnimeRecord>>,
}

impl Dataset {
    pub(crate) fn from_json(raw: &str) -> Result<Self> {
        let years: BTreeMap<u16, Vec<AnimeRecord>> =
            serde_json::from_str(raw).context("dataset is not a year -> [{title}] map")?;
        Ok(Self { years })
    }

    pub(crate) fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read dataset {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid dataset {}", path.display()))
    }

    #[cfg(test)]
    pub(crate) fn from_titles(years: Vec<(u16, Vec<&str>)>) -> Self {
        let years = years
            .into_iter()
            .map(|(year, titles)| {
                let records = titles
                    .into_iter()
                    .map(|title| AnimeRecord {
                        title: title.to_string(),
                    })
                    .collect();
                (year, records)
            })
            .collect();
        Self { years }
    }

    pub(crate) fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.years.keys().copied()
    }

    /// The displayed slice of a year; empty when the year is unknown.
    pub(crate) fn eligible_items(&self, year: u16) -> &[AnimeRecord] {
        match self.years.get(&year) {
            Some(records) => &records[..records.len().min(VISIBLE_PER_YEAR)],
            None => &[],
        }
    }

    pub(crate) fn eligible_record(&self, index: SelectionIndex) -> Option<&AnimeRecord> {
        self.eligible_items(index.year).get(index.position)
    }

    pub(crate) fn eligible_count(&self) -> usize {
        self.years().map(|year| self.eligible_items(year).len()).sum()
    }

    pub(crate) fn eligible_indices(&self) -> impl Iterator<Item = SelectionIndex> + '_ {
        self.years().flat_map(move |year| {
            (0..self.eligible_items(year).len())
                .map(move |position| SelectionIndex::new(year, position))
        })
    }
}

/// Both language tables, loaded once at startup.
#[derive(Debug, Clone)]
pub(crate) struct Catalog {
    en: Dataset,
    zh: Dataset,
}

impl Catalog {
    #[cfg(test)]
    pub(crate) fn new(en: Dataset, zh: Dataset) -> Self {
        Self { en, zh }
    }

    #[cfg(test)]
    pub(crate) fn builtin() -> Result<Self> {
        Self::load(&DatasetConfig::default())
    }

    pub(crate) fn load(config: &DatasetConfig) -> Result<Self> {
        Ok(Self {
            en: load_language(Language::En, config.en.as_deref(), BUILTIN_EN)?,
            zh: load_language(Language::Zh, config.zh.as_deref(), BUILTIN_ZH)?,
        })
    }

    pub(crate) fn for_language(&self, language: Language) -> &Dataset {
        match language {
            Language::En => &self.en,
            Language::Zh => &self.zh,
        }
    }
}

fn load_language(language: Language, path: Option<&Path>, builtin: &str) -> Result<Dataset> {
    match path {
        Some(path) => {
            info!(%language, path = %path.display(), "loading dataset override");
            Dataset::from_file(path)
        }
        None => Dataset::from_json(builtin)
            .with_context(|| format!("embedded dataset for '{language}' is invalid")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_reads_year_keys_in_ascending_order() {
        let dataset = Dataset::from_json(
            r#"{"2021": [{"title": "B"}], "2009": [{"title": "A"}], "2015": []}"#,
        )
        .expect("dataset should parse");
        assert_eq!(dataset.years().collect::<Vec<_>>(), vec![2009, 2015, 2021]);
        assert_eq!(dataset.eligible_items(2021)[0].title, "B");
    }

    #[test]
    fn from_json_rejects_non_year_keys() {
        assert!(Dataset::from_json(r#"{"latest": [{"title": "A"}]}"#).is_err());
    }

    #[test]
    fn eligible_items_caps_each_year() {
        let titles: Vec<String> = (0..15).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let dataset =
            Dataset::from_titles(vec![(2001, refs), (2002, vec!["X", "Y"]), (2003, vec![])]);

        assert_eq!(dataset.eligible_items(2001).len(), VISIBLE_PER_YEAR);
        assert_eq!(dataset.eligible_items(2002).len(), 2);
        assert!(dataset.eligible_items(2003).is_empty());
        assert!(dataset.eligible_items(1999).is_empty());
        assert_eq!(dataset.eligible_count(), VISIBLE_PER_YEAR + 2);
    }

    #[test]
    fn eligible_record_ignores_positions_past_the_cap() {
        let titles: Vec<String> = (0..14).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let dataset = Dataset::from_titles(vec![(2001, refs)]);

        assert_eq!(
            dataset
                .eligible_record(SelectionIndex::new(2001, 11))
                .map(|r| r.title.as_str()),
            Some("T11")
        );
        assert!(dataset.eligible_record(SelectionIndex::new(2001, 12)).is_none());
    }

    #[test]
    fn eligible_indices_walk_years_then_positions() {
        let dataset = Dataset::from_titles(vec![(2020, vec!["A", "B"]), (2019, vec!["C"])]);
        let indices: Vec<String> = dataset.eligible_indices().map(|i| i.to_string()).collect();
        assert_eq!(indices, vec!["2019-0", "2020-0", "2020-1"]);
    }

    #[test]
    fn builtin_catalog_has_matching_years_per_language() {
        let catalog = Catalog::builtin().expect("embedded datasets should parse");
        let en = catalog.for_language(Language::En);
        let zh = catalog.for_language(Language::Zh);
        assert_eq!(en.years().collect::<Vec<_>>(), zh.years().collect::<Vec<_>>());
        assert_eq!(en.eligible_count(), zh.eligible_count());
        assert!(en.eligible_count() > 0);
    }
}
