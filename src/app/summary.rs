use std::collections::HashSet;
use std::fmt;

use clap::ValueEnum;

use super::dataset::Dataset;
use super::i18n::Language;
use super::selection::{SelectionIndex, SelectionSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum PromptStyle {
    #[default]
    Normal,
    Persona,
}

impl PromptStyle {
    pub(crate) fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Persona,
            Self::Persona => Self::Normal,
        }
    }

    pub(crate) fn label(self, language: Language) -> &'static str {
        let texts = language.texts();
        match self {
            Self::Normal => texts.style_normal,
            Self::Persona => texts.style_persona,
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "normal",
            Self::Persona => "persona",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct YearGroup {
    pub(crate) year: u16,
    pub(crate) watched: Vec<String>,
    pub(crate) not_watched: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DerivedSummary {
    pub(crate) watched_titles: Vec<String>,
    pub(crate) eligible_count: usize,
    pub(crate) years: Vec<YearGroup>,
}

/// Title behind a raw stored entry, if it still points at an eligible item.
#[cfg(test)]
pub(crate) fn resolve_title<'d>(dataset: &'d Dataset, raw: &str) -> Option<&'d str> {
    let index: SelectionIndex = raw.parse().ok()?;
    dataset
        .eligible_record(index)
        .map(|record| record.title.as_str())
}

pub(crate) fn derive_summary(dataset: &Dataset, selection: &SelectionSet) -> DerivedSummary {
    let mut seen = HashSet::new();
    let watched_titles: Vec<String> = selection
        .indices()
        .filter(|index| seen.insert(*index))
        .filter_map(|index| dataset.eligible_record(index))
        .map(|record| record.title.clone())
        .collect();

    let watched_lookup: HashSet<&str> = watched_titles.iter().map(String::as_str).collect();
    let years = dataset
        .years()
        .filter_map(|year| {
            let items = dataset.eligible_items(year);
            if items.is_empty() {
                return None;
            }
            let (watched, not_watched): (Vec<_>, Vec<_>) = items
                .iter()
                .map(|record| record.title.clone())
                .partition(|title| watched_lookup.contains(title.as_str()));
            Some(YearGroup {
                year,
                watched,
                not_watched,
            })
        })
        .collect();

    DerivedSummary {
        watched_titles,
        eligible_count: dataset.eligible_count(),
        years,
    }
}

pub(crate) fn build_prompt(
    summary: &DerivedSummary,
    language: Language,
    style: PromptStyle,
) -> String {
    let texts = language.texts();
    let template = match style {
        PromptStyle::Normal => texts.prompt_normal,
        PromptStyle::Persona => texts.prompt_persona,
    };

    let blocks: Vec<String> = summary
        .years
        .iter()
        .map(|group| {
            format!(
                "{}\n{}{}{}\n{}{}{}",
                texts.year_header(group.year),
                texts.watched,
                texts.label_separator,
                join_titles(&group.watched, language),
                texts.not_watched,
                texts.label_separator,
                join_titles(&group.not_watched, language),
            )
        })
        .collect();

    format!("{template}\n\n{}", blocks.join("\n\n"))
}

fn join_titles(titles: &[String], language: Language) -> String {
    let texts = language.texts();
    if titles.is_empty() {
        texts.none.to_string()
    } else {
        titles.join(texts.title_separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_titles(vec![(2020, vec!["A", "B"])])
    }

    #[test]
    fn example_selection_resolves_and_groups() {
        let selection = SelectionSet::from_entries(["2020-0"]);
        let summary = derive_summary(&sample(), &selection);

        assert_eq!(summary.watched_titles, vec!["A"]);
        assert_eq!(summary.eligible_count, 2);
        assert_eq!(
            summary.years,
            vec![YearGroup {
                year: 2020,
                watched: vec!["A".to_string()],
                not_watched: vec!["B".to_string()],
            }]
        );
    }

    #[test]
    fn prompt_block_lists_watched_and_not_watched() {
        let selection = SelectionSet::from_entries(["2020-0"]);
        let summary = derive_summary(&sample(), &selection);
        let prompt = build_prompt(&summary, Language::En, PromptStyle::Normal);

        assert!(prompt.starts_with(Language::En.texts().prompt_normal));
        assert!(prompt.ends_with("2020\nWatched: A\nNot watched: B"));
    }

    #[test]
    fn prompt_styles_share_the_year_listing() {
        let dataset = Dataset::from_titles(vec![(2019, vec!["X"]), (2020, vec!["A", "B"])]);
        let selection = SelectionSet::from_entries(["2020-1"]);
        let summary = derive_summary(&dataset, &selection);

        let normal = build_prompt(&summary, Language::Zh, PromptStyle::Normal);
        let persona = build_prompt(&summary, Language::Zh, PromptStyle::Persona);
        let texts = Language::Zh.texts();
        let normal_listing = normal.strip_prefix(texts.prompt_normal).unwrap();
        let persona_listing = persona.strip_prefix(texts.prompt_persona).unwrap();

        assert_eq!(normal_listing, persona_listing);
        assert_eq!(
            normal_listing,
            "\n\n2019年\n看过：无\n没看过：X\n\n2020年\n看过：B\n没看过：A"
        );
    }

    #[test]
    fn years_without_eligible_items_are_omitted() {
        let dataset = Dataset::from_titles(vec![(2018, vec![]), (2020, vec!["A"])]);
        let summary = derive_summary(&dataset, &SelectionSet::default());
        assert_eq!(summary.years.len(), 1);
        assert_eq!(summary.years[0].year, 2020);

        let prompt = build_prompt(&summary, Language::En, PromptStyle::Normal);
        assert!(!prompt.contains("2018"));
    }

    #[test]
    fn unknown_year_is_silently_dropped() {
        let selection = SelectionSet::from_entries(["1999-5", "2020-1"]);
        let summary = derive_summary(&sample(), &selection);
        assert_eq!(summary.watched_titles, vec!["B"]);
        assert_eq!(resolve_title(&sample(), "1999-5"), None);
    }

    #[test]
    fn malformed_and_out_of_range_entries_resolve_to_nothing() {
        let titles: Vec<String> = (0..14).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let dataset = Dataset::from_titles(vec![(2020, refs)]);
        let selection =
            SelectionSet::from_entries(["oops", "2020-13", "2020-12", "2020-99", "2020-11"]);

        let summary = derive_summary(&dataset, &selection);
        assert_eq!(summary.watched_titles, vec!["T11"]);
        assert_eq!(summary.eligible_count, 12);
    }

    #[test]
    fn watched_list_never_exceeds_eligible_count() {
        let dataset = sample();
        let selection =
            SelectionSet::from_entries(["2020-0", "2020-1", "2020-0", "2020-01", "2020-1"]);
        let summary = derive_summary(&dataset, &selection);
        assert_eq!(summary.watched_titles, vec!["A", "B"]);
        assert!(summary.watched_titles.len() <= summary.eligible_count);
    }

    #[test]
    fn every_valid_index_resolves_to_its_title() {
        let dataset = Dataset::from_titles(vec![
            (2020, vec!["A", "B", "C"]),
            (2021, vec!["D"]),
        ]);
        for index in dataset.eligible_indices() {
            let expected = &dataset.eligible_items(index.year)[index.position].title;
            assert_eq!(
                resolve_title(&dataset, &index.to_string()),
                Some(expected.as_str())
            );
        }
    }

    #[test]
    fn watched_titles_follow_selection_order() {
        let dataset = Dataset::from_titles(vec![(2020, vec!["A", "B", "C"])]);
        let selection = SelectionSet::from_entries(["2020-2", "2020-0"]);
        let summary = derive_summary(&dataset, &selection);
        assert_eq!(summary.watched_titles, vec!["C", "A"]);
        assert_eq!(summary.years[0].watched, vec!["A", "C"]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let dataset = sample();
        let selection = SelectionSet::from_entries(["2020-1"]);
        assert_eq!(
            derive_summary(&dataset, &selection),
            derive_summary(&dataset, &selection)
        );
    }
}
