use super::super::dataset::Dataset;
use super::super::i18n::Language;
use super::super::selection::{SelectionIndex, SelectionSet};
use super::super::summary::DerivedSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Region,
    Header,
    Title(String),
    Subtitle(String),
    Site(String),
    LanguageToggle(String),
    Counter(String),
    YearRow(u16),
    Tile { title: String, selected: bool },
}

/// One element of the shareable card. Nodes with `exportable == false`
/// are interactive-only and are dropped by the default capture filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CaptureNode {
    pub(crate) kind: NodeKind,
    pub(crate) exportable: bool,
    pub(crate) children: Vec<CaptureNode>,
}

impl CaptureNode {
    pub(crate) fn leaf(kind: NodeKind) -> Self {
        Self {
            kind,
            exportable: true,
            children: Vec::new(),
        }
    }

    pub(crate) fn parent(kind: NodeKind, children: Vec<CaptureNode>) -> Self {
        Self {
            kind,
            exportable: true,
            children,
        }
    }

    pub(crate) fn non_exportable(mut self) -> Self {
        self.exportable = false;
        self
    }

    /// Copy of the tree without nodes rejected by `filter`; a rejected
    /// node takes its descendants with it.
    pub(crate) fn prune(&self, filter: fn(&CaptureNode) -> bool) -> Option<CaptureNode> {
        if !filter(self) {
            return None;
        }
        Some(CaptureNode {
            kind: self.kind.clone(),
            exportable: self.exportable,
            children: self
                .children
                .iter()
                .filter_map(|child| child.prune(filter))
                .collect(),
        })
    }

    #[cfg(test)]
    pub(crate) fn any(&self, predicate: &dyn Fn(&CaptureNode) -> bool) -> bool {
        predicate(self) || self.children.iter().any(|child| child.any(predicate))
    }
}

pub(crate) fn build_capture_region(
    dataset: &Dataset,
    selection: &SelectionSet,
    language: Language,
    summary: &DerivedSummary,
) -> CaptureNode {
    let texts = language.texts();
    let header = CaptureNode::parent(
        NodeKind::Header,
        vec![
            CaptureNode::leaf(NodeKind::Title(texts.app_title.to_string())),
            CaptureNode::leaf(NodeKind::Subtitle(format!(" - {}", texts.subtitle))).non_exportable(),
            CaptureNode::leaf(NodeKind::Site(texts.site_label.to_string())),
            CaptureNode::leaf(NodeKind::LanguageToggle(texts.language_toggle.to_string()))
                .non_exportable(),
            CaptureNode::leaf(NodeKind::Counter(
                texts.counter(summary.watched_titles.len(), summary.eligible_count),
            )),
        ],
    );

    let mut children = vec![header];
    for year in dataset.years() {
        let tiles = dataset
            .eligible_items(year)
            .iter()
            .enumerate()
            .map(|(position, record)| {
                CaptureNode::leaf(NodeKind::Tile {
                    title: record.title.clone(),
                    selected: selection.contains(SelectionIndex::new(year, position)),
                })
            })
            .collect();
        children.push(CaptureNode::parent(NodeKind::YearRow(year), tiles));
    }

    CaptureNode::parent(NodeKind::Region, children)
}

#[cfg(test)]
mod tests {
    use super::super::exportable_only;
    use super::*;
    use crate::app::summary::derive_summary;

    fn region() -> CaptureNode {
        let dataset = Dataset::from_titles(vec![(2020, vec!["A", "B"]), (2021, vec!["C"])]);
        let selection = SelectionSet::from_entries(["2020-1"]);
        let summary = derive_summary(&dataset, &selection);
        build_capture_region(&dataset, &selection, Language::En, &summary)
    }

    #[test]
    fn region_has_header_and_one_row_per_year() {
        let root = region();
        assert_eq!(root.kind, NodeKind::Region);
        assert_eq!(root.children.len(), 3);
        assert_eq!(root.children[1].kind, NodeKind::YearRow(2020));
        assert_eq!(
            root.children[1].children[1].kind,
            NodeKind::Tile {
                title: "B".to_string(),
                selected: true
            }
        );
        assert!(root.any(&|node| node.kind == NodeKind::Counter("I've watched 1/3 anime".into())));
    }

    #[test]
    fn default_filter_drops_interactive_nodes() {
        let root = region();
        assert!(root.any(&|node| matches!(node.kind, NodeKind::Subtitle(_))));

        let pruned = root.prune(exportable_only).expect("root is exportable");
        assert!(!pruned.any(&|node| matches!(node.kind, NodeKind::Subtitle(_))));
        assert!(!pruned.any(&|node| matches!(node.kind, NodeKind::LanguageToggle(_))));
        assert!(pruned.any(&|node| matches!(node.kind, NodeKind::Counter(_))));
    }

    #[test]
    fn pruning_a_parent_removes_its_children() {
        let root = region();
        fn no_rows(node: &CaptureNode) -> bool {
            !matches!(node.kind, NodeKind::YearRow(_))
        }
        let pruned = root.prune(no_rows).expect("root survives");
        assert_eq!(pruned.children.len(), 1);
        assert!(!pruned.any(&|node| matches!(node.kind, NodeKind::Tile { .. })));
    }
}
