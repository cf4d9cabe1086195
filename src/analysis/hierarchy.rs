//! Outline tree reconstruction from a flat candidate sequence.

use crate::model::{HeadingCandidate, HeadingLevel, OutlineNode};

/// Path to a node: index among the roots, then among children.
type NodePath = Vec<usize>;

fn node_at<'a>(roots: &'a mut [OutlineNode], path: &[usize]) -> Option<&'a mut OutlineNode> {
    let (first, rest) = path.split_first()?;
    let mut node = roots.get_mut(*first)?;
    for index in rest {
        node = node.children.get_mut(*index)?;
    }
    Some(node)
}

/// Append `node` under `parent` (or at the root) and return its path.
fn attach(roots: &mut Vec<OutlineNode>, parent: Option<&NodePath>, node: OutlineNode) -> NodePath {
    if let Some(path) = parent {
        if let Some(parent_node) = node_at(roots, path) {
            parent_node.children.push(node);
            let mut child_path = path.clone();
            child_path.push(parent_node.children.len() - 1);
            return child_path;
        }
    }
    roots.push(node);
    vec![roots.len() - 1]
}

/// Build the outline forest.
///
/// Candidates are ordered by (page, top), keeping input order on ties. An
/// H1 opens a new top-level node, an H2 nests under the current H1, an H3
/// under the current H2 (or H1). Any other level sits at the top level.
pub fn assemble(mut candidates: Vec<HeadingCandidate>) -> Vec<OutlineNode> {
    candidates.sort_by(|a, b| a.page.cmp(&b.page).then(a.top.total_cmp(&b.top)));

    let mut roots: Vec<OutlineNode> = Vec::new();
    let mut current_h1: Option<NodePath> = None;
    let mut current_h2: Option<NodePath> = None;

    for candidate in candidates {
        let level = candidate.level;
        let node = OutlineNode::from(candidate);
        match level {
            HeadingLevel::H1 => {
                current_h1 = Some(attach(&mut roots, None, node));
                current_h2 = None;
            }
            HeadingLevel::H2 => {
                current_h2 = Some(attach(&mut roots, current_h1.as_ref(), node));
            }
            HeadingLevel::H3 => {
                let parent = current_h2.as_ref().or(current_h1.as_ref());
                attach(&mut roots, parent, node);
            }
            _ => {
                attach(&mut roots, None, node);
            }
        }
    }

    roots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(level: HeadingLevel, text: &str, page: u32, top: f32) -> HeadingCandidate {
        HeadingCandidate::new(level, text, page, top)
    }

    #[test]
    fn test_h1_h2_h3_nest() {
        let roots = assemble(vec![
            cand(HeadingLevel::H1, "Chapter", 1, 10.0),
            cand(HeadingLevel::H2, "Section", 1, 20.0),
            cand(HeadingLevel::H3, "Detail", 1, 30.0),
        ]);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].children[0].text, "Section");
        assert_eq!(roots[0].children[0].children[0].text, "Detail");
    }

    #[test]
    fn test_orphans_go_top_level() {
        let roots = assemble(vec![
            cand(HeadingLevel::H3, "Orphan detail", 1, 10.0),
            cand(HeadingLevel::H2, "Orphan section", 1, 20.0),
            cand(HeadingLevel::H3, "Under section", 1, 30.0),
        ]);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0].text, "Orphan detail");
        assert_eq!(roots[1].children[0].text, "Under section");
    }

    #[test]
    fn test_h3_falls_back_to_h1() {
        let roots = assemble(vec![
            cand(HeadingLevel::H1, "One", 1, 10.0),
            cand(HeadingLevel::H2, "One.A", 1, 20.0),
            cand(HeadingLevel::H1, "Two", 2, 10.0),
            cand(HeadingLevel::H3, "Two detail", 2, 20.0),
        ]);
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[1].children.len(), 1);
        assert_eq!(roots[1].children[0].level, HeadingLevel::H3);
    }

    #[test]
    fn test_h4_and_title_are_top_level() {
        let roots = assemble(vec![
            cand(HeadingLevel::H1, "Chapter", 1, 10.0),
            cand(HeadingLevel::H2, "Section", 1, 20.0),
            cand(HeadingLevel::H4, "1.1.1.1 Deep item here", 1, 30.0),
            cand(HeadingLevel::Title, "Cover", 1, 40.0),
            cand(HeadingLevel::H3, "Still under section", 1, 50.0),
        ]);
        let texts: Vec<_> = roots.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, vec!["Chapter", "1.1.1.1 Deep item here", "Cover"]);
        // H4 does not reset the pointers.
        assert_eq!(roots[0].children[0].children[0].text, "Still under section");
    }

    #[test]
    fn test_sorted_by_page_then_top() {
        let roots = assemble(vec![
            cand(HeadingLevel::H2, "Later", 2, 5.0),
            cand(HeadingLevel::H1, "First", 1, 50.0),
            cand(HeadingLevel::H2, "Tied A", 1, 60.0),
            cand(HeadingLevel::H2, "Tied B", 1, 60.0),
        ]);
        assert_eq!(roots.len(), 1);
        let children: Vec<_> = roots[0].children.iter().map(|n| n.text.as_str()).collect();
        assert_eq!(children, vec!["Tied A", "Tied B", "Later"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(assemble(Vec::new()).is_empty());
    }
}
