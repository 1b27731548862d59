use super::{ActiveNode, ActiveTree};
use crate::store::{Answer, ResponseStore};
use std::fmt;

/// Renders the active tree with the answers currently held in the store.
pub struct DisplayTree<'a, 'f> {
    pub tree: &'a ActiveTree<'f>,
    pub store: &'a ResponseStore,
}

impl fmt::Display for DisplayTree<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let roots = self.children_of(None);
        for (i, &pos) in roots.iter().enumerate() {
            self.fmt_as_tree(pos, f, "", i + 1 == roots.len())?;
        }
        Ok(())
    }
}

impl DisplayTree<'_, '_> {
    /// Positions of the direct children of the node at `parent` (roots for `None`).
    fn children_of(&self, parent: Option<usize>) -> Vec<usize> {
        let nodes = self.tree.nodes();
        let (start, depth) = match parent {
            Some(pos) => (pos + 1, nodes[pos].depth + 1),
            None => (0, 0),
        };
        nodes[start..]
            .iter()
            .enumerate()
            .take_while(|(_, node)| node.depth >= depth)
            .filter(|(_, node)| node.depth == depth)
            .map(|(offset, _)| start + offset)
            .collect()
    }

    fn fmt_as_tree(
        &self,
        pos: usize,
        f: &mut fmt::Formatter<'_>,
        prefix: &str,
        is_last: bool,
    ) -> fmt::Result {
        let node = &self.tree.nodes()[pos];
        let node_marker = if is_last { "└── " } else { "├── " };
        write!(f, "{}{}", prefix, node_marker)?;
        self.fmt_line(node, f)?;

        let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
        let children = self.children_of(Some(pos));
        for (i, &child) in children.iter().enumerate() {
            self.fmt_as_tree(child, f, &child_prefix, i + 1 == children.len())?;
        }
        Ok(())
    }

    fn fmt_line(&self, node: &ActiveNode<'_>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", node.node.name)?;
        if node.node.required {
            write!(f, " *")?;
        }
        for (field_type, key) in &node.slots {
            let answer = self.store.get(key.as_str()).map(|r| &r.answer);
            write!(f, " [{}: {}]", field_type, AnswerDisplay(answer))?;
        }
        if let Some(rule) = node.matched_rule {
            write!(f, " -> rule #{}", rule)?;
        }
        writeln!(f)
    }
}

struct AnswerDisplay<'a>(Option<&'a Answer>);

impl fmt::Display for AnswerDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            None | Some(Answer::Empty) => write!(f, "-"),
            Some(Answer::Text(text)) if text.is_empty() => write!(f, "-"),
            Some(Answer::Text(text)) => write!(f, "\"{}\"", text),
            Some(Answer::Status(status)) => write!(f, "{}", status),
            Some(Answer::Measurement { value, status }) => {
                match value {
                    Some(v) => write!(f, "{}", v)?,
                    None => write!(f, "-")?,
                }
                if let Some(status) = status {
                    write!(f, " ({})", status)?;
                }
                Ok(())
            }
        }
    }
}
