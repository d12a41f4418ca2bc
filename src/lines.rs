//! Producer turning a text source into a flat tree of line nodes.

use std::fmt::{self, Display};

use crate::{Forest, NodeIndex};

/// Weight of a node produced by [`line_tree`].
///
/// The root carries the source name and an empty line; each child carries one
/// line of the source, its zero-based `lineno` and the one-based line number
/// as its display `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWeight {
    pub name: String,
    pub lineno: usize,
    pub line: String,
}

impl Display for LineWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Builds a root named `name` with one child per line of `text`, in source
/// order, and returns the root.
pub fn line_tree(forest: &mut Forest<LineWeight>, name: &str, text: &str) -> NodeIndex {
    let root = forest.add_node(LineWeight {
        name: name.to_owned(),
        lineno: 0,
        line: String::new(),
    });

    for (lineno, line) in text.lines().enumerate() {
        let node = forest.add_node(LineWeight {
            name: (lineno + 1).to_string(),
            lineno,
            line: line.to_owned(),
        });
        forest
            .attach(root, node)
            .expect("a fresh node is detached and acyclic");
    }

    root
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn one_child_per_line_in_source_order() {
        let mut forest = Forest::new();
        let root = line_tree(&mut forest, "demo.txt", "alpha\nbeta\ngamma");

        assert_eq!(forest[root].name, "demo.txt");
        assert_eq!(forest.child_count(root), 3);

        let lines: Vec<_> = forest
            .children(root)
            .map(|child| (forest[child].lineno, forest[child].line.clone()))
            .collect();
        assert_eq!(
            lines,
            vec![
                (0, "alpha".to_owned()),
                (1, "beta".to_owned()),
                (2, "gamma".to_owned())
            ]
        );

        let second = forest.child_at(root, 1).unwrap();
        assert_eq!(forest[second].name, "2");
        assert_eq!(forest.parent(second), Some(root));
    }

    #[test]
    fn empty_source_builds_a_bare_root() {
        let mut forest = Forest::new();
        let root = line_tree(&mut forest, "empty", "");

        assert_eq!(forest.child_count(root), 0);
        assert!(forest.is_root(root));
    }
}
