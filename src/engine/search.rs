//! # Namespace Search
//!
//! Map requested variable names to datasets inside one file.
//!
//! Datasets match on their local name (the path after the last `/`), so
//! `/ctd/temperature` answers for `temperature`. When the same local name
//! appears in several groups, the last dataset visited wins.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::ports::{ArraySource, Node, NodeVisitor};

/// Variable name to dataset handle
pub type VariableMap = HashMap<String, Arc<dyn ArraySource>>;

/// Find every dataset under `nodes` whose local name is in `names`
pub fn find_variables<S: AsRef<str>>(nodes: &[Node], names: &[S]) -> VariableMap {
    let mut search = Search {
        names,
        found: VariableMap::new(),
    };
    for node in nodes {
        node.accept(&mut search);
    }
    search.found
}

struct Search<'a, S> {
    names: &'a [S],
    found: VariableMap,
}

impl<S: AsRef<str>> NodeVisitor for Search<'_, S> {
    fn visit_array(&mut self, array: &Arc<dyn ArraySource>) {
        let local = array.local_name();
        if !self.names.iter().any(|n| n.as_ref() == local) {
            return;
        }

        if let Some(previous) = self.found.insert(local.to_string(), Arc::clone(array)) {
            debug!(
                variable = local,
                replaced = previous.name(),
                by = array.name(),
                "variable found in more than one group, keeping the last"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryArray;
    use crate::ports::Group;

    fn array(path: &str) -> Node {
        Node::Array(Arc::new(MemoryArray::new(path, vec![1], vec![0.0])))
    }

    #[test]
    fn test_find_top_level_and_nested() {
        let nodes = vec![
            array("/temperature"),
            Node::Group(
                Group::new("/ctd")
                    .with_child(array("/ctd/salinity"))
                    .with_child(Node::Group(
                        Group::new("/ctd/deep").with_child(array("/ctd/deep/pressure")),
                    )),
            ),
            array("/time"),
        ];

        let found = find_variables(&nodes, &["temperature", "salinity", "pressure"]);
        assert_eq!(found.len(), 3);
        assert_eq!(found["pressure"].name(), "/ctd/deep/pressure");
        assert!(!found.contains_key("time"));
    }

    #[test]
    fn test_last_match_wins() {
        let nodes = vec![
            Node::Group(Group::new("/a").with_child(array("/a/temperature"))),
            Node::Group(Group::new("/b").with_child(array("/b/temperature"))),
        ];
        let found = find_variables(&nodes, &["temperature"]);
        assert_eq!(found["temperature"].name(), "/b/temperature");
    }

    #[test]
    fn test_nothing_requested_found() {
        let nodes = vec![array("/time"), Node::Group(Group::new("/empty"))];
        assert!(find_variables(&nodes, &["temperature"]).is_empty());
    }

    #[test]
    fn test_group_names_do_not_match() {
        let nodes = vec![Node::Group(Group::new("/temperature"))];
        assert!(find_variables(&nodes, &["temperature".to_string()]).is_empty());
    }
}
