//! The two-pass walk of one record against the config tree.

use tracing::trace;
use xmlsql_model::{ColumnRef, ConfigNode, ConfigTree, Row, XmlElement};

use crate::accumulator::TableAccumulator;
use crate::error::RecordError;
use crate::namespace::NamespaceNormalizer;

/// Walks record subtrees against a compiled [`ConfigTree`].
///
/// The walker borrows the tree and normalizer and holds no per-record state, so one instance
/// can be shared across threads.
#[derive(Debug, Clone, Copy)]
pub struct RecordWalker<'a> {
    tree: &'a ConfigTree,
    normalizer: &'a NamespaceNormalizer,
}

impl<'a> RecordWalker<'a> {
    pub fn new(tree: &'a ConfigTree, normalizer: &'a NamespaceNormalizer) -> Self {
        Self { tree, normalizer }
    }

    /// Converts one record into rows, root row first.
    pub fn walk(&self, record: &XmlElement, file_number: &str) -> Result<Vec<Row>, RecordError> {
        let identifier = self.resolve_identifier(record)?;
        let mut accumulator = TableAccumulator::new(identifier);
        let mut visit = Visit {
            normalizer: self.normalizer,
            root_table: &self.tree.root_table,
            file_number,
            accumulator: &mut accumulator,
        };
        visit.element(record, &self.tree.root);
        Ok(accumulator.finish())
    }

    /// First pass: the text of the single element at the identifier path.
    pub fn resolve_identifier(&self, record: &XmlElement) -> Result<String, RecordError> {
        let mut frontier = vec![record];
        for tag in &self.tree.identifier_path {
            frontier = frontier
                .into_iter()
                .flat_map(XmlElement::child_elements)
                .filter(|child| self.normalizer.normalize(&child.name) == tag)
                .collect();
        }

        let path = || {
            if self.tree.identifier_path.is_empty() {
                self.tree.record_tag().to_string()
            } else {
                self.tree.identifier_path.join("/")
            }
        };
        match frontier.as_slice() {
            [element] => element
                .text()
                .ok_or_else(|| RecordError::MissingIdentifier { path: path() }),
            [] => Err(RecordError::MissingIdentifier { path: path() }),
            many => Err(RecordError::AmbiguousIdentifier {
                path: path(),
                count: many.len(),
            }),
        }
    }
}

/// Second pass state: co-walks XML and config, filling the accumulator.
struct Visit<'w> {
    normalizer: &'w NamespaceNormalizer,
    root_table: &'w str,
    file_number: &'w str,
    accumulator: &'w mut TableAccumulator,
}

impl Visit<'_> {
    fn element(&mut self, element: &XmlElement, node: &ConfigNode) {
        if node.is_routing_only() {
            self.children(element, node);
            return;
        }

        let opened = node.table.as_deref().map(|table| {
            let inherited = if table == self.root_table {
                Vec::new()
            } else {
                self.accumulator.enclosing_keys()
            };
            let counter = node.counter.as_ref().map(ColumnRef::column);
            self.accumulator.open_row(table, counter, inherited)
        });

        if let Some(column) = &node.file_number {
            self.write(column, self.file_number);
        }

        for (name, value) in &element.attributes {
            if let Some(binding) = node.attributes.get(name) {
                self.write(&binding.column, value);
            }
        }
        for (name, binding) in &node.attributes {
            if let Some(default) = &binding.default
                && element.attribute(name).is_none()
            {
                self.write(&binding.column, default);
            }
        }

        if let Some(column) = &node.value
            && let Some(text) = element.text()
        {
            self.write(column, &text);
        }

        self.children(element, node);

        if let Some(handle) = opened {
            self.accumulator.close_row(handle);
        }
    }

    fn children(&mut self, element: &XmlElement, node: &ConfigNode) {
        for child in element.child_elements() {
            let tag = self.normalizer.normalize(&child.name);
            match node.child(tag) {
                Some(child_node) => self.element(child, child_node),
                None => trace!(tag = %child.name, "skipping unmapped element"),
            }
        }
    }

    fn write(&mut self, column: &ColumnRef, value: &str) {
        match self.accumulator.nearest_open(column.table()) {
            Some(handle) => self.accumulator.write_column(handle, column.column(), value),
            None => trace!(binding = %column, "no open row for binding"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile_config;

    fn tree() -> ConfigTree {
        let config = XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_attribute("name", "employee_list:name")
            .with_child(XmlElement::new("Emp_Id"))
            .with_child(
                XmlElement::new("Car")
                    .with_attribute("table", "emp_cars")
                    .with_attribute("ctr_id", "emp_cars:car_ctr")
                    .with_text("emp_cars:car"),
            );
        compile_config(&config, "Emp_Id", None).unwrap()
    }

    #[test]
    fn identifier_may_follow_sub_elements() {
        let tree = tree();
        let normalizer = NamespaceNormalizer::default();
        let record = XmlElement::new("Person")
            .with_child(XmlElement::new("Car").with_text("Ford"))
            .with_child(XmlElement::new("Emp_Id").with_text("77"));
        let rows = RecordWalker::new(&tree, &normalizer).walk(&record, "1").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("id"), Some("77"));
        assert_eq!(rows[1].get("car"), Some("Ford"));
    }

    #[test]
    fn identifier_errors() {
        let tree = tree();
        let normalizer = NamespaceNormalizer::default();
        let walker = RecordWalker::new(&tree, &normalizer);

        let missing = XmlElement::new("Person");
        assert!(matches!(
            walker.walk(&missing, "1"),
            Err(RecordError::MissingIdentifier { .. })
        ));

        let blank = XmlElement::new("Person").with_child(XmlElement::new("Emp_Id").with_text("  "));
        assert!(matches!(
            walker.walk(&blank, "1"),
            Err(RecordError::MissingIdentifier { .. })
        ));

        let twice = XmlElement::new("Person")
            .with_child(XmlElement::new("Emp_Id").with_text("1"))
            .with_child(XmlElement::new("Emp_Id").with_text("2"));
        assert_eq!(
            walker.walk(&twice, "1"),
            Err(RecordError::AmbiguousIdentifier {
                path: "Emp_Id".to_string(),
                count: 2
            })
        );
    }

    #[test]
    fn blank_value_writes_nothing() {
        let tree = tree();
        let normalizer = NamespaceNormalizer::default();
        let record = XmlElement::new("Person")
            .with_child(XmlElement::new("Emp_Id").with_text("5"))
            .with_child(XmlElement::new("Car").with_text(" "));
        let rows = RecordWalker::new(&tree, &normalizer).walk(&record, "1").unwrap();
        let names: Vec<&str> = rows[1].column_names().collect();
        assert_eq!(names, vec!["id", "car_ctr"]);
    }
}
