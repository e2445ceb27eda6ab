//! Compiled mapping configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ColumnRef;

/// Name of the key column every row carries.
pub const ID_COLUMN: &str = "id";

/// Attribute-to-column binding with an optional fallback value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBinding {
    pub column: ColumnRef,
    /// Written when the attribute is absent from the element.
    pub default: Option<String>,
}

/// One node of the config tree, matched against elements with the same tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub tag: String,
    pub table: Option<String>,
    pub counter: Option<ColumnRef>,
    pub value: Option<ColumnRef>,
    pub file_number: Option<ColumnRef>,
    pub attributes: BTreeMap<String, AttributeBinding>,
    pub children: BTreeMap<String, ConfigNode>,
}

impl ConfigNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn child(&self, tag: &str) -> Option<&ConfigNode> {
        self.children.get(tag)
    }

    /// A node that opens no row and writes nothing; it only routes to deeper children.
    pub fn is_routing_only(&self) -> bool {
        self.table.is_none()
            && self.value.is_none()
            && self.file_number.is_none()
            && self.attributes.is_empty()
    }

    /// Every column binding declared directly on this node.
    pub fn bindings(&self) -> impl Iterator<Item = &ColumnRef> {
        self.value
            .iter()
            .chain(self.file_number.iter())
            .chain(self.attributes.values().map(|binding| &binding.column))
    }
}

/// The immutable mapping compiled once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigTree {
    /// Config node matched against the record element itself.
    pub root: ConfigNode,
    /// Table opened by the record element.
    pub root_table: String,
    /// Tags from the record element down to the identifier element.
    ///
    /// Empty when the record element carries the identifier itself.
    pub identifier_path: Vec<String>,
}

impl ConfigTree {
    pub fn record_tag(&self) -> &str {
        &self.root.tag
    }

    /// Resolves a tag path below the root to its config node.
    pub fn resolve(&self, path: &[String]) -> Option<&ConfigNode> {
        let mut node = &self.root;
        for tag in path {
            node = node.child(tag)?;
        }
        Some(node)
    }

    /// Lists every table with its counter column, in depth-first order of first appearance.
    pub fn tables(&self) -> Vec<TableSummary> {
        let mut tables: Vec<TableSummary> = Vec::new();
        collect_tables(&self.root, &mut Vec::new(), &mut tables);
        tables
    }
}

/// Table declared somewhere in the config tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub table: String,
    pub counter: Option<String>,
    /// `/`-joined tag path of the first node that opens the table.
    pub path: String,
    pub columns: Vec<String>,
}

fn collect_tables<'a>(
    node: &'a ConfigNode,
    path: &mut Vec<&'a str>,
    tables: &mut Vec<TableSummary>,
) {
    path.push(&node.tag);
    if let Some(table) = &node.table
        && !tables.iter().any(|summary| &summary.table == table)
    {
        tables.push(TableSummary {
            table: table.clone(),
            counter: node.counter.as_ref().map(|c| c.column().to_string()),
            path: path.join("/"),
            columns: Vec::new(),
        });
    }
    for binding in node.bindings() {
        if let Some(summary) = tables
            .iter_mut()
            .find(|summary| summary.table == binding.table())
            && !summary.columns.iter().any(|c| c == binding.column())
        {
            summary.columns.push(binding.column().to_string());
        }
    }
    for child in node.children.values() {
        collect_tables(child, path, tables);
    }
    path.pop();
}
