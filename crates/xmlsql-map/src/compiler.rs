//! Compiles the mapping config document into a [`ConfigTree`].
//!
//! The config document mirrors the shape of one record. On each element:
//!
//! - `table="name"` opens a row in `name`
//! - `ctr_id="table:column"` names the counter column of that row
//! - `file_number="table:column"` writes the current file number
//! - any other attribute `attr="table:column[:default]"` binds the XML attribute `attr`
//! - non-blank text `table:column` binds the element's own text

use std::collections::BTreeMap;

use tracing::{debug, warn};
use xmlsql_model::{AttributeBinding, ColumnRef, ConfigNode, ConfigTree, ID_COLUMN, XmlElement};

use crate::error::ConfigError;
use crate::records::split_path;

const TABLE_ATTR: &str = "table";
const COUNTER_ATTR: &str = "ctr_id";
const FILE_NUMBER_ATTR: &str = "file_number";

/// Compiles and validates the config.
///
/// `identifier` is the `/`-separated path from the record element to the identifier element;
/// the record tag itself denotes the record element. When `record` is given it must equal the
/// config root tag.
pub fn compile_config(
    config: &XmlElement,
    identifier: &str,
    record: Option<&str>,
) -> Result<ConfigTree, ConfigError> {
    let record_tag = config.local_name().to_string();
    if let Some(requested) = record
        && requested != record_tag
    {
        return Err(ConfigError::RecordTagMismatch {
            requested: requested.to_string(),
            config: record_tag,
        });
    }

    let root_table = match config.attribute(TABLE_ATTR).map(str::trim) {
        Some(table) if !table.is_empty() => table.to_string(),
        _ => return Err(ConfigError::MissingRootTable { tag: record_tag }),
    };

    let compiler = Compiler {
        root_table: &root_table,
    };
    let mut path = Vec::new();
    let root = compiler.compile_node(config, &mut path, &mut Vec::new())?;

    let tree = ConfigTree {
        root,
        root_table: root_table.clone(),
        identifier_path: Vec::new(),
    };
    let identifier_path = resolve_identifier_path(&tree, identifier)?;

    let tables = tree.tables();
    debug!(
        record = %record_tag,
        root_table = %root_table,
        tables = tables.len(),
        identifier = %identifier,
        "compiled config"
    );
    Ok(ConfigTree {
        identifier_path,
        ..tree
    })
}

struct Compiler<'a> {
    root_table: &'a str,
}

impl Compiler<'_> {
    fn compile_node(
        &self,
        element: &XmlElement,
        path: &mut Vec<String>,
        open_tables: &mut Vec<String>,
    ) -> Result<ConfigNode, ConfigError> {
        path.push(element.local_name().to_string());
        let here = path.join("/");
        let mut node = ConfigNode::new(element.local_name());

        if let Some(table) = element.attribute(TABLE_ATTR) {
            let table = table.trim();
            if table.is_empty() {
                return Err(ConfigError::EmptyTableName { path: here });
            }
            if table == self.root_table && path.len() > 1 {
                return Err(ConfigError::RootTableReopened {
                    path: here,
                    table: table.to_string(),
                });
            }
            node.table = Some(table.to_string());
        }

        if let Some(value) = element.attribute(COUNTER_ATTR) {
            node.counter = Some(parse_counter(&node, value, &here)?);
        }
        if let Some(table) = &node.table
            && table != self.root_table
            && node.counter.is_none()
        {
            return Err(ConfigError::MissingCounterColumn {
                path: here,
                table: table.clone(),
            });
        }

        for (name, value) in &element.attributes {
            match name.as_str() {
                TABLE_ATTR | COUNTER_ATTR => {}
                FILE_NUMBER_ATTR => {
                    node.file_number = Some(parse_binding(name, value, &here)?);
                }
                _ => {
                    let (column, default) = ColumnRef::parse_with_default(value).map_err(|_| {
                        ConfigError::InvalidColumnBinding {
                            path: here.clone(),
                            binding: name.clone(),
                            value: value.clone(),
                        }
                    })?;
                    node.attributes
                        .insert(name.clone(), AttributeBinding { column, default });
                }
            }
        }

        if let Some(text) = element.text() {
            node.value = Some(parse_binding("text", &text, &here)?);
        }

        let pushed = node.table.clone();
        if let Some(table) = &pushed {
            open_tables.push(table.clone());
        }
        check_bindings(&node, open_tables, &here)?;

        let mut children = BTreeMap::new();
        for child in element.child_elements() {
            let tag = child.local_name().to_string();
            let compiled = self.compile_node(child, path, open_tables)?;
            if children.insert(tag, compiled).is_some() {
                return Err(ConfigError::DuplicateElement {
                    path: format!("{here}/{}", child.local_name()),
                });
            }
        }
        node.children = children;

        if pushed.is_some() {
            open_tables.pop();
        }
        path.pop();
        Ok(node)
    }
}

fn parse_binding(binding: &str, value: &str, path: &str) -> Result<ColumnRef, ConfigError> {
    ColumnRef::parse(value).map_err(|_| ConfigError::InvalidColumnBinding {
        path: path.to_string(),
        binding: binding.to_string(),
        value: value.to_string(),
    })
}

fn parse_counter(node: &ConfigNode, value: &str, path: &str) -> Result<ColumnRef, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidCounterColumn {
        path: path.to_string(),
        value: value.to_string(),
        reason,
    };
    let Some(table) = &node.table else {
        return Err(invalid("element does not declare a table".to_string()));
    };
    let counter = ColumnRef::parse(value).map_err(|e| invalid(e.to_string()))?;
    if counter.table() != table {
        return Err(invalid(format!("counter must belong to table '{table}'")));
    }
    Ok(counter)
}

fn check_bindings(node: &ConfigNode, open_tables: &[String], path: &str) -> Result<(), ConfigError> {
    for binding in node.bindings() {
        if !open_tables.iter().any(|table| table == binding.table()) {
            return Err(ConfigError::UnboundColumnTable {
                path: path.to_string(),
                value: binding.to_string(),
                table: binding.table().to_string(),
            });
        }
        if binding.column() == ID_COLUMN {
            warn!(
                path = %path,
                binding = %binding,
                "binding rewrites the id column; the record identifier is kept"
            );
        }
    }
    Ok(())
}

/// Resolves the identifier path against the compiled tree.
///
/// A leading record tag is accepted, so `Person/Emp_Id` and `Emp_Id` are equivalent when the
/// record element has no `Person` child.
fn resolve_identifier_path(tree: &ConfigTree, identifier: &str) -> Result<Vec<String>, ConfigError> {
    let not_found = || ConfigError::IdentifierPathNotFound {
        path: identifier.to_string(),
        record: tree.record_tag().to_string(),
    };
    let segments = split_path(identifier);
    if segments.is_empty() {
        return Err(not_found());
    }
    if tree.resolve(&segments).is_some() {
        return Ok(segments);
    }
    if segments[0] == tree.record_tag() {
        let rest = segments[1..].to_vec();
        if tree.resolve(&rest).is_some() {
            return Ok(rest);
        }
    }
    Err(not_found())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person_config() -> XmlElement {
        XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_attribute("file_number", "employee_list:file_number")
            .with_attribute("name", "employee_list:name")
            .with_child(XmlElement::new("Emp_Id"))
            .with_child(XmlElement::new("State").with_text("employee_list:state"))
            .with_child(
                XmlElement::new("Car")
                    .with_attribute("table", "emp_cars")
                    .with_attribute("ctr_id", "emp_cars:car_ctr")
                    .with_attribute("color", "emp_cars:color:unknown")
                    .with_text("emp_cars:car"),
            )
    }

    #[test]
    fn compiles_bindings() {
        let tree = compile_config(&person_config(), "Emp_Id", Some("Person")).unwrap();
        assert_eq!(tree.root_table, "employee_list");
        assert_eq!(tree.identifier_path, vec!["Emp_Id".to_string()]);
        assert_eq!(
            tree.root.file_number.as_ref().map(ToString::to_string).as_deref(),
            Some("employee_list:file_number")
        );

        let car = tree.root.child("Car").unwrap();
        assert_eq!(car.table.as_deref(), Some("emp_cars"));
        assert_eq!(car.counter.as_ref().unwrap().column(), "car_ctr");
        assert_eq!(car.value.as_ref().unwrap().column(), "car");
        let color = &car.attributes["color"];
        assert_eq!(color.column.column(), "color");
        assert_eq!(color.default.as_deref(), Some("unknown"));
    }

    #[test]
    fn identifier_may_be_record_or_prefixed() {
        let tree = compile_config(&person_config(), "Person", None).unwrap();
        assert!(tree.identifier_path.is_empty());

        let tree = compile_config(&person_config(), "Person/Emp_Id", None).unwrap();
        assert_eq!(tree.identifier_path, vec!["Emp_Id".to_string()]);
    }

    #[test]
    fn rejects_missing_root_table() {
        let config = XmlElement::new("Person").with_child(XmlElement::new("Emp_Id"));
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRootTable {
                tag: "Person".to_string()
            }
        );
    }

    #[test]
    fn rejects_sub_table_without_counter() {
        let config = XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_child(XmlElement::new("Emp_Id"))
            .with_child(XmlElement::new("Car").with_attribute("table", "emp_cars"));
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCounterColumn { ref table, .. } if table == "emp_cars"));
    }

    #[test]
    fn rejects_counter_on_foreign_table() {
        let config = XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_child(XmlElement::new("Emp_Id"))
            .with_child(
                XmlElement::new("Car")
                    .with_attribute("table", "emp_cars")
                    .with_attribute("ctr_id", "other:car_ctr"),
            );
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCounterColumn { .. }));
    }

    #[test]
    fn rejects_counter_without_table() {
        let config = XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_child(XmlElement::new("Emp_Id").with_attribute("ctr_id", "t:c"));
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidCounterColumn { .. }));
    }

    #[test]
    fn rejects_malformed_binding() {
        let config = XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_child(XmlElement::new("Emp_Id"))
            .with_child(XmlElement::new("State").with_text("state"));
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidColumnBinding {
                path: "Person/State".to_string(),
                binding: "text".to_string(),
                value: "state".to_string(),
            }
        );
    }

    #[test]
    fn rejects_binding_to_unopened_table() {
        let config = XmlElement::new("Person")
            .with_attribute("table", "employee_list")
            .with_child(XmlElement::new("Emp_Id"))
            .with_child(XmlElement::new("State").with_text("emp_cars:state"));
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert!(matches!(err, ConfigError::UnboundColumnTable { ref table, .. } if table == "emp_cars"));
    }

    #[test]
    fn rejects_unknown_identifier_path() {
        let err = compile_config(&person_config(), "Badge", None).unwrap_err();
        assert!(matches!(err, ConfigError::IdentifierPathNotFound { .. }));
        let err = compile_config(&person_config(), "", None).unwrap_err();
        assert!(matches!(err, ConfigError::IdentifierPathNotFound { .. }));
    }

    #[test]
    fn rejects_record_tag_mismatch() {
        let err = compile_config(&person_config(), "Emp_Id", Some("Employee")).unwrap_err();
        assert!(matches!(err, ConfigError::RecordTagMismatch { .. }));
    }

    #[test]
    fn rejects_duplicate_child_and_reopened_root() {
        let config = person_config().with_child(XmlElement::new("State"));
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateElement { .. }));

        let config = person_config().with_child(
            XmlElement::new("Manager").with_attribute("table", "employee_list"),
        );
        let err = compile_config(&config, "Emp_Id", None).unwrap_err();
        assert!(matches!(err, ConfigError::RootTableReopened { .. }));
    }

    #[test]
    fn id_rebinding_is_allowed() {
        let config = person_config().with_child(XmlElement::new("Badge").with_text("employee_list:id"));
        assert!(compile_config(&config, "Emp_Id", None).is_ok());
    }
}
