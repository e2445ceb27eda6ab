//! Locating record elements inside a parsed document.

use xmlsql_model::XmlElement;

use crate::namespace::NamespaceNormalizer;

/// Splits a `/`-separated tag path, ignoring empty segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Finds the record elements of a document.
///
/// With a parent path (which starts at the document root), records are the direct children
/// with the record tag of every element matching the path. Without one, every element with the
/// record tag is a record, at any depth and in document order; the search does not descend into
/// a record, so records never nest. An empty result means the parent or record path did not
/// resolve.
pub fn locate_records<'a>(
    document: &'a XmlElement,
    parent_path: &[String],
    record_tag: &str,
    normalizer: &NamespaceNormalizer,
) -> Vec<&'a XmlElement> {
    let is_tag = |element: &XmlElement, tag: &str| normalizer.normalize(&element.name) == tag;

    let Some((first, rest)) = parent_path.split_first() else {
        let mut records = Vec::new();
        collect_outermost(
            document,
            &|element: &XmlElement| is_tag(element, record_tag),
            &mut records,
        );
        return records;
    };
    if !is_tag(document, first) {
        return Vec::new();
    }
    let mut parents = vec![document];
    for tag in rest {
        parents = parents
            .into_iter()
            .flat_map(XmlElement::child_elements)
            .filter(|child| is_tag(child, tag))
            .collect();
    }

    parents
        .into_iter()
        .flat_map(XmlElement::child_elements)
        .filter(|child| is_tag(child, record_tag))
        .collect()
}

fn collect_outermost<'a>(
    element: &'a XmlElement,
    is_record: &dyn Fn(&XmlElement) -> bool,
    records: &mut Vec<&'a XmlElement>,
) {
    if is_record(element) {
        records.push(element);
        return;
    }
    for child in element.child_elements() {
        collect_outermost(child, is_record, records);
    }
}
