//! End-to-end mapping tests: config document plus record documents to rows.

use std::path::Path;

use proptest::prelude::*;
use xmlsql_ingest::parse_document;
use xmlsql_map::{NamespaceNormalizer, RecordWalker, compile_config, locate_records, split_path};
use xmlsql_model::{ConfigTree, Row, XmlElement};

const EMPLOYEE_CONFIG: &str = r#"
<Person table="employee_list" file_number="employee_list:file_number" name="employee_list:name">
    <Emp_Id/>
    <State>employee_list:state</State>
    <Color>employee_list:color</Color>
    <Car table="emp_cars" ctr_id="emp_cars:car_ctr" color="emp_cars:color">emp_cars:car</Car>
</Person>
"#;

fn parse(text: &str) -> XmlElement {
    parse_document(text, Path::new("test.xml")).expect("well-formed xml")
}

fn employee_tree() -> ConfigTree {
    compile_config(&parse(EMPLOYEE_CONFIG), "Emp_Id", Some("Person")).expect("valid config")
}

fn walk(tree: &ConfigTree, record: &str) -> Vec<Row> {
    let normalizer = NamespaceNormalizer::default();
    RecordWalker::new(tree, &normalizer)
        .walk(&parse(record), "15")
        .expect("record converts")
}

fn pairs(row: &Row) -> Vec<(&str, &str)> {
    row.column_names().zip(row.values()).collect()
}

#[test]
fn worked_example() {
    let rows = walk(
        &employee_tree(),
        r#"<Person name="Joe"><Emp_Id>12435</Emp_Id><State>Indiana</State><Color>Red</Color><Car color="Blue">Ford</Car><Car color="White">Nissan</Car></Person>"#,
    );

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].table, "employee_list");
    assert_eq!(
        pairs(&rows[0]),
        vec![
            ("id", "12435"),
            ("file_number", "15"),
            ("name", "Joe"),
            ("state", "Indiana"),
            ("color", "Red"),
        ]
    );
    assert_eq!(rows[1].table, "emp_cars");
    assert_eq!(
        pairs(&rows[1]),
        vec![("id", "12435"), ("car_ctr", "1"), ("color", "Blue"), ("car", "Ford")]
    );
    assert_eq!(
        pairs(&rows[2]),
        vec![("id", "12435"), ("car_ctr", "2"), ("color", "White"), ("car", "Nissan")]
    );
}

#[test]
fn zero_sub_elements_leave_root_row_alone() {
    let rows = walk(
        &employee_tree(),
        r#"<Person name="Ann"><Emp_Id>1</Emp_Id><State>Ohio</State></Person>"#,
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(
        pairs(&rows[0]),
        vec![("id", "1"), ("file_number", "15"), ("name", "Ann"), ("state", "Ohio")]
    );
}

#[test]
fn unmapped_subtrees_are_skipped() {
    let rows = walk(
        &employee_tree(),
        r#"<Person><Emp_Id>1</Emp_Id><Garage><Car color="Red">Hidden</Car></Garage><Hobby>chess</Hobby></Person>"#,
    );
    assert_eq!(rows.len(), 1);
    assert!(rows[0].get("car").is_none());
}

#[test]
fn wrapper_elements_route_to_nested_tables() {
    let config = parse(
        r#"<Person table="employee_list">
            <Emp_Id/>
            <Garage>
                <Car table="emp_cars" ctr_id="emp_cars:car_ctr" color="emp_cars:color">emp_cars:car</Car>
            </Garage>
        </Person>"#,
    );
    let tree = compile_config(&config, "Emp_Id", None).expect("valid config");
    assert!(tree.root.child("Garage").expect("garage node").is_routing_only());

    let rows = walk(
        &tree,
        r#"<Person><Emp_Id>4</Emp_Id>
            <Garage level="2">
                <Car color="Blue">Ford</Car>
                <Car color="White">Nissan</Car>
                <Car>Fiat</Car>
            </Garage>
        </Person>"#,
    );

    let tables: Vec<&str> = rows.iter().map(|row| row.table.as_str()).collect();
    assert_eq!(tables, vec!["employee_list", "emp_cars", "emp_cars", "emp_cars"]);
    assert_eq!(pairs(&rows[0]), vec![("id", "4")]);
    let counters: Vec<Option<&str>> = rows[1..].iter().map(|row| row.get("car_ctr")).collect();
    assert_eq!(counters, vec![Some("1"), Some("2"), Some("3")]);
    assert_eq!(
        pairs(&rows[2]),
        vec![("id", "4"), ("car_ctr", "2"), ("color", "White"), ("car", "Nissan")]
    );
    assert_eq!(pairs(&rows[3]), vec![("id", "4"), ("car_ctr", "3"), ("car", "Fiat")]);
}

#[test]
fn counters_restart_for_each_record() {
    let tree = employee_tree();
    let document = parse(
        r#"<People>
            <Person><Emp_Id>1</Emp_Id><Car>A</Car><Car>B</Car></Person>
            <Person><Emp_Id>2</Emp_Id><Car>C</Car></Person>
        </People>"#,
    );
    let normalizer = NamespaceNormalizer::default();
    let walker = RecordWalker::new(&tree, &normalizer);
    let records = locate_records(&document, &split_path("People"), tree.record_tag(), &normalizer);
    assert_eq!(records.len(), 2);

    let second = walker.walk(records[1], "-1").expect("second record");
    assert_eq!(second[1].get("id"), Some("2"));
    assert_eq!(second[1].get("car_ctr"), Some("1"));
    assert_eq!(second[0].get("file_number"), Some("-1"));
}

#[test]
fn nested_tables_inherit_counters_and_defaults() {
    let config = parse(
        r#"<Order table="orders" status="orders:status:open">
            <Number/>
            <Line table="lines" ctr_id="lines:line_ctr" sku="lines:sku">
                <Note>orders:note</Note>
                <Part table="parts" ctr_id="parts:part_ctr">parts:name</Part>
            </Line>
        </Order>"#,
    );
    let tree = compile_config(&config, "Number", None).expect("valid config");
    let rows = walk(
        &tree,
        r#"<Order><Number>9</Number>
            <Line sku="a"><Part>bolt</Part><Part>nut</Part></Line>
            <Line sku="b"><Note>rush</Note><Part>gear</Part></Line>
        </Order>"#,
    );

    let tables: Vec<&str> = rows.iter().map(|row| row.table.as_str()).collect();
    assert_eq!(tables, vec!["orders", "lines", "parts", "parts", "lines", "parts"]);
    assert_eq!(rows[0].get("status"), Some("open"));
    assert_eq!(rows[0].get("note"), Some("rush"));
    assert_eq!(
        pairs(&rows[5]),
        vec![("id", "9"), ("line_ctr", "2"), ("part_ctr", "3"), ("name", "gear")]
    );
}

#[test]
fn namespaced_documents_match_plain_config() {
    let tree = employee_tree();
    let document = parse(
        r#"<p:People xmlns:p="urn:people"><p:Person name="Joe"><p:Emp_Id>3</p:Emp_Id><p:Car>Ford</p:Car></p:Person></p:People>"#,
    );
    let normalizer = NamespaceNormalizer::new(Some("urn:people"));
    let records = locate_records(&document, &split_path("People"), "Person", &normalizer);
    assert_eq!(records.len(), 1);
    let rows = RecordWalker::new(&tree, &normalizer)
        .walk(records[0], "15")
        .expect("record converts");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("car"), Some("Ford"));
}

#[test]
fn walking_is_deterministic() {
    let tree = employee_tree();
    let record = r#"<Person name="Joe"><Emp_Id>1</Emp_Id><Car color="x">A</Car></Person>"#;
    assert_eq!(walk(&tree, record), walk(&tree, record));
}

proptest! {
    #[test]
    fn one_row_per_matched_element(cars in 0usize..12) {
        let tree = employee_tree();
        let body: String = (0..cars).map(|i| format!("<Car>c{i}</Car>")).collect();
        let record = format!("<Person><Emp_Id>42</Emp_Id>{body}</Person>");
        let rows = walk(&tree, &record);

        prop_assert_eq!(rows.iter().filter(|row| row.table == "employee_list").count(), 1);
        let car_rows: Vec<&Row> = rows.iter().filter(|row| row.table == "emp_cars").collect();
        prop_assert_eq!(car_rows.len(), cars);
        for (index, row) in car_rows.iter().enumerate() {
            let expected = (index + 1).to_string();
            prop_assert_eq!(row.get("car_ctr"), Some(expected.as_str()));
            prop_assert_eq!(row.get("id"), Some("42"));
        }
    }
}
