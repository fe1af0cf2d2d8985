use dmconvert_core::model::entity::ParentKind;
use dmconvert_core::{open_db_in_memory, ConvertOptions, ConvertService, GraphStore, SqliteGraphStore};

const CHAIN: &str = r#"
@prefix dcmitype: <http://purl.org/dc/dcmitype/> .
@prefix ore: <http://www.openarchives.org/ore/terms/> .
@prefix dm: <http://dm.drew.edu/ns/> .
@prefix oa: <http://www.w3.org/ns/oa#> .

<urn:p> a dm:Project ; ore:aggregates <urn:d0> .
<urn:d0> a dcmitype:Text .
<urn:d1> a dcmitype:Text .
<urn:d2> a dcmitype:Text .
<urn:d3> a dcmitype:Text .
<urn:stray> a dcmitype:Text .
<urn:a3> a oa:Annotation ; oa:hasBody <urn:d2> ; oa:hasTarget <urn:d3> .
<urn:a2> a oa:Annotation ; oa:hasBody <urn:d1> ; oa:hasTarget <urn:d2> .
<urn:a1> a oa:Annotation ; oa:hasBody <urn:d0> ; oa:hasTarget <urn:d1> .
"#;

#[test]
fn chain_membership_propagates_in_three_passes() {
    let conn = open_db_in_memory().unwrap();
    let service = ConvertService::new(SqliteGraphStore::new(&conn), ConvertOptions::default());

    let report = service.run(CHAIN).unwrap();
    let linker = report.linker.unwrap();
    assert_eq!(linker.projects.len(), 1);
    assert_eq!(linker.projects[0].project_uri, "urn:p");
    assert_eq!(linker.projects[0].documents, 4);
    assert_eq!(linker.projects[0].passes, 3);

    let documents = service.store().list_documents().unwrap();
    let parent = |uri: &str| {
        let doc = documents.iter().find(|doc| doc.uri == uri).unwrap();
        assert_eq!(doc.project_uri.as_deref(), Some("urn:p"));
        (doc.parent_uri.clone().unwrap(), doc.parent_kind.unwrap())
    };
    assert_eq!(parent("urn:d0"), ("urn:p".to_string(), ParentKind::Project));
    assert_eq!(parent("urn:d1"), ("urn:d0".to_string(), ParentKind::Document));
    assert_eq!(parent("urn:d2"), ("urn:d1".to_string(), ParentKind::Document));
    assert_eq!(parent("urn:d3"), ("urn:d2".to_string(), ParentKind::Document));
}

#[test]
fn unreachable_documents_and_their_highlights_are_pruned() {
    let source = format!(
        r#"{CHAIN}
        <urn:q> a oa:TextQuoteSelector ; oa:exact "stray words" .
        <urn:r> a oa:SpecificResource ; oa:hasSource <urn:stray> ; oa:hasSelector <urn:q> .
        <urn:lonely> a dcmitype:Text .
        <urn:a4> a oa:Annotation ; oa:hasBody <urn:r> ; oa:hasTarget <urn:lonely> .
        "#
    );
    let conn = open_db_in_memory().unwrap();
    let service = ConvertService::new(SqliteGraphStore::new(&conn), ConvertOptions::default());

    let report = service.run(&source).unwrap();
    let pruned = report.linker.unwrap().pruned;
    assert_eq!(
        pruned.dropped_documents,
        vec!["urn:stray".to_string(), "urn:lonely".to_string()]
    );
    assert_eq!(pruned.dropped_highlights, vec!["urn:q".to_string()]);
    assert_eq!(pruned.dangling_links, 1);

    let documents = service.store().list_documents().unwrap();
    assert_eq!(documents.len(), 4);
    assert!(documents.iter().all(|doc| doc.uri != "urn:stray"));
    assert!(service.store().list_highlights().unwrap().is_empty());
    assert_eq!(service.store().list_links().unwrap().len(), 4);
}
