use super::*;

#[test]
fn build_reference_joins_with_single_slash() {
    assert_eq!(build_reference("abc", "https://render.test/svg"), "https://render.test/svg/abc");
    assert_eq!(build_reference("abc", "https://render.test/svg/"), "https://render.test/svg/abc");
}

#[test]
fn empty_document_has_no_reference() {
    let builder = ReferenceBuilder::default();
    assert_eq!(builder.reference_for(""), "");
}

#[test]
fn reference_is_stable_under_repeated_calls() {
    let builder = ReferenceBuilder::new("https://render.test/svg");
    let doc = "@startuml\nA->B\n@enduml";
    let first = builder.reference_for(doc);
    for _ in 0..10 {
        assert_eq!(builder.reference_for(doc), first);
    }
    assert_eq!(first, build_reference(&encoder::encode(doc), "https://render.test/svg"));
}

#[test]
fn reference_addresses_the_same_source() {
    let builder = ReferenceBuilder::new("https://render.test/svg");
    let doc = "@startuml\nA->B\nB->C\n@enduml";
    let url = builder.reference_for(doc);
    let token = url.strip_prefix("https://render.test/svg/").unwrap();
    assert_eq!(encoder::decode(token).unwrap(), doc);
}

#[test]
fn default_builder_targets_public_server() {
    let builder = ReferenceBuilder::default();
    assert_eq!(builder.base_url(), DEFAULT_RENDER_BASE_URL);
    assert!(builder.reference_for("@startuml\n@enduml").starts_with("https://www.plantuml.com/plantuml/svg/"));
}
