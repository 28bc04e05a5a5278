//! End-to-end loading behavior over whole inputs.

use yamlite::{parse, parse_lines, parse_with_options, ErrorMode, LoadError, Options, Value};

fn accumulate() -> Options {
    Options::default()
}

#[test]
fn input_without_markers_is_one_document() {
    let loaded = parse("a: 1\nb: 2\n").unwrap();
    assert_eq!(loaded.documents.len(), 1);
    assert!(loaded.errors.is_empty());
}

#[test]
fn empty_input_is_one_null_document() {
    let loaded = parse("").unwrap();
    assert_eq!(loaded.documents.len(), 1);
    assert_eq!(loaded.documents[0].value, Value::Null);
}

#[test]
fn marker_separated_inputs_split() {
    let loaded = parse("--- first\n--- second\n").unwrap();
    assert_eq!(loaded.documents.len(), 2);
    assert_eq!(loaded.documents[0].value.as_str(), Some("first"));
    assert_eq!(loaded.documents[1].value.as_str(), Some("second"));
}

#[test]
fn mapping_key_order_is_source_order() {
    let loaded = parse("zebra: 1\napple: 2\nmango: 3\n").unwrap();
    let map = loaded.documents[0].value.as_mapping().unwrap();
    let keys: Vec<&String> = map.keys().collect();
    assert_eq!(keys, ["zebra", "apple", "mango"]);
}

#[test]
fn contradictory_document_still_yields_a_value() {
    let loaded = parse("a: 1\n- item\n").unwrap();
    assert_eq!(
        loaded.errors,
        vec![LoadError::ContradictoryDocumentShape(0)]
    );
    // best effort keeps the mapping reading
    let map = loaded.documents[0].value.as_mapping().unwrap();
    assert_eq!(map["a"], Value::Integer(1.into()));
}

#[test]
fn literal_block_preserves_blank_lines() {
    let loaded = parse_lines(["text: |", "  x", "", "  y"], &accumulate()).unwrap();
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["text"].as_str(),
        Some("x\n\ny")
    );
}

#[test]
fn folded_block_breaks_on_deeper_indent() {
    let loaded = parse_lines(["text: >", "  foo", "  bar", "    baz"], &accumulate()).unwrap();
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["text"].as_str(),
        Some("foo bar\nbaz")
    );
}

#[test]
fn literal_blocks_keep_mapping_like_content() {
    let loaded = parse("text: |\n  a: b\n  c: d\n").unwrap();
    assert!(loaded.errors.is_empty());
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["text"].as_str(),
        Some("a: b\nc: d")
    );
}

#[test]
fn keep_indicator_retains_trailing_blanks() {
    let loaded = parse_lines(["kept: |+", "  a", ""], &accumulate()).unwrap();
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["kept"].as_str(),
        Some("a\n")
    );
    let loaded = parse_lines(["clipped: |", "  a", ""], &accumulate()).unwrap();
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["clipped"].as_str(),
        Some("a")
    );
}

#[test]
fn anchors_resolve_forward_within_a_document() {
    let loaded = parse("default: &port 8080\nactual: *port\n").unwrap();
    let map = loaded.documents[0].value.as_mapping().unwrap();
    assert_eq!(map["actual"], Value::Integer(8080.into()));
    assert!(loaded.errors.is_empty());
}

#[test]
fn undefined_alias_reports_and_substitutes_null() {
    let loaded = parse("actual: *missing\n").unwrap();
    assert!(matches!(
        loaded.errors.as_slice(),
        [LoadError::UndefinedReference { name, line: 1 }] if name == "missing"
    ));
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["actual"],
        Value::Null
    );
}

#[test]
fn anchors_are_invisible_across_documents() {
    let loaded = parse("---\na: &shared 1\n---\nb: *shared\n").unwrap();
    assert_eq!(loaded.documents.len(), 2);
    assert_eq!(
        loaded.documents[1].value.as_mapping().unwrap()["b"],
        Value::Null
    );
    assert_eq!(loaded.errors.len(), 1);
}

#[test]
fn value_without_key_contributes_no_binding() {
    let loaded = parse("a: 1\n: orphan\n").unwrap();
    assert_eq!(loaded.errors, vec![LoadError::EmptyKeyName(2)]);
    let map = loaded.documents[0].value.as_mapping().unwrap();
    assert_eq!(map.len(), 1);
    assert!(map.contains_key("a"));
}

#[test]
fn comments_are_indexed_by_source_line() {
    let loaded = parse("# top\nkey: 1 # inline\n").unwrap();
    let doc = &loaded.documents[0];
    assert_eq!(doc.comments[&1], "top");
    assert_eq!(doc.comments[&2], "inline");
    assert_eq!(doc.value.as_mapping().unwrap()["key"], Value::Integer(1.into()));
}

#[test]
fn comments_can_be_dropped() {
    let options = Options {
        include_comments: false,
        ..Options::default()
    };
    let loaded = parse_with_options("# top\nkey: 1\n", &options).unwrap();
    assert!(loaded.documents[0].comments.is_empty());
}

#[test]
fn directives_record_behind_the_flag() {
    let options = Options {
        include_directives: true,
        ..Options::default()
    };
    let loaded = parse_with_options("%YAML 1.2\na: 1\n", &options).unwrap();
    assert_eq!(
        loaded.documents[0].directives,
        vec![(1, "YAML 1.2".to_string())]
    );

    let loaded = parse("%YAML 1.2\na: 1\n").unwrap();
    assert!(loaded.documents[0].directives.is_empty());
}

#[test]
fn fail_fast_aborts_on_first_error() {
    let options = Options {
        error_mode: ErrorMode::FailFast,
        ..Options::default()
    };
    let err = parse_with_options("a: 1\n: orphan\n", &options).unwrap_err();
    assert_eq!(err, LoadError::EmptyKeyName(2));
}

#[test]
fn dates_interpret_behind_the_flag() {
    let loaded = parse("when: 2024-03-07\n").unwrap();
    let date = loaded.documents[0].value.as_mapping().unwrap()["when"]
        .as_date()
        .unwrap();
    assert_eq!((date.year, date.month, date.day), (2024, 3, 7));

    let options = Options {
        interpret_dates: false,
        ..Options::default()
    };
    let loaded = parse_with_options("when: 2024-03-07\n", &options).unwrap();
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["when"].as_str(),
        Some("2024-03-07")
    );
}

#[test]
fn quoted_string_continues_across_lines() {
    // continuation concatenates the raw pieces directly
    let loaded = parse("greeting: \"hello\nworld\"\n").unwrap();
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["greeting"].as_str(),
        Some("helloworld")
    );
}

#[test]
fn unterminated_quote_reports_at_end_of_input() {
    let loaded = parse("text: \"never closed\n").unwrap();
    assert_eq!(
        loaded.errors,
        vec![LoadError::UnterminatedContinuation(1)]
    );
}

#[test]
fn malformed_compact_form_degrades_to_text() {
    let loaded = parse("bad: {no colon}\n").unwrap();
    assert_eq!(loaded.errors, vec![LoadError::MalformedCompactForm(1)]);
    assert_eq!(
        loaded.documents[0].value.as_mapping().unwrap()["bad"].as_str(),
        Some("{no colon}")
    );
}

#[test]
fn round_trip_preserves_mapping_order() {
    let source = "zebra: 1\napple: two\nmango: true\n";
    let loaded = parse(source).unwrap();
    let rendered = yamlite::dump(&loaded.documents[0].value);
    let reloaded = parse(&rendered).unwrap();
    assert!(reloaded.errors.is_empty());
    let original: Vec<&String> = loaded.documents[0]
        .value
        .as_mapping()
        .unwrap()
        .keys()
        .collect();
    let round: Vec<&String> = reloaded.documents[0]
        .value
        .as_mapping()
        .unwrap()
        .keys()
        .collect();
    assert_eq!(original, round);
    assert_eq!(loaded.documents[0].value, reloaded.documents[0].value);
}

#[test]
fn compact_values_round_trip_on_one_line() {
    let loaded = parse("inline: {a: 1, b: two}\n").unwrap();
    let rendered = yamlite::dump(&loaded.documents[0].value);
    assert_eq!(rendered, "inline: {a: 1, b: two}\n");
}

#[test]
fn deep_nesting_and_dedent() {
    let source = "\
server:
  tls:
    cert: /etc/cert.pem
  port: 443
client:
  retries: 3
";
    let loaded = parse(source).unwrap();
    assert!(loaded.errors.is_empty());
    let map = loaded.documents[0].value.as_mapping().unwrap();
    let server = map["server"].as_mapping().unwrap();
    assert_eq!(
        server["tls"].as_mapping().unwrap()["cert"].as_str(),
        Some("/etc/cert.pem")
    );
    assert_eq!(server["port"], Value::Integer(443.into()));
    assert_eq!(
        map["client"].as_mapping().unwrap()["retries"],
        Value::Integer(3.into())
    );
}

#[test]
fn sequence_of_mappings() {
    let source = "\
fruits:
  - name: apple
    color: red
  - name: pear
    color: green
";
    let loaded = parse(source).unwrap();
    let fruits = loaded.documents[0].value.as_mapping().unwrap()["fruits"]
        .as_sequence()
        .unwrap();
    assert_eq!(fruits.len(), 2);
    assert_eq!(
        fruits[1].as_mapping().unwrap()["color"].as_str(),
        Some("green")
    );
}

#[test]
fn explicit_key_entries_build_a_set() {
    let loaded = parse("? alpha\n: 1\n? beta\n: 2\n").unwrap();
    let set = loaded.documents[0].value.as_set().unwrap();
    assert_eq!(set["alpha"], Value::Integer(1.into()));
    assert_eq!(set["beta"], Value::Integer(2.into()));
}
