use crate::{
    bound::{BoundValue, canonical_cmp},
    error::{ErrorClass, PartitionError, ResumeBoundError},
    partition::{FindOptions, Namespace, Partition, PartitionKey, RangeFilter, ReadShape},
};
use bson::{Bson, Decimal128, Document, Timestamp, Uuid, doc};
use proptest::prelude::*;
use std::cmp::Ordering;

// ---- helpers -----------------------------------------------------------

const RUN_ID: &str = "run-1";

fn uuid() -> Uuid {
    Uuid::from_bytes([7u8; 16])
}

fn ranged(lower: impl Into<BoundValue>, upper: impl Into<BoundValue>) -> Partition {
    Partition::new(
        Namespace::new("m", "c"),
        uuid(),
        RUN_ID,
        lower.into(),
        upper.into(),
    )
}

fn capped() -> Partition {
    Partition::capped(Namespace::new("m", "c"), uuid(), RUN_ID)
}

fn start_at() -> Timestamp {
    Timestamp {
        time: 1_700_000_000,
        increment: 3,
    }
}

/// Positive decimal128 `coefficient × 10^exponent`.
fn decimal128(coefficient: u128, exponent: i32) -> Decimal128 {
    let biased = u128::try_from(exponent + 6176).expect("exponent should be in range");
    Decimal128::from_bytes(((biased << 113) | coefficient).to_le_bytes())
}

fn raw(document: &Document) -> Vec<u8> {
    bson::to_vec(document).expect("test document should encode")
}

// Evaluate a rendered range filter the way the server would for `$and` of
// `$expr` comparisons against a `$literal`, using the canonical order.
fn eval_filter(filter: &Document, id: &BoundValue) -> bool {
    let clauses = filter.get_array("$and").expect("filter should be an $and");

    clauses.iter().all(|clause| {
        let Bson::Document(clause) = clause else {
            panic!("clause should be a document");
        };
        let expr = clause.get_document("$expr").expect("clause should be an $expr");
        let (op, args) = expr.iter().next().expect("expression should have an operator");
        let Bson::Array(args) = args else {
            panic!("operator arguments should be an array");
        };

        assert_eq!(args[0], Bson::String("$_id".to_string()));
        let Bson::Document(literal) = &args[1] else {
            panic!("bound should be wrapped");
        };
        let bound = literal
            .get("$literal")
            .cloned()
            .expect("bound should be a $literal");
        let bound = BoundValue::try_from(bound).expect("bound should convert");

        let cmp = canonical_cmp(id, &bound);
        match op.as_str() {
            "$gte" => cmp != Ordering::Less,
            "$lte" => cmp != Ordering::Greater,
            other => panic!("unexpected operator {other}"),
        }
    })
}

// ---- descriptor --------------------------------------------------------

#[test]
fn display_combines_namespace_identity_and_bounds() {
    let partition = ranged(5, "z");
    assert_eq!(
        partition.to_string(),
        format!(
            "{{db: m, coll: c, collUUID: {}, runID: run-1, lower: 5, upper: \"z\"}}",
            uuid()
        )
    );
}

#[test]
fn display_renders_sentinels_and_unassigned_lower() {
    let mut partition = capped();
    assert!(partition.to_string().ends_with(
        r#"lower: {"$minKey":1}, upper: {"$maxKey":1}}"#
    ));

    partition.key.lower = None;
    assert_eq!(partition.lower_bound_string(), "null");
    assert_eq!(partition.upper_bound_string(), r#"{"$maxKey":1}"#);
}

#[test]
fn namespace_displays_as_dotted_name() {
    assert_eq!(Namespace::new("db", "coll").to_string(), "db.coll");
}

#[test]
fn validate_accepts_well_formed_partitions() {
    ranged(5, 20).validate().expect("ordered bounds are valid");
    ranged(7, 7).validate().expect("single-key range is valid");
    ranged(100, "a").validate().expect("number ranks below text");
    capped().validate().expect("capped partition is valid");
}

#[test]
fn validate_rejects_missing_and_inverted_bounds() {
    let mut partition = ranged(5, 20);
    partition.key.lower = None;
    assert_eq!(partition.validate(), Err(PartitionError::MissingLowerBound));

    let err = ranged("a", 100).validate().expect_err("text ranks above numbers");
    assert_eq!(
        err,
        PartitionError::InvertedBounds {
            lower: r#""a""#.to_string(),
            lower_kind: "Text",
            upper: "100".to_string(),
            upper_kind: "Number",
        }
    );
    assert_eq!(
        err.to_string(),
        r#"partition lower bound "a" (Text) orders after upper bound 100 (Number)"#
    );
    assert_eq!(err.class(), ErrorClass::InvariantViolation);
}

#[test]
fn validate_rejects_capped_partition_with_real_bounds() {
    let mut partition = ranged(1, 2);
    partition.is_capped = true;
    assert!(matches!(
        partition.validate(),
        Err(PartitionError::CappedBoundsNotSentinel { .. })
    ));
}

#[test]
fn with_lower_bound_leaves_original_untouched() {
    let original = ranged(5, 20);
    let next = original.with_lower_bound(BoundValue::from(12));

    assert_eq!(original.lower(), Some(&BoundValue::from(5)));
    assert_eq!(next.lower(), Some(&BoundValue::from(12)));
    assert_eq!(next.upper(), original.upper());
    assert_eq!(next.key.source_uuid, original.key.source_uuid);
    assert_eq!(next.key.run_id, original.key.run_id);
    assert_eq!(next.namespace, original.namespace);
}

// ---- persisted shape ---------------------------------------------------

#[test]
fn partition_persists_with_stored_field_names() {
    let partition = ranged(5, 20);
    let stored = bson::to_document(&partition).expect("partition should serialize");

    assert_eq!(
        stored.keys().collect::<Vec<_>>(),
        ["_id", "namespace", "upperBound", "isCapped"]
    );

    let id = stored.get_document("_id").expect("_id is a document");
    assert_eq!(id.keys().collect::<Vec<_>>(), ["srcUUID", "id", "lowerBound"]);
    assert_eq!(id.get("srcUUID"), Some(&Bson::from(uuid())));
    assert_eq!(id.get_str("id").expect("run id"), RUN_ID);
    assert_eq!(id.get("lowerBound"), Some(&Bson::Int32(5)));

    assert_eq!(
        stored.get_document("namespace").expect("namespace"),
        &doc! { "db": "m", "coll": "c" }
    );
    assert_eq!(stored.get("upperBound"), Some(&Bson::Int32(20)));
    assert!(!stored.get_bool("isCapped").expect("isCapped"));

    let back: Partition = bson::from_document(stored).expect("partition should deserialize");
    assert_eq!(back, partition);
}

#[test]
fn capped_partition_persists_sentinels() {
    let stored = bson::to_document(&capped()).expect("partition should serialize");
    let id = stored.get_document("_id").expect("_id is a document");

    assert_eq!(id.get("lowerBound"), Some(&Bson::MinKey));
    assert_eq!(stored.get("upperBound"), Some(&Bson::MaxKey));

    let back: Partition = bson::from_document(stored).expect("partition should deserialize");
    assert_eq!(back, capped());
    assert!(back.is_capped);
}

#[test]
fn stored_null_lower_bound_is_a_value_not_absence() {
    let partition = ranged(BoundValue::Null, 20);
    let stored = bson::to_document(&partition).expect("partition should serialize");
    let back: Partition = bson::from_document(stored).expect("partition should deserialize");

    assert_eq!(back.lower(), Some(&BoundValue::Null));
}

#[test]
fn absent_lower_bound_is_omitted_and_read_back_as_absent() {
    let key = PartitionKey::new(uuid(), RUN_ID, None);
    let stored = bson::to_document(&key).expect("key should serialize");
    assert!(!stored.contains_key("lowerBound"));

    let back: PartitionKey = bson::from_document(stored).expect("key should deserialize");
    assert_eq!(back.lower, None);
}

// ---- filter ------------------------------------------------------------

#[test]
fn filter_renders_cross_type_literal_comparisons() {
    let filter = ranged(5, 20).filter().to_document();
    assert_eq!(
        filter,
        doc! {
            "$and": [
                { "$expr": { "$gte": ["$_id", { "$literal": 5 }] } },
                { "$expr": { "$lte": ["$_id", { "$literal": 20 }] } }
            ]
        }
    );
}

#[test]
fn filter_wraps_operator_shaped_bounds_in_literal() {
    let sneaky = BoundValue::document(&doc! { "$where": "sleep(1000)" }).expect("encodes");
    let filter = ranged(sneaky, BoundValue::MaxKey).filter().to_document();

    let clauses = filter.get_array("$and").expect("and");
    let Bson::Document(gte) = &clauses[0] else {
        panic!("clause should be a document");
    };
    let args = gte
        .get_document("$expr")
        .and_then(|expr| expr.get_array("$gte"))
        .expect("gte arguments");
    assert_eq!(
        args[1],
        Bson::Document(doc! { "$literal": { "$where": "sleep(1000)" } })
    );
}

#[test]
fn filter_for_unassigned_lower_starts_at_min_key() {
    let mut partition = ranged(5, 20);
    partition.key.lower = None;
    let filter = RangeFilter::for_partition(&partition);

    assert_eq!(filter.lower(), &BoundValue::MinKey);
    assert!(filter.matches(&BoundValue::Null));
    assert!(filter.matches(&BoundValue::from(-1_000)));
    assert!(!filter.matches(&BoundValue::from(21)));
}

#[test]
fn filter_is_inclusive_on_both_ends() {
    let filter = ranged(5, 20).filter();
    assert!(filter.matches(&BoundValue::from(5)));
    assert!(filter.matches(&BoundValue::from(20.0)));
    assert!(filter.matches(&BoundValue::from(12.5)));
    assert!(!filter.matches(&BoundValue::from(4.999)));
    assert!(!filter.matches(&BoundValue::from(20_i64 + 1)));
}

#[test]
fn filter_admits_every_kind_between_mixed_bounds() {
    // Number..ObjectId covers all text, documents and binary values.
    let mut oid = [0u8; 12];
    oid[0] = 0x10;
    let filter = ranged(5, BoundValue::ObjectId(oid)).filter();

    assert!(filter.matches(&BoundValue::from("any string")));
    assert!(filter.matches(&BoundValue::document(&doc! { "k": 1 }).expect("encodes")));
    assert!(filter.matches(&BoundValue::binary(0, vec![1, 2, 3])));
    assert!(!filter.matches(&BoundValue::Bool(false)));
    assert!(!filter.matches(&BoundValue::Null));
}

#[test]
fn sentinel_filter_matches_everything() {
    let filter = RangeFilter::new(BoundValue::MinKey, BoundValue::MaxKey);
    for id in [
        BoundValue::MinKey,
        BoundValue::Null,
        BoundValue::from(0),
        BoundValue::DateTime(0),
        BoundValue::MaxKey,
    ] {
        assert!(filter.matches(&id), "{id:?}");
        assert!(eval_filter(&filter.to_document(), &id), "{id:?}");
    }
}

fn arb_id() -> impl Strategy<Value = BoundValue> {
    prop_oneof![
        Just(BoundValue::MinKey),
        Just(BoundValue::Null),
        (-50i32..50).prop_map(BoundValue::from),
        (-50i64..50).prop_map(BoundValue::from),
        (-50.0f64..50.0).prop_map(BoundValue::from),
        "[a-d]{0,3}".prop_map(BoundValue::from),
        (-5i32..5, "[a-b]").prop_map(|(n, k)| {
            let mut document = Document::new();
            document.insert(k, n);
            BoundValue::document(&document).expect("generated document should encode")
        }),
        prop::collection::vec(any::<u8>(), 0..3).prop_map(|bytes| BoundValue::binary(0, bytes)),
        (0u8..4).prop_map(|last| {
            let mut bytes = [0u8; 12];
            bytes[11] = last;
            BoundValue::ObjectId(bytes)
        }),
        any::<bool>().prop_map(BoundValue::Bool),
        (-50i64..50).prop_map(BoundValue::DateTime),
        Just(BoundValue::MaxKey),
    ]
}

proptest! {
    #[test]
    fn filter_matches_exactly_the_inclusive_range(
        a in arb_id(),
        b in arb_id(),
        id in arb_id(),
    ) {
        let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
        let partition = Partition::new(Namespace::new("m", "c"), uuid(), RUN_ID, lower.clone(), upper.clone());
        let filter = partition.filter();

        let expected = lower <= id && id <= upper;
        prop_assert_eq!(filter.matches(&id), expected);
        prop_assert_eq!(eval_filter(&filter.to_document(), &id), expected);
    }
}

// ---- command -----------------------------------------------------------

#[test]
fn ranged_command_pins_collection_and_cluster_time() {
    let command = ranged(5, 20).find_command(start_at(), FindOptions::default());
    let rendered = command.to_document();

    assert_eq!(
        rendered.keys().collect::<Vec<_>>(),
        [
            "find",
            "collectionUUID",
            "readConcern",
            "noCursorTimeout",
            "filter",
            "hint"
        ]
    );
    assert_eq!(rendered.get_str("find").expect("find"), "c");
    assert_eq!(rendered.get("collectionUUID"), Some(&Bson::from(uuid())));
    assert_eq!(
        rendered.get_document("readConcern").expect("readConcern"),
        &doc! { "level": "majority", "afterClusterTime": start_at() }
    );
    assert!(rendered.get_bool("noCursorTimeout").expect("noCursorTimeout"));
    assert_eq!(
        rendered.get_document("hint").expect("hint"),
        &doc! { "_id": 1 }
    );
    assert!(!rendered.contains_key("sort"));
    assert!(!rendered.contains_key("batchSize"));
    assert!(!command.is_natural_order());
}

#[test]
fn capped_command_reads_natural_order_without_filter() {
    let command = capped().find_command(start_at(), FindOptions::default());
    let rendered = command.to_document();

    assert_eq!(command.shape, ReadShape::Natural);
    assert!(command.filter().is_none());
    assert_eq!(
        rendered.get_document("sort").expect("sort"),
        &doc! { "$natural": 1 }
    );
    assert!(!rendered.contains_key("filter"));
    assert!(!rendered.contains_key("hint"));
}

#[test]
fn capped_command_ignores_bounds() {
    let mut partition = ranged(5, 20);
    partition.is_capped = true;
    let rendered = partition
        .find_command(start_at(), FindOptions::default())
        .to_document();

    assert_eq!(rendered, capped().find_command(start_at(), FindOptions::default()).to_document());
}

#[test]
fn batch_size_override_is_rendered_before_read_shape() {
    let options = FindOptions::new().with_batch_size(2);
    let rendered = ranged(5, 20).find_command(start_at(), options).to_document();

    assert_eq!(rendered.get_i64("batchSize").expect("batchSize"), 2);
    let keys = rendered.keys().collect::<Vec<_>>();
    assert_eq!(keys[4], "batchSize");
    assert_eq!(keys[5], "filter");
}

#[test]
fn find_options_load_from_camel_case_config() {
    let options: FindOptions =
        bson::from_document(doc! { "batchSize": 10_i64 }).expect("options should deserialize");
    assert_eq!(options, FindOptions::new().with_batch_size(10));

    let defaults: FindOptions = bson::from_document(doc! {}).expect("defaults should apply");
    assert_eq!(defaults, FindOptions::default());
}

#[test]
fn command_converts_into_document() {
    let command = ranged(5, 20).find_command(start_at(), FindOptions::default());
    let expected = command.to_document();
    assert_eq!(Document::from(command), expected);
}

// ---- resume ------------------------------------------------------------

#[test]
fn resume_bound_is_last_seen_id() {
    let partition = ranged(5, 20);
    let bound = partition
        .lower_bound_from_current(&raw(&doc! { "_id": 42, "x": 1 }))
        .expect("document should decode");
    assert_eq!(bound, Some(BoundValue::from(42)));
}

#[test]
fn resume_bound_keeps_document_ids_intact() {
    let partition = ranged(BoundValue::MinKey, BoundValue::MaxKey);
    let id = doc! { "tenant": "a", "seq": 9_i64 };
    let bound = partition
        .lower_bound_from_current(&raw(&doc! { "_id": id.clone(), "payload": true }))
        .expect("document should decode")
        .expect("bound should be present");

    assert_eq!(bound.to_bson(), Bson::Document(id));
}

#[test]
fn resume_bound_absent_for_capped_or_empty_input() {
    let current = raw(&doc! { "_id": 42 });
    assert_eq!(capped().lower_bound_from_current(&current).expect("capped"), None);
    assert_eq!(ranged(5, 20).lower_bound_from_current(&[]).expect("empty"), None);
}

#[test]
fn resume_bound_reports_missing_ordering_key() {
    let err = ranged(5, 20)
        .lower_bound_from_current(&raw(&doc! { "x": 1 }))
        .expect_err("no _id");

    assert!(matches!(
        err,
        ResumeBoundError::MissingOrderingKey { field: "_id" }
    ));
    assert_eq!(err.class(), ErrorClass::InvariantViolation);
}

#[test]
fn resume_bound_reports_decode_failure() {
    let err = ranged(5, 20)
        .lower_bound_from_current(&[0x05, 0x00, 0x00])
        .expect_err("garbage bytes");

    assert!(matches!(err, ResumeBoundError::Decode { .. }));
    assert_eq!(err.class(), ErrorClass::Corruption);
}

#[test]
fn resume_bound_reports_truncated_document_as_decode_failure() {
    let mut bytes = raw(&doc! { "_id": 42, "x": "payload" });
    bytes.truncate(bytes.len() - 4);

    let err = ranged(5, 20)
        .lower_bound_from_current(&bytes)
        .expect_err("truncated document");
    assert!(matches!(err, ResumeBoundError::Decode { .. }));
}

#[test]
fn resume_bound_ignores_malformed_payload_fields() {
    // Server-stored strings are not guaranteed to be valid UTF-8.
    let mut bytes = raw(&doc! { "_id": 42, "x": "ab" });
    let at = bytes
        .windows(2)
        .position(|window| window == b"ab")
        .expect("payload string should be encoded");
    bytes[at] = 0xff;

    let bound = ranged(5, 20)
        .lower_bound_from_current(&bytes)
        .expect("only the ordering key is decoded");
    assert_eq!(bound, Some(BoundValue::from(42)));
}

#[test]
fn resume_bound_accepts_decimal_ids() {
    let bound = ranged(5, 100)
        .lower_bound_from_current(&raw(&doc! { "_id": decimal128(42, 0), "x": 1 }))
        .expect("document should decode")
        .expect("bound should be present");

    assert_eq!(bound, BoundValue::from(42));
    assert_eq!(bound.to_bson(), Bson::Decimal128(decimal128(42, 0)));
}

#[test]
fn decimal_lower_bound_persists_as_decimal() {
    let partition = ranged(5, 100).with_lower_bound(BoundValue::from(decimal128(425, -1)));

    let stored = bson::to_document(&partition).expect("partition should serialize");
    let id = stored.get_document("_id").expect("_id");
    assert_eq!(
        id.get("lowerBound"),
        Some(&Bson::Decimal128(decimal128(425, -1)))
    );

    let loaded: Partition = bson::from_document(stored).expect("partition should deserialize");
    assert_eq!(loaded, partition);
    assert!(loaded.filter().matches(&BoundValue::from(43)));
    assert!(!loaded.filter().matches(&BoundValue::from(42)));
}

#[test]
fn resume_bound_rejects_unorderable_ids() {
    let err = ranged(5, 20)
        .lower_bound_from_current(&raw(&doc! { "_id": [1, 2] }))
        .expect_err("array ids cannot bound a range");

    assert!(matches!(err, ResumeBoundError::UnsupportedOrderingKey { .. }));
    assert_eq!(err.class(), ErrorClass::Unsupported);
}

#[test]
fn checkpoint_rewrites_only_the_lower_bound() {
    let partition = ranged(5, 20);
    let next = partition
        .checkpoint(&raw(&doc! { "_id": 11 }))
        .expect("document should decode")
        .expect("progress should be recorded");

    assert_eq!(next, partition.with_lower_bound(BoundValue::from(11)));
    assert_eq!(partition.checkpoint(&[]).expect("empty"), None);
    assert_eq!(capped().checkpoint(&raw(&doc! { "_id": 1 })).expect("capped"), None);
}

#[test]
fn resumed_read_includes_last_seen_document() {
    let partition = ranged(5, 20);
    let last_seen = doc! { "_id": 12, "x": 1 };

    let resumed = partition
        .checkpoint(&raw(&last_seen))
        .expect("document should decode")
        .expect("progress should be recorded");
    let filter = resumed
        .find_command(start_at(), FindOptions::default())
        .filter()
        .cloned()
        .expect("ranged read");

    // inclusive: the last-seen document is read again, nothing before it is
    assert!(filter.matches(&BoundValue::from(12)));
    assert!(!filter.matches(&BoundValue::from(11)));
    assert!(eval_filter(&filter.to_document(), &BoundValue::from(12)));
}
