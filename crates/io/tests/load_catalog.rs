// Integration tests: load the fixture catalog from disk and query it.
// Run with: cargo test -p isofind-io --test load_catalog

use std::path::{Path, PathBuf};
use std::sync::Arc;

use isofind_equiv::{Catalogs, Interval, QueryContext, ReasonCode, SpecQuery};
use isofind_io::open_catalog;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load() -> (Catalogs, QueryContext) {
    let open = open_catalog(&fixtures_dir().join("catalog.toml")).unwrap();
    assert_eq!(open.config.name, "fixture catalog");
    let ctx = QueryContext::new(Arc::new(open.catalogs.clone()), open.config.tolerance);
    (open.catalogs, ctx)
}

const T_H170: &str = "T-D-MM1-VV1-REI120-CV35-X80-H170-6.0";
const XT_H170: &str = "XT-D-MM1-VV1-REI120-CV50-X80-H170-6.0";

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn continuation_files_lose_their_first_row() {
    let (catalogs, _) = load();
    let summary = catalogs.summary();
    assert_eq!(summary.schoeck_rows, 6);
    assert_eq!(summary.schoeck_matchable, 5);
    assert_eq!(summary.leviat_variants, 6);
    assert_eq!(summary.leviat_product_types, 3);

    assert!(catalogs.find_schoeck("Encoded").is_none());

    let sp = catalogs.find_leviat("HIT-SP MVX-1010-27-100-45").unwrap();
    assert_eq!(sp.height, 250, "the dropped 999 row must not set the height");
    assert_eq!(sp.moment_range, Interval::new(55.0, 56.5));
    assert_eq!(sp.variant_count, 2);
}

#[test]
fn dash_shear_reads_as_zero() {
    let (catalogs, _) = load();
    let sp = catalogs.find_leviat("HIT-SP MVX-1010-27-100-45").unwrap();
    assert_eq!(sp.shear_range, Interval::new(0.0, 96.0));
}

#[test]
fn out_of_class_variant_does_not_widen_range() {
    let (catalogs, _) = load();
    let hp = catalogs.find_leviat("HIT-HP MVX-0507-16-100-35").unwrap();
    assert_eq!(hp.moment_range, Interval::new(20.0, 21.0));
    assert_eq!(hp.shear_range, Interval::new(47.0, 49.0));
    assert_eq!(hp.height, 170);
    assert_eq!(hp.moment_type, "mrd_k");
}

#[test]
fn schoeck_rows_keep_source_order_and_extras() {
    let (catalogs, _) = load();
    let ids: Vec<_> = catalogs.schoeck().iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids[0], "T-D-MM1-VV1-REI120-CV35-X80-H160-6.0");
    assert_eq!(ids[4], XT_H170);

    let xt = catalogs.find_schoeck(XT_H170).unwrap();
    assert_eq!(xt.moment, Some(20.8));
    assert_eq!(xt.height, Some(170));
    assert_eq!(xt.extra.get("Typ").map(String::as_str), Some("XT"));
    assert!(!xt.extra.contains_key("TableName"));
}

// ---------------------------------------------------------------------------
// Queries across files
// ---------------------------------------------------------------------------

#[test]
fn by_code_finds_neighbour_in_continuation_file() {
    let (_, ctx) = load();
    let result = ctx.by_code(T_H170, None).unwrap();

    let rows = result.schoeck.rows();
    let ids: Vec<_> = rows.iter().map(|r| r.record.identifier.as_str()).collect();
    assert_eq!(ids, vec![T_H170, XT_H170]);
    assert!(rows[0].is_origin);
    assert!(!rows[1].is_origin);

    assert_eq!(result.leviat.reason(), Some(ReasonCode::NotFound));
}

#[test]
fn by_code_leviat_self_match() {
    let (_, ctx) = load();
    let result = ctx.by_code("HIT-HP MVX-0507-16-100-35", None).unwrap();

    assert_eq!(result.schoeck.reason(), Some(ReasonCode::NotFound));
    let rows = result.leviat.rows();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_origin);
}

#[test]
fn by_specs_matches_both_manufacturers() {
    let (_, ctx) = load();
    let result = ctx
        .by_specs(&SpecQuery {
            moment: 20.5,
            shear: 48.0,
            height: 170,
            band: None,
        })
        .unwrap();

    let ids: Vec<_> = result
        .schoeck
        .rows()
        .iter()
        .map(|r| r.record.identifier.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["T-D-MM1-VV1-REI120-CV35-X80-H160-6.0", T_H170, XT_H170]
    );

    let codes: Vec<_> = result
        .leviat
        .rows()
        .iter()
        .map(|r| r.record.product_type_code.as_str())
        .collect();
    assert_eq!(codes, vec!["HIT-HP MVX-0507-16-100-35"]);
}

#[test]
fn by_specs_range_overlap_with_placeholder_shear() {
    let (_, ctx) = load();
    let result = ctx
        .by_specs(&SpecQuery {
            moment: 55.0,
            shear: 96.6,
            height: 250,
            band: None,
        })
        .unwrap();

    assert_eq!(result.schoeck.rows().len(), 1);
    assert_eq!(result.leviat.rows().len(), 1);
    assert_eq!(
        result.leviat.rows()[0].record.product_type_code,
        "HIT-SP MVX-1010-27-100-45"
    );
}

#[test]
fn result_serializes_with_reason_codes() {
    let (_, ctx) = load();
    let result = ctx.by_code(T_H170, None).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["meta"]["mode"], "by_code");
    assert_eq!(json["schoeck"]["status"], "matched");
    assert_eq!(json["schoeck"]["rows"][0]["is_origin"], true);
    assert_eq!(json["schoeck"]["rows"][0]["identifier"], T_H170);
    assert_eq!(json["schoeck"]["origin"]["identifier"], T_H170);
    assert_eq!(json["leviat"]["status"], "empty");
    assert_eq!(json["leviat"]["reason"], "NOT_FOUND");
}
