//! Property tests for the query codec and the response sanitizer.

use axum::body::Bytes;
use proptest::prelude::*;
use request_pipeline::http::{
    decode_sorting, encode_sorting_query, page_count, Sorting, SortingField,
};
use request_pipeline::security::sanitize;

// Any non-empty field name without a comma, including sign-prefixed ones.
fn arb_field() -> impl Strategy<Value = SortingField> {
    (
        prop::string::string_regex("[-+]{0,2}[-+A-Za-z0-9_.]{1,12}").unwrap(),
        any::<bool>(),
    )
        .prop_map(|(name, desc)| {
            if desc {
                SortingField::desc(name)
            } else {
                SortingField::asc(name)
            }
        })
}

proptest! {
    #[test]
    fn proptest_sorting_round_trip(fields in prop::collection::vec(arb_field(), 0..6)) {
        let sorting = Sorting { fields };
        let (param, encoded) = encode_sorting_query(&sorting);
        prop_assert_eq!(param, "sort");
        prop_assert_eq!(decode_sorting(Some(&encoded)), sorting);
    }

    #[test]
    fn proptest_sanitize_twice_equals_once(input in prop::collection::vec(
        prop_oneof![Just(b'<'), Just(b'/'), Just(b's'), Just(b'c'), Just(b' '), any::<u8>()],
        0..64,
    )) {
        let once = sanitize(Bytes::from(input));
        let twice = sanitize(once.clone());
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn proptest_sanitize_inserts_one_byte_per_match(input in prop::collection::vec(
        prop_oneof![Just(b'<'), Just(b'/'), Just(b's'), Just(b'c'), any::<u8>()],
        0..64,
    )) {
        let matches = input.windows(4).filter(|w| *w == b"</sc").count();
        let output = sanitize(Bytes::from(input.clone()));
        prop_assert_eq!(output.len(), input.len() + matches);
        if matches == 0 {
            prop_assert_eq!(&output[..], &input[..]);
        }
    }

    #[test]
    fn proptest_page_count_covers_total(total in 0u64..1_000_000, size in 1u32..10_000) {
        let pages = page_count(total, size);
        prop_assert!(pages * u64::from(size) >= total);
        prop_assert!(pages == 0 || (pages - 1) * u64::from(size) < total);
    }
}
