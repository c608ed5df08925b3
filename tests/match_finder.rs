//! Match-finder determinism: the chain walk must return the same
//! (length, start) pair whichever comparison tier performs it, and the
//! length must never exceed the lookahead.

use proptest::prelude::*;

use zflate::match_finder::{longest_match_16, longest_match_32, longest_match_64, longest_match_base};
use zflate::{ChainMatchFinder, MIN_LOOKAHEAD};

/// Builds a finder over `data` with every position below the cursor
/// inserted, cursor parked `MIN_LOOKAHEAD` bytes before the end, and the
/// string at the cursor freshly inserted. Returns the finder and the chain
/// head to search.
fn prepared(level: u8, data: &[u8]) -> (ChainMatchFinder, u32) {
    assert!(data.len() > MIN_LOOKAHEAD + 3);
    let mut mf = ChainMatchFinder::new(level, 15).unwrap();
    mf.fill_window(data);
    let strstart = data.len() - MIN_LOOKAHEAD;
    mf.insert_range(0, strstart);
    mf.advance(strstart);
    let head = mf.insert_string(strstart);
    (mf, head)
}

proptest! {
    // A 4-symbol alphabet makes repeats dense enough that real chains form.
    #[test]
    fn tiers_agree_at_slow_levels(
        data in proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b'), Just(b'c'), Just(b'd')], 600..2000),
        level in 5u8..=9,
    ) {
        let (mut base, head) = prepared(level, &data);
        prop_assume!(head != 0);
        let len_base = longest_match_base(&mut base, head);

        let (mut w16, head16) = prepared(level, &data);
        prop_assert_eq!(head16, head);
        let len_16 = longest_match_16(&mut w16, head);

        let (mut w32, _) = prepared(level, &data);
        let len_32 = longest_match_32(&mut w32, head);

        let (mut w64, _) = prepared(level, &data);
        let len_64 = longest_match_64(&mut w64, head);

        prop_assert_eq!(len_base, len_16);
        prop_assert_eq!(len_base, len_32);
        prop_assert_eq!(len_base, len_64);
        if len_base as usize > base.prev_length().max(1) {
            prop_assert_eq!(base.match_start(), w16.match_start());
            prop_assert_eq!(base.match_start(), w32.match_start());
            prop_assert_eq!(base.match_start(), w64.match_start());
        }
    }

    #[test]
    fn length_never_exceeds_lookahead(
        data in proptest::collection::vec(prop_oneof![Just(b'a'), Just(b'b')], 300..800),
        level in 1u8..=9,
    ) {
        let (mut mf, head) = prepared(level, &data);
        prop_assume!(head != 0);
        let lookahead = mf.lookahead();
        let len = mf.longest_match(head);
        prop_assert!(len as usize <= lookahead);
    }
}

#[test]
fn nearest_candidate_wins_length_tie() {
    // "abc" occurs at 0, 3 and 6; searching from 6 must pick 3, the
    // nearest of the two equally long candidates, because the chain is
    // walked newest-first and ties never replace.
    for f in [longest_match_base, longest_match_16, longest_match_32, longest_match_64] {
        let mut mf = ChainMatchFinder::new(6, 15).unwrap();
        mf.fill_window(b"abcabcabc");
        mf.insert_range(0, 6);
        mf.advance(6);
        let head = mf.insert_string(6);
        assert_eq!(head, 3);

        let len = f(&mut mf, head);
        assert_eq!(len, 3);
        assert_eq!(mf.match_start(), 3);
    }
}

#[test]
fn fast_level_reports_best_seen() {
    // Chain for "xyz" from position 15 runs 10, 5, 0; all three share only
    // the 3-byte prefix with the scan, so the nearest stays the best.
    let data = b"xyzw_xyzq_xyzw_xyzABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut mf = ChainMatchFinder::new(1, 15).unwrap();
    mf.fill_window(data);
    mf.insert_range(0, 15);
    mf.advance(15);
    let head = mf.insert_string(15);
    assert_eq!(head, 10);

    let len = longest_match_base(&mut mf, head);
    assert_eq!(len, 3);
    assert_eq!(mf.match_start(), 10);
}
