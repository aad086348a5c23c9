//! Tactical-reading scenarios named in the spec's testable-properties list:
//! snapback, nakade vital points, ladder capture, and the self-atari
//! exceptions for captures and throw-ins. Each board is built by hand and
//! the shape is checked against the exact semantics of the reader it
//! exercises before the assertion, not just asserted on faith.

use gocore::board::{Board, BoardConfig};
use gocore::spatial::SpatialContext;
use gocore::tactics;
use gocore::types::{occ, BoardGeometry, Color, Point};

fn new_board(size: usize) -> Board {
    let geo = BoardGeometry::new(size);
    let spatial = SpatialContext::new(&geo, 1);
    Board::new(size, BoardConfig::default(), spatial)
}

fn pt(b: &Board, col: usize, row_from_top: usize) -> Point {
    row_from_top * b.geo.stride + col
}

// ---------------------------------------------------------------------
// Scenario: snapback (spec.md §8)
//
// A lone white stone at the corner shares its only liberty with a black
// group that is itself down to that same liberty. Capturing the white
// stone would leave a single black stone that white immediately
// recaptures, so `capturing_group_is_snapback` must say so, and
// `can_capture` must refuse to call it a clean capture.
// ---------------------------------------------------------------------

#[test]
fn snapback_capture_of_a_lone_corner_stone_is_recognized() {
    let mut b = new_board(5);
    let wp = pt(&b, 1, 1);

    // White's corner stone, its {(3,1),(3,2)} wall, and the two stones
    // that pin the bait group down to a single shared liberty at (2,1).
    // Black fillers keep the alternation legal without touching the shape.
    b.play(pt(&b, 5, 5)).unwrap(); // B filler
    b.play(wp).unwrap(); // W corner
    b.play(pt(&b, 5, 4)).unwrap(); // B filler
    b.play(pt(&b, 3, 1)).unwrap(); // W wall, east of the shared liberty
    b.play(pt(&b, 4, 5)).unwrap(); // B filler
    b.play(pt(&b, 3, 2)).unwrap(); // W wall, completes the {(3,1),(3,2)} group
    b.play(pt(&b, 2, 2)).unwrap(); // B cutting stone, one arm of the bait group
    b.play(pt(&b, 1, 3)).unwrap(); // W pin, south of (1,2)
    b.play(pt(&b, 1, 2)).unwrap(); // B completes the bait group {(1,2),(2,2)}
    b.play(pt(&b, 2, 3)).unwrap(); // W pin, south of (2,2): bait now down to (2,1) alone

    let shared_lib = pt(&b, 2, 1);
    assert_eq!(b.at(shared_lib), occ::EMPTY);
    assert_eq!(b.at(wp), occ::of(Color::White));

    let wp_group = b.group_at(wp);
    assert_eq!(b.group_libs(wp_group), 1);
    assert_eq!(b.group_lib_list(wp_group), &[shared_lib]);

    let bait_group = b.group_at(pt(&b, 1, 2));
    assert_eq!(b.group_libs(bait_group), 1);
    assert_eq!(b.group_lib_list(bait_group), &[shared_lib]);

    assert!(tactics::capturing_group_is_snapback(&b, wp_group));
    assert!(!tactics::can_capture(&b, wp_group));
}

// ---------------------------------------------------------------------
// Scenario: nakade vital point (spec.md §8)
//
// Adapted from the cross/plus-shaped bulky-five fixture already used in
// `tactics.rs`'s own unit tests: an enclosed five-point region bordered
// entirely by one color has a single vital point where all four arms
// meet.
// ---------------------------------------------------------------------

#[test]
fn nakade_cross_five_vital_point_is_the_center() {
    let mut b = new_board(9);
    let center = pt(&b, 5, 5);
    let area = [
        center,
        pt(&b, 4, 5),
        pt(&b, 6, 5),
        pt(&b, 5, 4),
        pt(&b, 5, 6),
    ];
    let mut border = Vec::new();
    for p in area {
        for nb in b.geo.neighbors(p) {
            if !area.contains(&nb) && !border.contains(&nb) {
                border.push(nb);
            }
        }
    }
    for (i, mv) in border.iter().enumerate() {
        if b.to_play() == Color::Black {
            b.play(*mv).unwrap();
        } else {
            let filler = pt(&b, 9, i % 9 + 1);
            b.play(filler).unwrap();
            b.play(*mv).unwrap();
        }
    }
    for p in area {
        assert_eq!(b.at(p), occ::EMPTY);
    }
    assert_eq!(tactics::nakade_point(&b, center, Color::Black), Some(center));
    assert!(tactics::nakade_dead_shape(&b, center, Color::Black));
}

// ---------------------------------------------------------------------
// Scenario: ladder capture (spec.md §8)
//
// A white stone backed up against the left edge with a single chaser has
// exactly one way out: the corner. Once it occupies the corner it has
// exactly one liberty left, and taking that liberty captures it, so the
// reader must say "ladder" regardless of which of the chaser's two
// opening ataris is tried first. The complementary "a stone with open
// liberties on both sides escapes" half of this property is already
// covered by `ladder_reader_recognizes_an_open_escape` in `tactics.rs`.
// ---------------------------------------------------------------------

#[test]
fn ladder_reader_captures_a_stone_run_into_a_corner() {
    let mut b = new_board(9);
    b.play(pt(&b, 2, 2)).unwrap(); // B chaser
    b.play(pt(&b, 1, 2)).unwrap(); // W target, libs {(1,1),(1,3)}

    let white = pt(&b, 1, 2);
    assert_eq!(b.group_libs(b.group_at(white)), 2);
    assert_eq!(b.to_play(), Color::Black);

    assert!(tactics::is_ladder(&mut b, white));
}

// ---------------------------------------------------------------------
// Scenario: self-atari exceptions (spec.md §8)
// ---------------------------------------------------------------------

#[test]
fn selfatari_that_captures_a_lone_enemy_stone_is_not_bad() {
    let mut b = new_board(5);
    // Black's flanking stone puts the white corner stone in atari; a
    // second white group sits on the move's other side with plenty of
    // liberties so it doesn't interfere with the capture check.
    b.play(pt(&b, 2, 1)).unwrap(); // B flank
    b.play(pt(&b, 1, 1)).unwrap(); // W corner stone, now in atari on (1,2)
    b.play(pt(&b, 5, 5)).unwrap(); // B elsewhere
    b.play(pt(&b, 2, 2)).unwrap(); // W second group, away from the shape

    let to = pt(&b, 1, 2);
    assert_eq!(b.at(to), occ::EMPTY);
    let corner_group = b.group_at(pt(&b, 1, 1));
    assert_eq!(b.group_libs(corner_group), 1);
    assert_eq!(b.group_lib_list(corner_group), &[to]);

    assert!(!tactics::is_bad_selfatari(&b, Color::Black, to));
}

#[test]
fn corner_throwin_with_only_one_liberty_and_no_capture_is_bad() {
    let mut b = new_board(9);
    // Black fills all but the corner's one liberty; playing white into
    // that corner captures nothing and is a plain bad self-atari.
    b.play(pt(&b, 1, 8)).unwrap(); // B
    b.play(pt(&b, 9, 9)).unwrap(); // W elsewhere
    b.play(pt(&b, 2, 9)).unwrap(); // B
    b.play(pt(&b, 8, 9)).unwrap(); // W elsewhere

    let corner = pt(&b, 1, 9);
    assert!(tactics::is_bad_selfatari(&b, Color::White, corner));
}
