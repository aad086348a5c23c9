//! Board/group representation: the hottest part of the engine.
//!
//! Grounded on `original_source/board.{c,h}`, generalizing the teacher's
//! `position.rs` (which used a move-relative `X`/`x` color encoding
//! requiring a whole-board recolor every move) into the incremental,
//! absolute-color, group-indexed model `spec.md` §3-§4.1 specifies. See
//! `SPEC_FULL.md` §3 for why the encoding changed.

use crate::error::MoveError;
use crate::spatial::SpatialContext;
use crate::types::{BoardGeometry, Color, Point, occ};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

/// Cap on tracked liberties per group (`spec.md` §3's `K`). Liberties beyond
/// this are "intentionally unobserved".
pub const GROUP_KEEP_LIBS: usize = 10;
/// Refill threshold `R` (`spec.md` §3): once the tracked count drops to this
/// many, rescan the group for an exact (up to `K`) liberty list.
pub const GROUP_REFILL_LIBS: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rules {
    Chinese,
    Japanese,
    NewZealand,
    Aga,
    Ing,
}

impl Rules {
    /// New Zealand rules are the one ruleset here that lets a move remove its
    /// own just-played group rather than rejecting it outright
    /// (`original_source/board.h`'s rules doc: "Chinese... w/ suicide, or you
    /// can look at it as New Zealand w/o handicap stones compensation").
    pub fn allows_suicide(self) -> bool {
        matches!(self, Rules::NewZealand)
    }

    /// Japanese rules score territory rather than stones-on-board area, so a
    /// playout's random passes shouldn't leave marks on the real game's pass
    /// bookkeeping (`original_source/playout.c`'s `starting_passes` snapshot,
    /// restored only `if (b->rules == RULES_JAPANESE)`).
    pub fn is_territory_scoring(self) -> bool {
        matches!(self, Rules::Japanese)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuperkoPolicy {
    /// Do not track or enforce superko at all.
    Off,
    /// Track the ring and let the caller query `Board::would_violate_superko`,
    /// but don't reject moves for it.
    Flag,
    /// Reject moves that would repeat a prior position.
    Forbid,
}

#[derive(Clone, Debug)]
pub struct BoardConfig {
    pub rules: Rules,
    pub komi: f32,
    pub superko: SuperkoPolicy,
    /// Capacity of the positional-superko ring buffer (`spec.md` §3).
    pub superko_history: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            rules: Rules::Chinese,
            komi: 7.5,
            superko: SuperkoPolicy::Forbid,
            superko_history: 1024,
        }
    }
}

/// Per-group cached liberties and size. Named by its representative point
/// (`spec.md` §3: "a group is named by the lowest-numbered stone it
/// contains"). Stored at `Board::group_info[id]`.
#[derive(Clone, Debug)]
pub struct GroupInfo {
    pub color: Color,
    pub size: u32,
    libs: [Point; GROUP_KEEP_LIBS],
    nlibs: u8,
}

impl GroupInfo {
    fn singleton(color: Color) -> Self {
        GroupInfo {
            color,
            size: 1,
            libs: [0; GROUP_KEEP_LIBS],
            nlibs: 0,
        }
    }

    #[inline]
    pub fn libs(&self) -> usize {
        self.nlibs as usize
    }

    #[inline]
    pub fn lib_list(&self) -> &[Point] {
        &self.libs[..self.nlibs as usize]
    }

    fn contains_lib(&self, pt: Point) -> bool {
        self.lib_list().contains(&pt)
    }

    /// Remove `pt` from the tracked liberties if present. Returns whether it
    /// was removed (liberty count decreased).
    fn remove_lib(&mut self, pt: Point) -> bool {
        if let Some(pos) = self.lib_list().iter().position(|&p| p == pt) {
            let last = self.nlibs as usize - 1;
            self.libs[pos] = self.libs[last];
            self.nlibs -= 1;
            true
        } else {
            false
        }
    }

    /// Add `pt` as a tracked liberty if there's room and it isn't already
    /// tracked. Returns whether it was added.
    fn add_lib(&mut self, pt: Point) -> bool {
        if self.nlibs as usize >= GROUP_KEEP_LIBS || self.contains_lib(pt) {
            return false;
        }
        self.libs[self.nlibs as usize] = pt;
        self.nlibs += 1;
        true
    }

    fn set_libs(&mut self, libs: &[Point]) {
        let n = libs.len().min(GROUP_KEEP_LIBS);
        self.libs[..n].copy_from_slice(&libs[..n]);
        self.nlibs = n as u8;
    }
}

/// Reversal data for one `quick_play`/full `play`. Every mutation the move
/// performed is logged as `(location, prior_value)`; `Board::apply_undo`
/// replays the logs in reverse so repeated touches to the same location
/// unwind correctly without needing first-touch deduplication.
#[derive(Clone, Debug)]
pub struct UndoRecord {
    color_changes: Vec<(Point, u8)>,
    group_id_changes: Vec<(Point, Point)>,
    next_changes: Vec<(Point, Point)>,
    group_info_changes: Vec<(Point, Option<GroupInfo>)>,
    nbr_count_changes: Vec<(Point, [u8; 4])>,
    captures_before: [u32; 2],
    to_play_before: Color,
    move_num_before: usize,
    last_before: (Point, Point, Point),
    ko_before: (Point, Option<Color>),
}

impl UndoRecord {
    fn new(board: &Board) -> Self {
        UndoRecord {
            color_changes: Vec::new(),
            group_id_changes: Vec::new(),
            next_changes: Vec::new(),
            group_info_changes: Vec::new(),
            nbr_count_changes: Vec::new(),
            captures_before: board.captures,
            to_play_before: board.to_play,
            move_num_before: board.move_num,
            last_before: (board.last, board.last2, board.last3),
            ko_before: (board.ko, board.ko_forbidden),
        }
    }
}

/// Outcome of a successful (quick-)play: which representative group the
/// played stone ended up in, the points captured, and the undo log.
pub struct PlayOutcome {
    pub group: Point,
    pub captured: Vec<Point>,
    /// Own stones removed by a suicide play (rules that allow it only;
    /// always empty otherwise). Includes the just-played point itself,
    /// since it joins the group that gets removed.
    pub suicided: Vec<Point>,
    pub undo: UndoRecord,
}

fn color_index(c: Color) -> usize {
    match c {
        Color::Black => 0,
        Color::White => 1,
    }
}

/// A Go board: stone map, group table, neighbor counts, 3x3 pattern codes,
/// ko/superko state, and the quick-play/undo shadow path. See `spec.md` §3
/// for the full invariant list and `SPEC_FULL.md` §3 for encoding notes.
#[derive(Clone)]
pub struct Board {
    pub geo: Arc<BoardGeometry>,
    spatial: Arc<SpatialContext>,
    pub config: BoardConfig,

    color: Vec<u8>,
    group_id: Vec<Point>,
    next_in_group: Vec<Point>,
    group_info: Vec<Option<GroupInfo>>,
    /// Counts of [empty, black, white, offboard] among the 4 orthogonal
    /// neighbors of each point (`spec.md` §3 "Per-point aux state").
    nbr_count: Vec<[u8; 4]>,
    /// 16-bit 3x3 pattern code (2 bits/neighbor, order N,E,S,W,NE,SE,SW,NW).
    pat3: Vec<u16>,
    free_points: Vec<Point>,
    free_index: Vec<i32>,

    to_play: Color,
    move_num: usize,
    ko: Point,
    ko_forbidden: Option<Color>,
    last: Point,
    last2: Point,
    last3: Point,
    captures: [u32; 2],
    /// Lifetime pass count per color (`original_source/board.h`'s
    /// `passes[S_MAX]`), snapshotted and restored around playouts under
    /// territory-scoring rules so a rollout's random passes don't leak into
    /// the real game's bookkeeping.
    passes: [u32; 2],
    hash: u64,
    superko_ring: VecDeque<u64>,
    resigned: Option<Color>,
    quick_active: bool,
}

impl Board {
    pub fn new(size: usize, config: BoardConfig, spatial: Arc<SpatialContext>) -> Self {
        let geo = BoardGeometry::new(size);
        let mut b = Board {
            color: vec![occ::OFFBOARD; geo.board_area],
            group_id: vec![0; geo.board_area],
            next_in_group: vec![0; geo.board_area],
            group_info: vec![None; geo.board_area],
            nbr_count: vec![[0; 4]; geo.board_area],
            pat3: vec![0; geo.board_area],
            free_points: Vec::with_capacity(size * size),
            free_index: vec![-1; geo.board_area],
            to_play: Color::Black,
            move_num: 0,
            ko: 0,
            ko_forbidden: None,
            last: 0,
            last2: 0,
            last3: 0,
            captures: [0, 0],
            passes: [0, 0],
            hash: 0,
            superko_ring: VecDeque::with_capacity(config.superko_history),
            resigned: None,
            quick_active: false,
            geo,
            spatial,
            config,
        };
        b.clear();
        b
    }

    /// Reset to an empty board, keeping geometry/config/dictionaries.
    pub fn clear(&mut self) {
        self.color.fill(occ::OFFBOARD);
        self.free_points.clear();
        for pt in self.geo.imin..self.geo.imax {
            if self.geo.row_col(pt).1 == 0 {
                continue; // left padding column
            }
            self.color[pt] = occ::EMPTY;
            self.free_index[pt] = self.free_points.len() as i32;
            self.free_points.push(pt);
        }
        self.group_id.fill(0);
        self.next_in_group.fill(0);
        self.group_info.fill(None);
        for pt in 0..self.geo.board_area {
            let mut cnt = [0u8; 4];
            for nb in self.geo.neighbors(pt) {
                if nb < self.geo.board_area {
                    cnt[self.color[nb] as usize] += 1;
                }
            }
            self.nbr_count[pt] = cnt;
        }
        for pt in 0..self.geo.board_area {
            self.pat3[pt] = self.compute_pat3(pt);
        }
        self.to_play = Color::Black;
        self.move_num = 0;
        self.ko = 0;
        self.ko_forbidden = None;
        self.last = 0;
        self.last2 = 0;
        self.last3 = 0;
        self.captures = [0, 0];
        self.passes = [0, 0];
        self.hash = 0;
        self.superko_ring.clear();
        self.resigned = None;
        self.quick_active = false;
    }

    // -- accessors --------------------------------------------------------

    #[inline]
    pub fn to_play(&self) -> Color {
        self.to_play
    }

    #[inline]
    pub fn move_num(&self) -> usize {
        self.move_num
    }

    #[inline]
    pub fn at(&self, pt: Point) -> u8 {
        self.color[pt]
    }

    #[inline]
    pub fn color_at(&self, pt: Point) -> Option<Color> {
        occ::color(self.color[pt])
    }

    #[inline]
    pub fn last_move(&self) -> Point {
        self.last
    }
    #[inline]
    pub fn last_move2(&self) -> Point {
        self.last2
    }
    #[inline]
    pub fn last_move3(&self) -> Point {
        self.last3
    }

    #[inline]
    pub fn ko_point(&self) -> Point {
        self.ko
    }

    #[inline]
    pub fn captures(&self, color: Color) -> u32 {
        self.captures[color_index(color)]
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn free_points(&self) -> &[Point] {
        &self.free_points
    }

    #[inline]
    pub fn pat3(&self, pt: Point) -> u16 {
        self.pat3[pt]
    }

    #[inline]
    pub fn nbr_count(&self, pt: Point, code: u8) -> u8 {
        self.nbr_count[pt][code as usize]
    }

    #[inline]
    pub fn group_at(&self, pt: Point) -> Point {
        self.group_id[pt]
    }

    pub fn group_info(&self, id: Point) -> Option<&GroupInfo> {
        self.group_info.get(id).and_then(|g| g.as_ref())
    }

    pub fn group_libs(&self, id: Point) -> usize {
        self.group_info(id).map(|g| g.libs()).unwrap_or(0)
    }

    pub fn group_lib_list(&self, id: Point) -> &[Point] {
        self.group_info(id).map(|g| g.lib_list()).unwrap_or(&[])
    }

    pub fn group_color(&self, id: Point) -> Option<Color> {
        self.group_info(id).map(|g| g.color)
    }

    /// Enumerate all stones of a group by walking the circular next-stone
    /// list. O(group size); intended for non-hot paths (tactics, scoring).
    pub fn group_stones(&self, id: Point) -> Vec<Point> {
        if self.group_info(id).is_none() {
            return Vec::new();
        }
        let mut stones = Vec::new();
        let mut cur = id;
        loop {
            stones.push(cur);
            cur = self.next_in_group[cur];
            if cur == id {
                break;
            }
        }
        stones
    }

    pub fn resigned_by(&self) -> Option<Color> {
        self.resigned
    }

    /// Record a resignation without touching board state (`spec.md` §4.1).
    pub fn resign(&mut self, color: Color) {
        self.resigned = Some(color);
    }

    // -- eyes ---------------------------------------------------------

    /// "Eyeish": every orthogonal neighbor is off-board or one color.
    /// May return true for false eyes (`spec.md` §4.1).
    pub fn is_eyeish(&self, pt: Point) -> Option<Color> {
        if self.nbr_count[pt][occ::EMPTY as usize] != 0 {
            return None;
        }
        let black = self.nbr_count[pt][occ::BLACK as usize];
        let white = self.nbr_count[pt][occ::WHITE as usize];
        if white == 0 && black > 0 {
            Some(Color::Black)
        } else if black == 0 && white > 0 {
            Some(Color::White)
        } else {
            None
        }
    }

    /// True eye: eyeish, with at most one bad (opponent) diagonal at the
    /// edge, zero in the center.
    pub fn is_eye(&self, pt: Point) -> Option<Color> {
        let color = self.is_eyeish(pt)?;
        let other = occ::of(color.opponent());
        let mut at_edge = false;
        let mut bad = 0;
        for d in self.geo.diagonal_neighbors(pt) {
            match self.color[d] {
                occ::OFFBOARD => at_edge = true,
                c if c == other => bad += 1,
                _ => {}
            }
        }
        let tolerance = if at_edge { 1 } else { 0 };
        if bad > tolerance { None } else { Some(color) }
    }

    // -- 3x3 pattern codes --------------------------------------------

    fn compute_pat3(&self, pt: Point) -> u16 {
        let mut code: u16 = 0;
        for (i, nb) in self.geo.all_neighbors(pt).into_iter().enumerate() {
            let c = if nb < self.color.len() {
                self.color[nb] as u16
            } else {
                occ::OFFBOARD as u16
            };
            code |= c << (2 * i);
        }
        code
    }

    fn refresh_pat3_around(&mut self, pt: Point) {
        self.pat3[pt] = self.compute_pat3(pt);
        for nb in self.geo.all_neighbors(pt) {
            if nb < self.pat3.len() {
                self.pat3[nb] = self.compute_pat3(nb);
            }
        }
    }

    // -- free list ------------------------------------------------------

    fn free_remove(&mut self, pt: Point) {
        let idx = self.free_index[pt];
        if idx < 0 {
            return;
        }
        let last = self.free_points.len() - 1;
        let last_pt = self.free_points[last];
        self.free_points.swap(idx as usize, last);
        self.free_index[last_pt] = idx;
        self.free_points.pop();
        self.free_index[pt] = -1;
    }

    fn free_add(&mut self, pt: Point) {
        self.free_index[pt] = self.free_points.len() as i32;
        self.free_points.push(pt);
    }

    // -- recording helpers (reverse-order-safe undo log) -----------------

    fn rec_color(&mut self, undo: &mut UndoRecord, pt: Point, new: u8) {
        undo.color_changes.push((pt, self.color[pt]));
        self.color[pt] = new;
    }

    fn rec_group_id(&mut self, undo: &mut UndoRecord, pt: Point, new: Point) {
        undo.group_id_changes.push((pt, self.group_id[pt]));
        self.group_id[pt] = new;
    }

    fn rec_next(&mut self, undo: &mut UndoRecord, pt: Point, new: Point) {
        undo.next_changes.push((pt, self.next_in_group[pt]));
        self.next_in_group[pt] = new;
    }

    fn rec_group_info(&mut self, undo: &mut UndoRecord, id: Point, new: Option<GroupInfo>) {
        undo.group_info_changes.push((id, self.group_info[id].clone()));
        self.group_info[id] = new;
    }

    fn rec_nbr(&mut self, undo: &mut UndoRecord, pt: Point, new: [u8; 4]) {
        undo.nbr_count_changes.push((pt, self.nbr_count[pt]));
        self.nbr_count[pt] = new;
    }

    /// Change one point's occupancy and update the 4 orthogonal neighbors'
    /// color counters to match — the "neighbor counts" maintained on the
    /// quick-play path per `spec.md` §3.
    fn set_occupancy(&mut self, undo: &mut UndoRecord, pt: Point, new: u8) {
        let old = self.color[pt];
        self.rec_color(undo, pt, new);
        for nb in self.geo.neighbors(pt) {
            let mut cnt = self.nbr_count[nb];
            cnt[old as usize] -= 1;
            cnt[new as usize] += 1;
            self.rec_nbr(undo, nb, cnt);
        }
    }

    fn remove_liberty(&mut self, undo: &mut UndoRecord, id: Point, lib: Point) {
        if id == 0 {
            return;
        }
        let Some(mut info) = self.group_info[id].clone() else {
            return;
        };
        if info.remove_lib(lib) {
            let remaining = info.libs();
            self.rec_group_info(undo, id, Some(info));
            if remaining <= GROUP_REFILL_LIBS {
                self.recompute_group_libs(undo, id);
            }
        }
    }

    fn add_liberty(&mut self, undo: &mut UndoRecord, id: Point, lib: Point) {
        if id == 0 {
            return;
        }
        let Some(mut info) = self.group_info[id].clone() else {
            return;
        };
        if info.add_lib(lib) {
            self.rec_group_info(undo, id, Some(info));
        }
    }

    /// Rescan a group's stones for up to `GROUP_KEEP_LIBS` distinct empty
    /// neighbors, replacing its tracked liberty list. Exact whenever the
    /// true liberty count is `<= GROUP_KEEP_LIBS` (`spec.md` §3).
    fn recompute_group_libs(&mut self, undo: &mut UndoRecord, id: Point) {
        let mut libs: Vec<Point> = Vec::with_capacity(GROUP_KEEP_LIBS);
        let mut cur = id;
        loop {
            for nb in self.geo.neighbors(cur) {
                if self.color[nb] == occ::EMPTY && !libs.contains(&nb) && libs.len() < GROUP_KEEP_LIBS
                {
                    libs.push(nb);
                }
            }
            cur = self.next_in_group[cur];
            if cur == id {
                break;
            }
        }
        let mut info = self.group_info[id].clone().expect("group exists");
        info.set_libs(&libs);
        self.rec_group_info(undo, id, Some(info));
    }

    fn relabel_and_splice(&mut self, undo: &mut UndoRecord, canonical: Point, old: Point) {
        if canonical == old {
            return;
        }
        let mut cur = old;
        loop {
            let nxt = self.next_in_group[cur];
            self.rec_group_id(undo, cur, canonical);
            cur = nxt;
            if cur == old {
                break;
            }
        }
        let na = self.next_in_group[canonical];
        let nb = self.next_in_group[old];
        self.rec_next(undo, canonical, nb);
        self.rec_next(undo, old, na);

        let old_info = self.group_info[old].clone().expect("group exists");
        self.rec_group_info(undo, old, None);
        let mut canon_info = self.group_info[canonical].clone().expect("group exists");
        canon_info.size += old_info.size;
        self.rec_group_info(undo, canonical, Some(canon_info));
    }

    /// Core of both `play` and `quick_play`: placement, merges, captures,
    /// liberty/neighbor-count maintenance, next-stone updates. Does **not**
    /// check ko/superko, and does **not** touch pattern codes, the free
    /// list, the position hash, or the superko ring — those are maintained
    /// only by `play` (`spec.md` §3 "Quick-play shadow path").
    fn play_core(&mut self, pt: Point, color: Color) -> Result<PlayOutcome, MoveError> {
        if self.color[pt] != occ::EMPTY {
            return Err(MoveError::Occupied);
        }
        let mut undo = UndoRecord::new(self);

        self.set_occupancy(&mut undo, pt, occ::of(color));
        self.rec_group_id(&mut undo, pt, pt);
        self.rec_next(&mut undo, pt, pt);
        self.rec_group_info(&mut undo, pt, Some(GroupInfo::singleton(color)));
        self.recompute_group_libs(&mut undo, pt);

        let mut friend_ids: Vec<Point> = Vec::new();
        let mut enemy_ids: Vec<Point> = Vec::new();
        for nb in self.geo.neighbors(pt) {
            match occ::color(self.color[nb]) {
                Some(c) if c == color => {
                    let gid = self.group_id[nb];
                    if !friend_ids.contains(&gid) {
                        friend_ids.push(gid);
                    }
                    self.remove_liberty(&mut undo, gid, pt);
                }
                Some(_) => {
                    let gid = self.group_id[nb];
                    if !enemy_ids.contains(&gid) {
                        enemy_ids.push(gid);
                    }
                    self.remove_liberty(&mut undo, gid, pt);
                }
                None => {}
            }
        }

        let canonical = friend_ids.iter().chain(std::iter::once(&pt)).copied().min().unwrap();
        for &fid in &friend_ids {
            self.relabel_and_splice(&mut undo, canonical, fid);
        }
        if canonical != pt {
            self.relabel_and_splice(&mut undo, canonical, pt);
        }
        self.recompute_group_libs(&mut undo, canonical);

        let mut captured: Vec<Point> = Vec::new();
        for &eid in &enemy_ids {
            let libs = self.group_info(eid).map(|g| g.libs()).unwrap_or(1);
            if libs != 0 {
                continue;
            }
            let stones = self.group_stones(eid);
            for &s in &stones {
                self.set_occupancy(&mut undo, s, occ::EMPTY);
                self.rec_group_id(&mut undo, s, 0);
            }
            self.rec_group_info(&mut undo, eid, None);
            captured.extend(stones);
        }
        for &r in &captured {
            for nb2 in self.geo.neighbors(r) {
                if occ::color(self.color[nb2]).is_some() {
                    self.add_liberty(&mut undo, self.group_id[nb2], r);
                }
            }
        }

        let mut suicided: Vec<Point> = Vec::new();
        if captured.is_empty() && self.group_libs(canonical) == 0 {
            if !self.config.rules.allows_suicide() {
                self.apply_undo(&undo);
                return Err(MoveError::Suicide);
            }
            // Rules that allow suicide (New Zealand): the just-played group
            // has no liberties and captured nothing, so it removes itself.
            suicided = self.group_stones(canonical);
            for &s in &suicided {
                self.set_occupancy(&mut undo, s, occ::EMPTY);
                self.rec_group_id(&mut undo, s, 0);
            }
            self.rec_group_info(&mut undo, canonical, None);
            for &s in &suicided {
                for nb2 in self.geo.neighbors(s) {
                    if occ::color(self.color[nb2]).is_some() {
                        self.add_liberty(&mut undo, self.group_id[nb2], s);
                    }
                }
            }
            self.captures[color_index(color.opponent())] += suicided.len() as u32;
        }

        self.captures[color_index(color)] += captured.len() as u32;

        let (new_ko, new_ko_forbidden) = if suicided.is_empty() && captured.len() == 1 {
            let info = self.group_info(canonical).unwrap();
            if info.size == 1 && info.libs() == 1 && info.lib_list()[0] == captured[0] {
                (captured[0], Some(color.opponent()))
            } else {
                (0, None)
            }
        } else {
            (0, None)
        };
        self.ko = new_ko;
        self.ko_forbidden = new_ko_forbidden;

        self.to_play = color.opponent();
        self.move_num += 1;
        self.last3 = self.last2;
        self.last2 = self.last;
        self.last = pt;

        Ok(PlayOutcome {
            group: canonical,
            captured,
            suicided,
            undo,
        })
    }

    fn apply_undo(&mut self, undo: &UndoRecord) {
        for &(pt, v) in undo.color_changes.iter().rev() {
            self.color[pt] = v;
        }
        for &(pt, v) in undo.group_id_changes.iter().rev() {
            self.group_id[pt] = v;
        }
        for &(pt, v) in undo.next_changes.iter().rev() {
            self.next_in_group[pt] = v;
        }
        for (id, v) in undo.group_info_changes.iter().rev() {
            self.group_info[*id] = v.clone();
        }
        for &(pt, v) in undo.nbr_count_changes.iter().rev() {
            self.nbr_count[pt] = v;
        }
        self.captures = undo.captures_before;
        self.to_play = undo.to_play_before;
        self.move_num = undo.move_num_before;
        self.last = undo.last_before.0;
        self.last2 = undo.last_before.1;
        self.last3 = undo.last_before.2;
        self.ko = undo.ko_before.0;
        self.ko_forbidden = undo.ko_before.1;
    }

    /// Quick-play path: legality is limited to occupied/suicide checks (no
    /// ko, no superko); pattern codes, hash, free list and superko ring are
    /// left untouched. Nested quick-play is a programming error.
    pub fn quick_play(&mut self, pt: Point) -> Result<PlayOutcome, MoveError> {
        debug_assert!(!self.quick_active, "nested quick_play is not supported");
        let color = self.to_play;
        let outcome = self.play_core(pt, color)?;
        self.quick_active = true;
        Ok(outcome)
    }

    /// Reverse a `quick_play`. `outcome` must be the value returned by the
    /// matching `quick_play` call; anything else is a programming error
    /// (debug-asserted, per `spec.md` §7).
    pub fn quick_undo(&mut self, outcome: PlayOutcome) {
        debug_assert!(self.quick_active, "quick_undo without matching quick_play");
        self.apply_undo(&outcome.undo);
        self.quick_active = false;
    }

    /// Would placing `color` at `pt` repeat a position in the superko ring?
    pub fn would_violate_superko(&self, pt: Point, color: Color) -> bool {
        if self.config.superko == SuperkoPolicy::Off {
            return false;
        }
        let mut probe = self.clone();
        probe.config.superko = SuperkoPolicy::Off;
        probe.quick_active = false;
        let Ok(outcome) = probe.play_core(pt, color) else {
            return false;
        };
        let mut h = self.hash;
        h ^= self.spatial.zobrist.point_hash(pt, color);
        for &r in &outcome.captured {
            h ^= self.spatial.zobrist.point_hash(r, color.opponent());
        }
        for &s in &outcome.suicided {
            h ^= self.spatial.zobrist.point_hash(s, color);
        }
        self.superko_ring.contains(&h)
    }

    /// Full, legality-checked play: ko, suicide, superko (per config), then
    /// the quick-core mutation, then pattern-code refresh, free-list
    /// maintenance, hash update, and superko ring push. Returns the id of
    /// the group the stone joined.
    pub fn play(&mut self, pt: Point) -> Result<Point, MoveError> {
        debug_assert!(!self.quick_active, "play called while a quick_play is outstanding");
        if pt >= self.geo.board_area || self.color[pt] == occ::OFFBOARD {
            return Err(MoveError::OffBoard);
        }
        let color = self.to_play;
        if pt == self.ko && self.ko_forbidden == Some(color) {
            return Err(MoveError::Ko);
        }

        let outcome = self.play_core(pt, color)?;

        let mut new_hash = self.hash ^ self.spatial.zobrist.point_hash(pt, color);
        for &r in &outcome.captured {
            new_hash ^= self.spatial.zobrist.point_hash(r, color.opponent());
        }
        for &s in &outcome.suicided {
            new_hash ^= self.spatial.zobrist.point_hash(s, color);
        }
        if self.config.superko == SuperkoPolicy::Forbid && self.superko_ring.contains(&new_hash) {
            self.apply_undo(&outcome.undo);
            return Err(MoveError::Superko);
        }

        // `suicided` always contains `pt` itself when non-empty (it joins the
        // removed group), so `free_remove(pt)` followed by `free_add`-ing
        // every suicided stone nets `pt` back into the free list exactly
        // once, matching its net empty-to-empty transition.
        self.free_remove(pt);
        for &r in &outcome.captured {
            self.free_add(r);
        }
        for &s in &outcome.suicided {
            self.free_add(s);
        }
        self.refresh_pat3_around(pt);
        for &r in &outcome.captured {
            self.refresh_pat3_around(r);
        }
        for &s in &outcome.suicided {
            self.refresh_pat3_around(s);
        }
        self.hash = new_hash;
        self.superko_ring.push_back(new_hash);
        if self.superko_ring.len() > self.config.superko_history {
            self.superko_ring.pop_front();
        }

        log::trace!(
            "play {} {:?}: group {} captured {}",
            pt,
            color,
            outcome.group,
            outcome.captured.len()
        );
        Ok(outcome.group)
    }

    /// Play a pass. Clears ko, advances move number and last-move history.
    pub fn pass(&mut self) {
        debug_assert!(!self.quick_active, "pass called while a quick_play is outstanding");
        self.passes[color_index(self.to_play)] += 1;
        self.last3 = self.last2;
        self.last2 = self.last;
        self.last = crate::types::PASS;
        self.ko = 0;
        self.ko_forbidden = None;
        self.to_play = self.to_play.opponent();
        self.move_num += 1;
    }

    /// Lifetime pass count for `color` (`spec.md` §4.5's playout-scoring pass
    /// bookkeeping).
    #[inline]
    pub fn passes(&self, color: Color) -> u32 {
        self.passes[color_index(color)]
    }

    /// Snapshot both colors' pass counts, for restoring after a playout run
    /// under territory-scoring rules.
    #[inline]
    pub fn pass_counts(&self) -> [u32; 2] {
        self.passes
    }

    /// Restore pass counts taken by `pass_counts` before a playout, undoing
    /// whatever random passes the rollout made.
    #[inline]
    pub fn restore_pass_counts(&mut self, snapshot: [u32; 2]) {
        self.passes = snapshot;
    }

    // -- scoring ----------------------------------------------------------

    /// Stones + single-point (eyeish) territory per color, minus komi.
    /// "Fast" because it skips the diagonal check that distinguishes a true
    /// eye from a false one (`spec.md` §4.1).
    pub fn fast_score(&self) -> f64 {
        let mut black = 0i64;
        let mut white = 0i64;
        for pt in self.geo.imin..self.geo.imax {
            match self.color[pt] {
                occ::BLACK => black += 1,
                occ::WHITE => white += 1,
                occ::EMPTY => match self.is_eyeish(pt) {
                    Some(Color::Black) => black += 1,
                    Some(Color::White) => white += 1,
                    None => {}
                },
                _ => {}
            }
        }
        black as f64 - white as f64 - self.config.komi as f64
    }

    /// Full Tromp-Taylor scoring with a caller-supplied dead-stone set:
    /// dead stones are removed conceptually, empty regions reaching only
    /// one live color score for that color, mixed regions are dame.
    /// Resolves the spec's Open Question in favor of area scoring +
    /// caller-supplied dead groups (see `DESIGN.md`).
    pub fn official_score(&self, dead: &std::collections::HashSet<Point>) -> ScoreResult {
        let n = self.geo.board_area;
        let mut owner = vec![0u8; n]; // 0=dame, otherwise occ::BLACK/occ::WHITE
        let mut visited = vec![false; n];
        let mut dame = 0u32;
        let mut seki = 0u32;

        for pt in self.geo.imin..self.geo.imax {
            if self.color[pt] == occ::OFFBOARD || visited[pt] {
                continue;
            }
            let is_region_point = self.color[pt] == occ::EMPTY || dead.contains(&pt);
            if !is_region_point {
                owner[pt] = self.color[pt];
                visited[pt] = true;
                continue;
            }
            let mut stack = vec![pt];
            let mut region = Vec::new();
            let mut borders_black = false;
            let mut borders_white = false;
            let mut bordering_groups: Vec<Point> = Vec::new();
            visited[pt] = true;
            while let Some(p) = stack.pop() {
                region.push(p);
                for nb in self.geo.neighbors(p) {
                    if self.color[nb] == occ::OFFBOARD {
                        continue;
                    }
                    let nb_is_region = self.color[nb] == occ::EMPTY || dead.contains(&nb);
                    if nb_is_region {
                        if !visited[nb] {
                            visited[nb] = true;
                            stack.push(nb);
                        }
                    } else {
                        match self.color[nb] {
                            occ::BLACK => borders_black = true,
                            occ::WHITE => borders_white = true,
                            _ => {}
                        }
                        let gid = self.group_id[nb];
                        if !bordering_groups.contains(&gid) {
                            bordering_groups.push(gid);
                        }
                    }
                }
            }
            let region_owner = match (borders_black, borders_white) {
                (true, false) => occ::BLACK,
                (false, true) => occ::WHITE,
                _ => 0,
            };
            if region_owner == 0 {
                dame += region.len() as u32;
                // Simplified seki heuristic: exactly two bordering living
                // groups, one per color, whose liberties are fully spent on
                // this shared region. A fuller classifier would port
                // `original_source/tactics/seki.c`; see DESIGN.md.
                if bordering_groups.len() == 2 {
                    let libs_sum: usize = bordering_groups.iter().map(|&g| self.group_libs(g)).sum();
                    if libs_sum == region.len() {
                        seki += region.len() as u32;
                    }
                }
            }
            for p in region {
                owner[p] = region_owner;
            }
        }

        let mut black = 0i64;
        let mut white = 0i64;
        for pt in self.geo.imin..self.geo.imax {
            match owner[pt] {
                occ::BLACK => black += 1,
                occ::WHITE => white += 1,
                _ => {}
            }
        }
        ScoreResult {
            score: black as f64 - white as f64 - self.config.komi as f64,
            owner,
            dame,
            seki,
        }
    }
}

pub struct ScoreResult {
    /// Positive means Black is ahead.
    pub score: f64,
    /// Per-point owner: 0=dame/neutral, matches `occ::BLACK`/`occ::WHITE` otherwise.
    pub owner: Vec<u8>,
    pub dame: u32,
    pub seki: u32,
}

impl ScoreResult {
    /// `W+x.y` / `B+x.y`, positive score means White in GTP convention
    /// (`spec.md` §6); our internal sign is positive-for-Black, so invert.
    pub fn as_gtp_string(&self) -> String {
        let white_perspective = -self.score;
        if white_perspective > 0.0 {
            format!("W+{:.1}", white_perspective)
        } else if white_perspective < 0.0 {
            format!("B+{:.1}", -white_perspective)
        } else {
            "0".to_string()
        }
    }
}

const COL_LABELS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZ";

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Move: {:<4} B captures: {:<3} W captures: {:<3} Komi: {:.1}",
            self.move_num,
            self.captures(Color::Black),
            self.captures(Color::White),
            self.config.komi
        )?;
        let n = self.geo.size;
        for row in 1..=n {
            write!(f, "{:>3} ", n - row + 1)?;
            for col in 1..=n {
                let pt = row * self.geo.stride + col;
                let c = match self.color[pt] {
                    occ::BLACK => 'X',
                    occ::WHITE => 'O',
                    _ => '.',
                };
                let mark = if self.last == pt { ')' } else { ' ' };
                write!(f, "{c}{mark}")?;
            }
            writeln!(f)?;
        }
        write!(f, "    ")?;
        for col in 0..n {
            write!(f, "{} ", COL_LABELS[col] as char)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::SpatialContext;

    fn new_board(size: usize) -> Board {
        let geo = BoardGeometry::new(size);
        let spatial = SpatialContext::new(&geo, 1);
        Board::new(size, BoardConfig::default(), spatial)
    }

    fn pt(b: &Board, col: usize, row_from_top: usize) -> Point {
        row_from_top * b.geo.stride + col
    }

    #[test]
    fn single_stone_has_four_liberties() {
        let mut b = new_board(9);
        let p = pt(&b, 4, 4);
        let g = b.play(p).unwrap();
        assert_eq!(b.group_libs(g), 4);
    }

    #[test]
    fn capture_removes_stone_and_restores_liberties() {
        let mut b = new_board(9);
        let w = pt(&b, 4, 4);
        b.play(pt(&b, 4, 3)).unwrap(); // Black north
        b.play(w).unwrap(); // White center
        b.play(pt(&b, 3, 4)).unwrap(); // Black west
        b.play(pt(&b, 9, 9)).unwrap(); // White elsewhere
        b.play(pt(&b, 5, 4)).unwrap(); // Black east
        b.play(pt(&b, 8, 9)).unwrap(); // White elsewhere
        b.play(pt(&b, 4, 5)).unwrap(); // Black south: captures
        assert_eq!(b.at(w), occ::EMPTY);
        assert_eq!(b.captures(Color::Black), 1);
    }

    #[test]
    fn suicide_is_rejected_and_board_unchanged() {
        let mut b = new_board(9);
        let a1 = pt(&b, 1, 9);
        let a2 = pt(&b, 1, 8);
        let b1 = pt(&b, 2, 9);
        b.play(a2).unwrap(); // Black
        b.play(pt(&b, 9, 9)).unwrap(); // White elsewhere
        b.play(b1).unwrap(); // Black
        let before = b.at(a1);
        let result = b.play(a1); // White would suicide in the corner
        assert_eq!(result, Err(MoveError::Suicide));
        assert_eq!(b.at(a1), before);
    }

    #[test]
    fn suicide_is_allowed_under_new_zealand_rules() {
        let geo = BoardGeometry::new(9);
        let spatial = SpatialContext::new(&geo, 1);
        let config = BoardConfig {
            rules: Rules::NewZealand,
            ..BoardConfig::default()
        };
        let mut b = Board::new(9, config, spatial);

        let a1 = pt(&b, 1, 9);
        let a2 = pt(&b, 1, 8);
        let b1 = pt(&b, 2, 9);
        b.play(a2).unwrap(); // Black
        b.play(pt(&b, 9, 9)).unwrap(); // White elsewhere
        b.play(b1).unwrap(); // Black

        let black_captures_before = b.captures(Color::Black);
        b.play(a1).unwrap(); // White suicides in the corner
        assert_eq!(b.at(a1), occ::EMPTY);
        assert_eq!(b.captures(Color::Black), black_captures_before + 1);
    }

    #[test]
    fn ko_violation_rejected() {
        let mut b = new_board(9);
        let wk = pt(&b, 5, 5);
        b.play(pt(&b, 5, 4)).unwrap(); // B north
        b.play(wk).unwrap(); // W center (will be captured)
        b.play(pt(&b, 4, 5)).unwrap(); // B west
        b.play(pt(&b, 9, 9)).unwrap(); // W elsewhere
        b.play(pt(&b, 6, 5)).unwrap(); // B east
        b.play(pt(&b, 8, 9)).unwrap(); // W elsewhere
        b.play(pt(&b, 5, 6)).unwrap(); // B south: captures wk
        assert_eq!(b.at(wk), occ::EMPTY);
        assert_eq!(b.ko_point(), wk);
        let result = b.play(wk);
        assert_eq!(result, Err(MoveError::Ko));
    }

    #[test]
    fn quick_play_undo_restores_quick_maintained_fields() {
        let mut b = new_board(9);
        b.play(pt(&b, 4, 4)).unwrap();
        let snapshot_color = b.color.clone();
        let snapshot_group_id = b.group_id.clone();
        let snapshot_nbr = b.nbr_count.clone();
        let outcome = b.quick_play(pt(&b, 5, 4)).unwrap();
        assert_ne!(b.color, snapshot_color);
        b.quick_undo(outcome);
        assert_eq!(b.color, snapshot_color);
        assert_eq!(b.group_id, snapshot_group_id);
        assert_eq!(b.nbr_count, snapshot_nbr);
    }

    #[test]
    fn clone_then_same_moves_yields_identical_boards() {
        let mut a = new_board(9);
        a.play(pt(&a, 4, 4)).unwrap();
        a.play(pt(&a, 5, 5)).unwrap();
        let mut b = a.clone();
        a.play(pt(&a, 3, 3)).unwrap();
        b.play(pt(&b, 3, 3)).unwrap();
        assert_eq!(a.color, b.color);
        assert_eq!(a.group_id, b.group_id);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn fast_score_and_official_score_both_finite() {
        let mut b = new_board(5);
        for row in 1..=5 {
            let _ = b.play(pt(&b, 3, row));
        }
        let dead = std::collections::HashSet::new();
        let official = b.official_score(&dead);
        let fast = b.fast_score();
        assert!(official.score.is_finite());
        assert!(fast.is_finite());
    }
}
