//! Scoring of candidate partitions.
//!
//! A candidate is tested against every side of the working set. Sides that
//! would be split cost a fixed penalty; sides that pass very close to the
//! candidate without touching it ("near misses") cost more the closer they
//! get, because they later produce tiny slivers. The final score also
//! penalises imbalance between the two halves. Lower is better.

use crate::geom::{DIST_EPSILON, SHORT_EDGE_EPSILON};
use crate::ids::BlockId;
use crate::partition::{BoxSide, Partition};
use crate::segment::{SegmentArena, SideId};
use crate::superblock::SuperBlockmap;

/// Distance under which an endpoint counts as uncomfortably close.
const IFFY_LEN: f64 = SHORT_EDGE_EPSILON;

/// Running tally for one candidate partition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionCost {
    pub total: i64,
    pub splits: u32,
    pub iffy: u32,
    pub near_miss: u32,
    pub map_right: usize,
    pub map_left: usize,
    pub part_right: usize,
    pub part_left: usize,
}

impl PartitionCost {
    pub fn add_right(&mut self, is_map: bool) {
        if is_map {
            self.map_right += 1;
        } else {
            self.part_right += 1;
        }
    }

    pub fn add_left(&mut self, is_map: bool) {
        if is_map {
            self.map_left += 1;
        } else {
            self.part_left += 1;
        }
    }

    /// Applies the balance and slope terms. Returns `None` if either half
    /// would be left without a map side.
    pub fn finish(mut self, partition: &Partition) -> Option<Self> {
        if self.map_left == 0 || self.map_right == 0 {
            return None;
        }
        self.total += 100 * self.map_left.abs_diff(self.map_right) as i64;
        self.total += 50 * self.part_left.abs_diff(self.part_right) as i64;
        if !partition.slope().is_axis_aligned() {
            self.total += 25;
        }
        Some(self)
    }
}

/// Scores the line of `candidate` against every side under `root`.
///
/// Evaluation stops early and returns `None` as soon as the running total
/// exceeds `best`. It also returns `None` if the candidate would leave a
/// half without map sides.
pub fn evaluate_partition(
    blockmap: &SuperBlockmap,
    arena: &SegmentArena,
    root: BlockId,
    candidate: SideId,
    split_cost_factor: i32,
    best: Option<i64>,
) -> Option<PartitionCost> {
    let partition = arena.partition(candidate);
    let source_line = arena.line(candidate);
    let factor = f64::from(split_cost_factor);
    let mut cost = PartitionCost::default();

    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let block = blockmap.block(id);

        // A block wholly on one side is counted without visiting its sides.
        match partition.box_on_side(block.bounds()) {
            BoxSide::Right => {
                cost.map_right += block.map_count();
                cost.part_right += block.part_count();
                continue;
            }
            BoxSide::Left => {
                cost.map_left += block.map_count();
                cost.part_left += block.part_count();
                continue;
            }
            BoxSide::Crosses => {}
        }

        for &side in block.segments() {
            if best.is_some_and(|best| cost.total > best) {
                return None;
            }
            let line = arena.line(side);
            let (a, b) = if source_line.is_some() && line == source_line {
                (0.0, 0.0)
            } else {
                (
                    partition.perp_distance(arena.from_point(side)),
                    partition.perp_distance(arena.to_point(side)),
                )
            };
            evaluate_side(&mut cost, &partition, arena, side, a, b, factor);
        }

        stack.extend(block.left());
        stack.extend(block.right());
    }

    if best.is_some_and(|best| cost.total > best) {
        return None;
    }
    cost.finish(&partition)
}

fn evaluate_side(
    cost: &mut PartitionCost,
    partition: &Partition,
    arena: &SegmentArena,
    side: SideId,
    a: f64,
    b: f64,
    factor: f64,
) {
    let is_map = arena.has_map_line(side);
    let (fa, fb) = (a.abs(), b.abs());

    if fa <= DIST_EPSILON && fb <= DIST_EPSILON {
        if arena.direction(side).dot(&partition.direction()) < 0.0 {
            cost.add_left(is_map);
        } else {
            cost.add_right(is_map);
        }
        return;
    }

    if a > -DIST_EPSILON && b > -DIST_EPSILON {
        cost.add_right(is_map);
        let clear = (a >= IFFY_LEN && b >= IFFY_LEN)
            || (a <= DIST_EPSILON && b >= IFFY_LEN)
            || (b <= DIST_EPSILON && a >= IFFY_LEN);
        if !clear {
            cost.near_miss += 1;
            let qnty = if a <= DIST_EPSILON || b <= DIST_EPSILON {
                IFFY_LEN / a.max(b)
            } else {
                IFFY_LEN / a.min(b)
            };
            cost.total += (100.0 * factor * (qnty * qnty - 1.0)) as i64;
        }
        return;
    }

    if a < DIST_EPSILON && b < DIST_EPSILON {
        cost.add_left(is_map);
        let clear = (a <= -IFFY_LEN && b <= -IFFY_LEN)
            || (a >= -DIST_EPSILON && b <= -IFFY_LEN)
            || (b >= -DIST_EPSILON && a <= -IFFY_LEN);
        if !clear {
            cost.near_miss += 1;
            let qnty = if a >= -DIST_EPSILON || b >= -DIST_EPSILON {
                IFFY_LEN / -a.min(b)
            } else {
                IFFY_LEN / -a.max(b)
            };
            cost.total += (70.0 * factor * (qnty * qnty - 1.0)) as i64;
        }
        return;
    }

    // Opposite signs: the side would be split.
    cost.splits += 1;
    cost.total += 100 * factor as i64;

    if fa < IFFY_LEN || fb < IFFY_LEN {
        cost.iffy += 1;
        let qnty = IFFY_LEN / fa.min(fb);
        cost.total += (140.0 * factor * (qnty * qnty - 1.0)) as i64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::AABox;
    use crate::ids::{LineId, VertexId};
    use crate::line::RegionId;
    use nalgebra::Point2;

    struct Fixture {
        arena: SegmentArena,
        blockmap: SuperBlockmap,
        root: BlockId,
        next_line: usize,
    }

    impl Fixture {
        fn new() -> Self {
            let mut blockmap = SuperBlockmap::new();
            let root = blockmap.create_root(AABox::new(Point2::new(0.0, 0.0), Point2::new(1024.0, 1024.0)));
            Self {
                arena: SegmentArena::new(),
                blockmap,
                root,
                next_line: 0,
            }
        }

        fn add(&mut self, from: [f64; 2], to: [f64; 2]) -> SideId {
            let line = LineId(self.next_line);
            self.next_line += 1;
            let seg = self.arena.create(
                (VertexId(0), Point2::new(from[0], from[1])),
                (VertexId(1), Point2::new(to[0], to[1])),
                Some(RegionId(1)),
                None,
                Some(line),
                None,
            );
            let side = SideId::new(seg, false);
            self.blockmap.push(self.root, side, &mut self.arena);
            side
        }

        fn eval(&self, candidate: SideId, best: Option<i64>) -> Option<PartitionCost> {
            evaluate_partition(&self.blockmap, &self.arena, self.root, candidate, 7, best)
        }
    }

    #[test]
    fn split_and_balance_are_charged() {
        let mut fx = Fixture::new();
        let candidate = fx.add([512.0, 0.0], [512.0, 100.0]);
        fx.add([522.0, 0.0], [522.0, 100.0]);
        fx.add([502.0, 0.0], [502.0, 100.0]);
        fx.add([492.0, 50.0], [532.0, 50.0]);

        let cost = fx.eval(candidate, None).unwrap();
        assert_eq!(cost.splits, 1);
        assert_eq!((cost.map_right, cost.map_left), (2, 1));
        // One split (100 * 7) plus an imbalance of one (100).
        assert_eq!(cost.total, 800);
    }

    #[test]
    fn far_blocks_are_counted_in_bulk() {
        let mut fx = Fixture::new();
        let candidate = fx.add([512.0, 0.0], [512.0, 100.0]);
        fx.add([502.0, 0.0], [502.0, 100.0]);
        fx.add([900.0, 0.0], [900.0, 100.0]);
        fx.add([950.0, 600.0], [960.0, 700.0]);

        let cost = fx.eval(candidate, None).unwrap();
        assert_eq!((cost.map_right, cost.map_left), (3, 1));
        assert_eq!(cost.total, 200);
    }

    #[test]
    fn near_miss_is_penalised() {
        let mut fx = Fixture::new();
        let candidate = fx.add([512.0, 0.0], [512.0, 100.0]);
        fx.add([514.0, 0.0], [514.0, 100.0]);
        fx.add([502.0, 0.0], [502.0, 100.0]);

        let cost = fx.eval(candidate, None).unwrap();
        assert_eq!(cost.near_miss, 1);
        // qnty = 4 / 2, so 100 * 7 * (4 - 1) on top of a balance of one.
        assert_eq!(cost.total, 2100 + 100);
    }

    #[test]
    fn one_sided_candidates_are_rejected() {
        let mut fx = Fixture::new();
        let candidate = fx.add([512.0, 0.0], [512.0, 100.0]);
        fx.add([600.0, 0.0], [600.0, 100.0]);
        assert!(fx.eval(candidate, None).is_none());
    }

    #[test]
    fn evaluation_stops_once_worse_than_best() {
        let mut fx = Fixture::new();
        let candidate = fx.add([512.0, 0.0], [512.0, 100.0]);
        fx.add([502.0, 0.0], [502.0, 100.0]);
        fx.add([492.0, 50.0], [532.0, 50.0]);
        fx.add([492.0, 80.0], [532.0, 80.0]);

        assert!(fx.eval(candidate, None).is_some());
        assert!(fx.eval(candidate, Some(100)).is_none());
    }

    #[test]
    fn diagonal_candidates_pay_extra() {
        let mut fx = Fixture::new();
        let candidate = fx.add([400.0, 400.0], [500.0, 500.0]);
        fx.add([450.0, 300.0], [550.0, 400.0]);
        fx.add([350.0, 400.0], [450.0, 500.0]);

        let cost = fx.eval(candidate, None).unwrap();
        assert_eq!(cost.splits, 0);
        // Balanced: candidate and one side on the right versus one on the left.
        assert_eq!(cost.total, 100 + 25);
    }
}
