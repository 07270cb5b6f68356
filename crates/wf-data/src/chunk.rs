//! Chunk decomposition of the state and point axes.

use std::ops::Range;

use wf_core::ChunkId;

/// One independent unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRange {
    pub id: ChunkId,
    pub states: Range<usize>,
    pub points: Range<usize>,
}

/// Split `0..total` into consecutive ranges of at most `chunk_size`.
///
/// `None` or a size of zero means a single range. An empty axis yields no ranges.
pub fn split_range(total: usize, chunk_size: Option<usize>) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    let size = match chunk_size {
        Some(n) if n > 0 => n.min(total),
        _ => total,
    };
    (0..total)
        .step_by(size)
        .map(|start| start..(start + size).min(total))
        .collect()
}

impl ChunkRange {
    /// Cartesian product of state and point ranges, states outer.
    pub fn grid(states: &[Range<usize>], points: &[Range<usize>]) -> Vec<ChunkRange> {
        let mut out = Vec::with_capacity(states.len() * points.len());
        for s in states {
            for p in points {
                out.push(ChunkRange {
                    id: ChunkId::from_index(out.len() as u32),
                    states: s.clone(),
                    points: p.clone(),
                });
            }
        }
        out
    }

    pub fn n_states(&self) -> usize {
        self.states.len()
    }

    pub fn n_points(&self) -> usize {
        self.points.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn split_basic() {
        assert_eq!(split_range(10, Some(4)), vec![0..4, 4..8, 8..10]);
        assert_eq!(split_range(10, None), vec![0..10]);
        assert_eq!(split_range(10, Some(0)), vec![0..10]);
        assert_eq!(split_range(3, Some(8)), vec![0..3]);
        assert!(split_range(0, Some(2)).is_empty());
    }

    #[test]
    fn grid_numbers_chunks() {
        let g = ChunkRange::grid(&[0..2, 2..3], &[0..5, 5..6]);
        assert_eq!(g.len(), 4);
        assert_eq!(g[3].id.index(), 3);
        assert_eq!(g[1].states, 0..2);
        assert_eq!(g[1].points, 5..6);
    }

    proptest! {
        #[test]
        fn split_covers_axis(total in 0usize..500, size in 0usize..64) {
            let ranges = split_range(total, Some(size));
            let mut next = 0;
            for r in &ranges {
                prop_assert_eq!(r.start, next);
                prop_assert!(r.end > r.start);
                next = r.end;
            }
            prop_assert_eq!(next, total);
        }
    }
}
