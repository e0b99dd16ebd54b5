//! Map lines: the read-only input of a build.

use std::fmt;
use std::ops::BitOr;

use crate::ids::VertexId;

/// Opaque identity of a map region (sector).
///
/// The partitioner only propagates and compares these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Behaviour flags of a map line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineFlags(u8);

impl LineFlags {
    pub const NONE: LineFlags = LineFlags(0);
    /// The line belongs to a polyobject and is left out of the partition.
    pub const POLYOBJ: LineFlags = LineFlags(1 << 0);
    /// A one-sided line whose missing back side borrows the front region
    /// (the "one-way window" trick).
    pub const WINDOW: LineFlags = LineFlags(1 << 1);

    #[inline]
    pub const fn contains(self, other: LineFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for LineFlags {
    type Output = LineFlags;

    fn bitor(self, rhs: LineFlags) -> LineFlags {
        LineFlags(self.0 | rhs.0)
    }
}

/// A boundary line of the map, running from `from` to `to`.
///
/// The front region lies on the right of the direction of travel, the back
/// region on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    from: VertexId,
    to: VertexId,
    front: Option<RegionId>,
    back: Option<RegionId>,
    flags: LineFlags,
}

impl Line {
    /// Creates a line with no regions and no flags.
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self {
            from,
            to,
            front: None,
            back: None,
            flags: LineFlags::NONE,
        }
    }

    /// Creates a one-sided line with `front` on its right.
    pub fn one_sided(from: VertexId, to: VertexId, front: RegionId) -> Self {
        Self::new(from, to).with_front(front)
    }

    /// Creates a two-sided line between `front` (right) and `back` (left).
    pub fn two_sided(from: VertexId, to: VertexId, front: RegionId, back: RegionId) -> Self {
        Self::new(from, to).with_front(front).with_back(back)
    }

    /// Sets the front region.
    pub fn with_front(mut self, region: RegionId) -> Self {
        self.front = Some(region);
        self
    }

    /// Sets the back region.
    pub fn with_back(mut self, region: RegionId) -> Self {
        self.back = Some(region);
        self
    }

    /// Sets the flags.
    pub fn with_flags(mut self, flags: LineFlags) -> Self {
        self.flags = flags;
        self
    }

    #[inline]
    pub fn from(&self) -> VertexId {
        self.from
    }

    #[inline]
    pub fn to(&self) -> VertexId {
        self.to
    }

    #[inline]
    pub fn front(&self) -> Option<RegionId> {
        self.front
    }

    #[inline]
    pub fn back(&self) -> Option<RegionId> {
        self.back
    }

    #[inline]
    pub fn flags(&self) -> LineFlags {
        self.flags
    }

    /// The region the partitioner sees on the back side. Window lines borrow
    /// their front region.
    pub fn effective_back(&self) -> Option<RegionId> {
        match self.back {
            Some(region) => Some(region),
            None if self.flags.contains(LineFlags::WINDOW) => self.front,
            None => None,
        }
    }

    /// Returns `true` if both sides face the same region.
    pub fn is_self_referencing(&self) -> bool {
        self.front.is_some() && self.front == self.effective_back()
    }

    #[inline]
    pub fn is_polyobj(&self) -> bool {
        self.flags.contains(LineFlags::POLYOBJ)
    }
}
