/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Geometry in flow-relative and physical space.
//!
//! Logical geometry here is *line-relative* in the inline axis: the inline
//! start is always the line-left edge, whatever the inline base direction.
//! Only the block axis is flipped on conversion (for `vertical-rl`). Code that
//! cares about direction, such as column placement, handles it explicitly.

use std::fmt;
use std::ops::{Add, Sub};

use app_units::{Au, MAX_AU, MIN_AU};
use bitflags::bitflags;
use euclid::default::{Point2D, Rect, Size2D, Vector2D};
use num_traits::Zero;

pub type PhysicalPoint = Point2D<Au>;
pub type PhysicalVec = Vector2D<Au>;
pub type PhysicalSize = Size2D<Au>;
pub type PhysicalRect = Rect<Au>;

bitflags! {
    /// The subset of `writing-mode` and `direction` that fragmentation cares about.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct WritingMode: u8 {
        const RTL = 1 << 0;
        const VERTICAL = 1 << 1;
        /// Only meaningful together with `VERTICAL`.
        const VERTICAL_LR = 1 << 2;
    }
}

impl WritingMode {
    #[inline]
    pub fn horizontal_tb() -> Self {
        Self::empty()
    }

    #[inline]
    pub fn vertical_rl() -> Self {
        Self::VERTICAL
    }

    #[inline]
    pub fn vertical_lr() -> Self {
        Self::VERTICAL | Self::VERTICAL_LR
    }

    /// The same block flow, with a right-to-left inline base direction.
    #[inline]
    pub fn rtl(self) -> Self {
        self | Self::RTL
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        self.intersects(Self::VERTICAL)
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        !self.is_vertical()
    }

    /// Assuming .is_vertical(), does the block direction go left to right?
    #[inline]
    pub fn is_vertical_lr(&self) -> bool {
        self.intersects(Self::VERTICAL_LR)
    }

    /// Whether the block direction runs against the physical axis, i.e. `vertical-rl`.
    #[inline]
    pub fn is_flipped_blocks(&self) -> bool {
        self.is_vertical() && !self.is_vertical_lr()
    }

    #[inline]
    pub fn is_bidi_ltr(&self) -> bool {
        !self.intersects(Self::RTL)
    }
}

impl fmt::Display for WritingMode {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        if self.is_vertical() {
            write!(formatter, "V")?;
            if self.is_vertical_lr() {
                write!(formatter, " LR")?;
            } else {
                write!(formatter, " RL")?;
            }
        } else {
            write!(formatter, "H")?;
        }
        if self.is_bidi_ltr() {
            write!(formatter, " LTR")
        } else {
            write!(formatter, " RTL")
        }
    }
}

/// A pair of values in flow-relative dimensions. Used for points, offsets and sizes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LogicalVec2<T> {
    pub inline: T,
    pub block: T,
}

impl<T> LogicalVec2<T> {
    #[inline]
    pub fn new(inline: T, block: T) -> Self {
        Self { inline, block }
    }
}

impl<T: Add<Output = T>> Add for LogicalVec2<T> {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            inline: self.inline + other.inline,
            block: self.block + other.block,
        }
    }
}

impl<T: Sub<Output = T>> Sub for LogicalVec2<T> {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            inline: self.inline - other.inline,
            block: self.block - other.block,
        }
    }
}

impl LogicalVec2<Au> {
    #[inline]
    pub fn zero() -> Self {
        Self::new(Au::zero(), Au::zero())
    }

    /// Converts a physical point inside a box of `container_size` into flow-relative space.
    pub fn from_physical_point(
        mode: WritingMode,
        point: PhysicalPoint,
        container_size: PhysicalSize,
    ) -> Self {
        if !mode.is_vertical() {
            Self::new(point.x, point.y)
        } else if mode.is_vertical_lr() {
            Self::new(point.y, point.x)
        } else {
            Self::new(point.y, container_size.width - point.x)
        }
    }

    pub fn to_physical_point(&self, mode: WritingMode, container_size: PhysicalSize) -> PhysicalPoint {
        if !mode.is_vertical() {
            Point2D::new(self.inline, self.block)
        } else if mode.is_vertical_lr() {
            Point2D::new(self.block, self.inline)
        } else {
            Point2D::new(container_size.width - self.block, self.inline)
        }
    }

    pub fn from_physical_size(mode: WritingMode, size: PhysicalSize) -> Self {
        if mode.is_vertical() {
            Self::new(size.height, size.width)
        } else {
            Self::new(size.width, size.height)
        }
    }

    pub fn to_physical_size(&self, mode: WritingMode) -> PhysicalSize {
        if mode.is_vertical() {
            Size2D::new(self.block, self.inline)
        } else {
            Size2D::new(self.inline, self.block)
        }
    }
}

/// A rectangle in flow-relative dimensions.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct LogicalRect<T> {
    pub start_corner: LogicalVec2<T>,
    pub size: LogicalVec2<T>,
}

impl LogicalRect<Au> {
    #[inline]
    pub fn new(inline_start: Au, block_start: Au, inline_size: Au, block_size: Au) -> Self {
        Self {
            start_corner: LogicalVec2::new(inline_start, block_start),
            size: LogicalVec2::new(inline_size, block_size),
        }
    }

    #[inline]
    pub fn inline_end(&self) -> Au {
        self.start_corner.inline + self.size.inline
    }

    #[inline]
    pub fn block_end(&self) -> Au {
        self.start_corner.block + self.size.block
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.inline <= Au::zero() || self.size.block <= Au::zero()
    }

    pub fn from_physical(mode: WritingMode, rect: PhysicalRect, container_size: PhysicalSize) -> Self {
        if !mode.is_vertical() {
            Self::new(rect.origin.x, rect.origin.y, rect.size.width, rect.size.height)
        } else {
            let block_start = if mode.is_vertical_lr() {
                rect.origin.x
            } else {
                container_size.width - (rect.origin.x + rect.size.width)
            };
            Self::new(rect.origin.y, block_start, rect.size.height, rect.size.width)
        }
    }

    pub fn to_physical(&self, mode: WritingMode, container_size: PhysicalSize) -> PhysicalRect {
        let (x, y, width, height);
        if mode.is_vertical() {
            width = self.size.block;
            height = self.size.inline;
            y = self.start_corner.inline;
            if mode.is_vertical_lr() {
                x = self.start_corner.block;
            } else {
                x = container_size.width - self.block_end();
            }
        } else {
            x = self.start_corner.inline;
            y = self.start_corner.block;
            width = self.size.inline;
            height = self.size.block;
        }
        Rect::new(Point2D::new(x, y), Size2D::new(width, height))
    }
}

/// Multiplies a length by a count without leaving the `Au` range.
pub(crate) fn saturating_mul(length: Au, count: u32) -> Au {
    saturating_au(length.0 as i64 * count as i64)
}

pub(crate) fn saturating_au(value: i64) -> Au {
    Au(value.clamp(MIN_AU.0 as i64, MAX_AU.0 as i64) as i32)
}
