/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(unsafe_code)]

//! Rectangle helpers shared between layout and its paint consumers.

use app_units::{Au, MAX_AU};
use euclid::default::{Point2D, Rect, Size2D};

// An Au is an "App Unit" and represents 1/60th of a CSS pixel.  It was
// originally proposed in 2002 as a standard unit of measure in Gecko.
// See https://bugzilla.mozilla.org/show_bug.cgi?id=177805 for more info.

/// A rectangle centered on the origin that extends `extent` in every direction.
///
/// Used wherever a rectangle has to stand in for "unbounded". Callers pick an
/// extent that survives a round trip through `f32` unchanged, so that paint
/// code never sees a clip that moved because of precision loss. The extent is
/// clamped so that the doubled size still fits in the `Au` range.
#[inline]
pub fn symmetric_rect(extent: Au) -> Rect<Au> {
    let extent = extent.max(Au(0)).min(MAX_AU / 2);
    Rect::new(
        Point2D::new(-extent, -extent),
        Size2D::new(extent * 2, extent * 2),
    )
}

/// Whether `extent` can be used with [`symmetric_rect`] without being clamped.
#[inline]
pub fn fits_symmetric_rect(extent: Au) -> bool {
    extent >= Au(0) && extent <= MAX_AU / 2
}
