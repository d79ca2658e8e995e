//! Mip chain arithmetic.

/// Number of levels in a full mip chain for a `width` x `height` image.
///
/// Halves the smaller dimension until it reaches zero, which is
/// `floor(log2(min(width, height))) + 1` for non-zero sizes.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let mut size = width.min(height);
    let mut count = 0;
    while size > 0 {
        size /= 2;
        count += 1;
    }
    count
}

/// Extent of the next level down, floored at 1.
pub fn next_mip_extent(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Extent of `level`, where level 0 is `width` x `height`.
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    (0..level).fold((width, height), |(w, h), _| next_mip_extent(w, h))
}
