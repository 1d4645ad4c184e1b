//! Pure calculation functions for thumbnail dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Clamp a requested longest edge into `[min, max]`.
///
/// Accepts signed input so that negative request values clamp to `min`
/// instead of failing to parse.
pub fn clamp_dimension(requested: i64, min: u32, max: u32) -> u32 {
    requested.clamp(i64::from(min), i64::from(max)) as u32
}

/// Dimensions of `source` scaled down to fit inside a `max` x `max` box.
///
/// Aspect ratio is preserved and sources already inside the box are returned
/// unchanged (never enlarged). Neither edge drops below one pixel.
///
/// # Examples
/// ```
/// # use photoshelf::imaging::fit_within;
/// assert_eq!(fit_within((4000, 3000), 320), (320, 240));
/// assert_eq!(fit_within((3000, 4000), 320), (240, 320));
/// assert_eq!(fit_within((100, 50), 320), (100, 50));
/// ```
pub fn fit_within(source: (u32, u32), max: u32) -> (u32, u32) {
    let (w, h) = source;
    if w <= max && h <= max {
        return (w, h);
    }
    let scale = max as f64 / w.max(h) as f64;
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max);
    (scaled(w), scaled(h))
}
