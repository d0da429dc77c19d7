use redglove_types::geometry::{Point, SearchWindow};

/// Rectangle to scan this frame.
///
/// Without a previous centroid the whole frame is scanned. Otherwise the window is
/// `radius` pixels either side of the last centroid, clamped to the frame.
pub fn select_search_window(
    last_centroid: Option<Point>,
    radius: u32,
    width: u32,
    height: u32,
) -> SearchWindow {
    let Some(last) = last_centroid else {
        return SearchWindow::full(width, height);
    };

    let window = SearchWindow {
        xmin: last.x.saturating_sub(radius).min(width),
        xmax: last.x.saturating_add(radius).min(width),
        ymin: last.y.saturating_sub(radius).min(height),
        ymax: last.y.saturating_add(radius).min(height),
    };

    // A centroid outside the frame can only come from a resized source.
    if window.is_empty() {
        SearchWindow::full(width, height)
    } else {
        window
    }
}
