//! Terminal geometry for the rail
//!
//! One terminal column stands for `cell_width_px` pixels, so the loop keeps
//! working in pixels and only the final placement is quantized to columns.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use tactile_core::marquee::Measurement;

/// Rendered width of a label in pixels
pub fn label_width_px(label: &str, cell_px: f64) -> f64 {
    label.width() as f64 * cell_px
}

/// Lay labels out as a flex row with `gap` pixels after each
pub fn measure_labels<S: AsRef<str>>(labels: &[S], cell_px: f64, gap: f64) -> Vec<Measurement> {
    Measurement::row(
        labels.iter().map(|l| label_width_px(l.as_ref(), cell_px)),
        gap,
    )
}

/// Repeat the configured items until the rail is wider than the viewport
/// plus its widest item, otherwise the wrap would be visible.
pub fn fill_viewport(items: &[String], cell_px: f64, gap: f64, viewport_px: f64) -> Vec<String> {
    if items.is_empty() {
        return Vec::new();
    }

    let widths: Vec<f64> = items.iter().map(|l| label_width_px(l, cell_px)).collect();
    let widest = widths.iter().copied().fold(0.0, f64::max);
    let pass_px: f64 = widths.iter().map(|w| w + gap).sum();
    if pass_px <= 0.0 {
        return items.to_vec();
    }

    let passes = ((viewport_px + widest) / pass_px).ceil().max(1.0) as usize;
    items
        .iter()
        .cycle()
        .take(items.len() * passes)
        .cloned()
        .collect()
}

/// Column of a pixel position
#[inline]
pub fn column_of(left_px: f64, cell_px: f64) -> i64 {
    (left_px / cell_px).round() as i64
}

/// Paint labels into a line `width` columns wide, clipping at both edges
pub fn compose_line<'a, I>(entries: I, width: usize) -> String
where
    I: IntoIterator<Item = (i64, &'a str)>,
{
    // None marks the second half of a wide character
    let mut cells: Vec<Option<char>> = vec![Some(' '); width];

    for (start, label) in entries {
        let mut col = start;
        for ch in label.chars() {
            let w = ch.width().unwrap_or(0) as i64;
            if w == 0 {
                continue;
            }
            if col >= 0 && col + w <= width as i64 {
                let at = col as usize;
                let end = at + w as usize;
                // Never leave half of a wide character behind
                if at > 0 && cells[at].is_none() {
                    cells[at - 1] = Some(' ');
                }
                if end < width && cells[end].is_none() {
                    cells[end] = Some(' ');
                }
                cells[at] = Some(ch);
                for extra in 1..w as usize {
                    cells[at + extra] = None;
                }
            }
            col += w;
            if col >= width as i64 {
                break;
            }
        }
    }

    cells.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_labels() {
        let row = measure_labels(&["ab", "cde"], 10.0, 5.0);
        assert_eq!(row[0].width, 20.0);
        assert_eq!(row[1].offset_left, 25.0);
        assert_eq!(row[1].width, 30.0);
    }

    #[test]
    fn test_fill_viewport_repeats_items() {
        let items = vec!["abcd".to_string(), "ef".to_string()];
        // one pass is 4 + 2 cols + 2 gaps of 1 col = 8 cols
        let filled = fill_viewport(&items, 1.0, 1.0, 20.0);
        assert_eq!(filled.len(), 6);
        assert_eq!(filled[2], "abcd");

        let wide_enough = fill_viewport(&items, 1.0, 1.0, 2.0);
        assert_eq!(wide_enough.len(), 2);
        assert!(fill_viewport(&[], 1.0, 1.0, 80.0).is_empty());
    }

    #[test]
    fn test_compose_line_clips() {
        let line = compose_line([(-2, "hello"), (6, "world")], 10);
        assert_eq!(line, "llo   worl");
    }

    #[test]
    fn test_compose_line_wide_chars() {
        let line = compose_line([(0, "触感")], 6);
        assert_eq!(line.width(), 6);
        assert!(line.starts_with("触感"));

        // a wide char that would straddle the edge is dropped
        let clipped = compose_line([(0, "触感")], 3);
        assert_eq!(clipped, "触 ");
    }

    #[test]
    fn test_overlapping_wide_chars_keep_width() {
        // narrow text over the tail of a wide char
        let line = compose_line([(0, "触"), (1, "ab")], 4);
        assert_eq!(line, " ab ");
        assert_eq!(line.width(), 4);

        // narrow text over the lead of a wide char
        let line = compose_line([(1, "触"), (1, "x")], 4);
        assert_eq!(line, " x  ");

        // wide over wide, shifted by one column, clears both neighbours
        let line = compose_line([(0, "触感"), (1, "好")], 6);
        assert_eq!(line.width(), 6);
        assert_eq!(line, " 好   ");
    }

    #[test]
    fn test_column_of() {
        assert_eq!(column_of(31.0, 16.0), 2);
        assert_eq!(column_of(-24.0, 16.0), -2);
    }
}
