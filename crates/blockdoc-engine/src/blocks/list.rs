//! Bullet and ordered list markers.
//!
//! A list item's marker is stored in the buffer ahead of its content. Bullet
//! markers depend only on the indentation level; ordered markers also depend
//! on the item's position within its run, so they are rewritten by the
//! renumber pass whenever the run changes.

use crate::buffer::utf16_len;

/// Bullet glyphs by indentation level.
pub const BULLET_GLYPHS: [char; 5] = ['•', '▪', '◦', '‣', '⁃'];

/// Highest indentation level of a bullet list item.
pub const MAX_LIST_LEVEL: u8 = 4;
/// Highest indentation level of an ordered list item.
pub const MAX_ORDERED_LEVEL: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListItem {
    pub indentation_level: u8,
    /// Code units of the marker (glyph or label plus tab).
    pub marker_length: usize,
    /// Zero-based ordinal within the run of same-level ordered items.
    pub position: usize,
}

impl ListItem {
    pub fn bullet(level: u8) -> Self {
        let level = level.min(MAX_LIST_LEVEL);
        Self {
            indentation_level: level,
            marker_length: utf16_len(&bullet_marker(level)),
            position: 0,
        }
    }

    pub fn ordered(level: u8, position: usize) -> Self {
        let level = level.min(MAX_ORDERED_LEVEL);
        Self {
            indentation_level: level,
            marker_length: utf16_len(&ordered_marker(level, position)),
            position,
        }
    }
}

pub fn bullet_marker(level: u8) -> String {
    let glyph = BULLET_GLYPHS[usize::from(level.min(MAX_LIST_LEVEL))];
    format!("{glyph}\t")
}

pub fn ordered_marker(level: u8, position: usize) -> String {
    format!("{}.\t", ordered_label(level, position))
}

/// `1`/`a`/`i` numbering cycling with the level.
pub fn ordered_label(level: u8, position: usize) -> String {
    let number = position + 1;
    match level % 3 {
        0 => number.to_string(),
        1 => alphabetic(number),
        _ => roman(number),
    }
}

/// Bijective base-26: 1 → a, 26 → z, 27 → aa.
fn alphabetic(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn roman(mut n: usize) -> String {
    const NUMERALS: [(usize, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

/// Positions for a run of consecutive ordered items given their levels.
///
/// Each level keeps its own counter; stepping out to a shallower level resets
/// the counters of every deeper level.
pub fn number_run(levels: &[u8]) -> Vec<usize> {
    let mut counters = [0usize; MAX_ORDERED_LEVEL as usize + 1];
    levels
        .iter()
        .map(|&level| {
            let level = usize::from(level.min(MAX_ORDERED_LEVEL));
            let position = counters[level];
            counters[level] += 1;
            for deeper in &mut counters[level + 1..] {
                *deeper = 0;
            }
            position
        })
        .collect()
}

/// Indentation after a Tab: one deeper than now, but never more than one
/// deeper than the previous sibling.
pub fn clamp_level(requested: u8, previous_sibling: Option<u8>, max: u8) -> u8 {
    let ceiling = previous_sibling.map_or(0, |level| level.saturating_add(1));
    requested.min(ceiling).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, "1.\t")]
    #[case(0, 9, "10.\t")]
    #[case(1, 0, "a.\t")]
    #[case(1, 26, "aa.\t")]
    #[case(2, 3, "iv.\t")]
    #[case(2, 13, "xiv.\t")]
    fn test_ordered_markers(#[case] level: u8, #[case] position: usize, #[case] expected: &str) {
        assert_eq!(ordered_marker(level, position), expected);
    }

    #[test]
    fn test_bullet_glyph_per_level() {
        let markers: Vec<String> = (0..=MAX_LIST_LEVEL).map(bullet_marker).collect();
        assert_eq!(markers, vec!["•\t", "▪\t", "◦\t", "‣\t", "⁃\t"]);
        assert_eq!(ListItem::bullet(9).indentation_level, MAX_LIST_LEVEL);
        assert_eq!(ListItem::bullet(0).marker_length, 2);
    }

    #[test]
    fn test_number_run_resets_deeper_levels() {
        assert_eq!(number_run(&[0, 0, 1, 1, 0, 1]), vec![0, 1, 0, 1, 2, 0]);
        assert_eq!(number_run(&[0, 1, 2, 1, 2]), vec![0, 0, 0, 1, 0]);
    }

    #[rstest]
    #[case(1, None, 0)]
    #[case(1, Some(0), 1)]
    #[case(3, Some(1), 2)]
    #[case(4, Some(4), 2)]
    fn test_clamp_level(
        #[case] requested: u8,
        #[case] previous: Option<u8>,
        #[case] expected: u8,
    ) {
        assert_eq!(clamp_level(requested, previous, MAX_ORDERED_LEVEL), expected);
    }
}
