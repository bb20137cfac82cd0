use std::collections::HashMap;

use once_cell::sync::Lazy;

pub const FONT_HEIGHT: usize = 5;
const FONT_WIDTH: usize = 3;
const SPACING: usize = 1;
const FILL_CHAR: char = '█';

type Glyph = [&'static str; FONT_HEIGHT];

static DIGITS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('0', ["111", "1 1", "1 1", "1 1", "111"]),
        ('1', [" 1 ", "11 ", " 1 ", " 1 ", "111"]),
        ('2', ["111", "  1", "111", "1  ", "111"]),
        ('3', ["111", "  1", " 11", "  1", "111"]),
        ('4', ["1 1", "1 1", "111", "  1", "  1"]),
        ('5', ["111", "1  ", "111", "  1", "111"]),
        ('6', ["111", "1  ", "111", "1 1", "111"]),
        ('7', ["111", "  1", "  1", " 1 ", " 1 "]),
        ('8', ["111", "1 1", "111", "1 1", "111"]),
        ('9', ["111", "1 1", "111", "  1", "111"]),
    ])
});

/// Width in columns of `len` rendered digits.
pub fn width(len: usize) -> usize {
    len * FONT_WIDTH + len.saturating_sub(1) * SPACING
}

/// Render a digit string as block rows. Non-digits render as blanks.
pub fn render(text: &str) -> Vec<String> {
    let glyphs: Vec<Option<&Glyph>> = text.chars().map(|ch| DIGITS.get(&ch)).collect();
    let gap = " ".repeat(SPACING);
    (0..FONT_HEIGHT)
        .map(|row| {
            glyphs
                .iter()
                .map(|glyph| match glyph {
                    Some(glyph) => glyph[row].replace('1', &FILL_CHAR.to_string()),
                    None => " ".repeat(FONT_WIDTH),
                })
                .collect::<Vec<_>>()
                .join(&gap)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_digits_side_by_side() {
        let rows = render("07");
        assert_eq!(rows.len(), FONT_HEIGHT);
        assert!(rows.iter().all(|row| row.chars().count() == width(2)));
        assert_eq!(rows[0], "███ ███");
        assert_eq!(rows[4], "███  █ ");
    }

    #[test]
    fn unknown_characters_are_blank() {
        let rows = render("x");
        assert!(rows.iter().all(|row| row == "   "));
    }
}
