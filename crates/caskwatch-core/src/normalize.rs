/// Normalizes a product name for display and matching.
///
/// Trims the name, collapses whitespace runs to a single space, and folds
/// typographic quotes to their ASCII forms so that `Blanton’s` and
/// `Blanton's` compare equal.
#[must_use]
pub fn normalize_product_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| match c {
                    '\u{2018}' | '\u{2019}' | '\u{02BC}' => '\'',
                    '\u{201C}' | '\u{201D}' => '"',
                    other => other,
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(
            normalize_product_name("  Weller   Special\tReserve \n"),
            "Weller Special Reserve"
        );
    }

    #[test]
    fn folds_curly_apostrophe() {
        assert_eq!(
            normalize_product_name("Blanton\u{2019}s Gold"),
            "Blanton's Gold"
        );
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_product_name("   "), "");
    }

    #[test]
    fn preserves_case() {
        assert_eq!(normalize_product_name("E.H. Taylor"), "E.H. Taylor");
    }
}
