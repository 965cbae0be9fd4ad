/// Printed width of a quantity sequence on the single-sheet report. A layout
/// constraint only; storage is never truncated.
pub const SEQ_DISPLAY_WIDTH: usize = 40;

/// Render a quantity sequence as "12, 8, 5".
pub fn seq(quantities: &[i64]) -> String {
    quantities
        .iter()
        .map(|q| q.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Sequence text clipped to the report column width.
pub fn seq_clipped(quantities: &[i64]) -> String {
    let full = seq(quantities);
    if full.len() <= SEQ_DISPLAY_WIDTH {
        full
    } else {
        full[..SEQ_DISPLAY_WIDTH].to_string()
    }
}

/// Sheet-name fragment for export filenames: spaces become underscores,
/// clipped to 15 characters.
pub fn filename_fragment(name: &str) -> String {
    let cleaned = name.replace(' ', "_");
    cleaned.chars().take(15).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_formatting() {
        assert_eq!(seq(&[12, 8, 5]), "12, 8, 5");
        assert_eq!(seq(&[7]), "7");
        assert_eq!(seq(&[]), "");
    }

    #[test]
    fn test_seq_clipped_at_40() {
        let many: Vec<i64> = (10..30).collect();
        let clipped = seq_clipped(&many);
        assert_eq!(clipped.len(), SEQ_DISPLAY_WIDTH);
        assert!(seq(&many).starts_with(&clipped));
    }

    #[test]
    fn test_seq_clipped_short_is_untouched() {
        assert_eq!(seq_clipped(&[12, 8]), "12, 8");
    }

    #[test]
    fn test_filename_fragment() {
        assert_eq!(filename_fragment("Batch 1 Monday"), "Batch_1_Monday");
        assert_eq!(filename_fragment("A very long sheet name"), "A_very_long_she");
    }
}
