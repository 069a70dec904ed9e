//! Extraction strategy selection.
//!
//! Picks how much work the external RAW decoder has to do for a job, using
//! only the widths the caller declared. The source file is never probed.

/// How the external decoder should produce a viewable raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionStrategy {
    /// Pull the camera-rendered preview out of the RAW container (`-e`).
    UseEmbeddedPreview,
    /// Half-size decode with camera white balance, TIFF output (`-w -h -T`).
    HalfResolution,
    /// Full-size decode with camera white balance, TIFF output (`-w -T`).
    FullResolution,
}

impl ExtractionStrategy {
    /// Decoder flags for this strategy, not including the stdout flag or
    /// the source path.
    pub fn decoder_flags(self) -> &'static [&'static str] {
        match self {
            ExtractionStrategy::UseEmbeddedPreview => &["-e"],
            ExtractionStrategy::HalfResolution => &["-w", "-h", "-T"],
            ExtractionStrategy::FullResolution => &["-w", "-T"],
        }
    }
}

/// Choose a strategy for a source `full_width` pixels wide.
///
/// The checks run top to bottom and the first match wins:
///
/// 1. `thumb_width >= preview_width && thumb_width <= full_width / 2`:
///    embedded preview. It is already big enough and smaller than a
///    half-size decode would be.
/// 2. `full_width / 2 >= preview_width`: half resolution.
/// 3. `thumb_width >= preview_width`: embedded preview, since half size
///    would come out too small.
/// 4. Otherwise full resolution.
///
/// Rules 1 and 3 overlap with rule 2 at some boundaries (for example
/// `thumb_width == preview_width == full_width / 2`). The order above decides
/// those cases and must not be rewritten into an equivalent-looking boolean.
pub fn select_strategy(full_width: u32, thumb_width: u32, preview_width: u32) -> ExtractionStrategy {
    let half_width = full_width / 2;

    if thumb_width >= preview_width && thumb_width <= half_width {
        ExtractionStrategy::UseEmbeddedPreview
    } else if half_width >= preview_width {
        ExtractionStrategy::HalfResolution
    } else if thumb_width >= preview_width {
        ExtractionStrategy::UseEmbeddedPreview
    } else {
        ExtractionStrategy::FullResolution
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Rules evaluated in the opposite order from `select_strategy`.
    fn reordered(full: u32, thumb: u32, preview: u32) -> ExtractionStrategy {
        let half = full / 2;
        if half >= preview {
            ExtractionStrategy::HalfResolution
        } else if thumb >= preview {
            ExtractionStrategy::UseEmbeddedPreview
        } else {
            ExtractionStrategy::FullResolution
        }
    }

    proptest! {
        /// Property: the chosen strategy matches the first predicate that holds.
        #[test]
        fn prop_first_matching_rule_wins(
            full in 0u32..20_000,
            thumb in 0u32..5_000,
            preview in 0u32..5_000,
        ) {
            let half = full / 2;
            let rules = [
                (thumb >= preview && thumb <= half, ExtractionStrategy::UseEmbeddedPreview),
                (half >= preview, ExtractionStrategy::HalfResolution),
                (thumb >= preview, ExtractionStrategy::UseEmbeddedPreview),
                (true, ExtractionStrategy::FullResolution),
            ];
            let expected = rules.iter().find(|(hit, _)| *hit).map(|(_, s)| *s).unwrap();

            prop_assert_eq!(select_strategy(full, thumb, preview), expected);
        }

        /// Property: rule order only matters where rule 1 and rule 2 overlap.
        #[test]
        fn prop_order_matters_only_on_overlap(
            full in 0u32..20_000,
            thumb in 0u32..5_000,
            preview in 0u32..5_000,
        ) {
            let half = full / 2;
            let overlap = thumb >= preview && thumb <= half && half >= preview;
            let same = select_strategy(full, thumb, preview) == reordered(full, thumb, preview);
            prop_assert_eq!(same, !overlap);
        }
    }

    #[test]
    fn test_reordering_changes_a_boundary_case() {
        assert_ne!(select_strategy(1000, 500, 500), reordered(1000, 500, 500));
    }
}
