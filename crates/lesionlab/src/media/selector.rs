//! Logical-index frame selection.
//!
//! Each entry's logical index is its position in the sorted listing. An
//! entry is kept only if its index is strictly greater than the last kept
//! one. Positions always grow by one, so over a sorted listing nothing is
//! ever skipped; the guard against repeated or out-of-order entries is kept
//! anyway because callers observe its output order.

use std::path::PathBuf;
use tracing::warn;

/// Sentinel meaning "nothing selected yet"
const NONE_SELECTED: i64 = -1;

/// A path kept by the selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFrame {
    /// Logical frame index
    pub index: i64,
    /// Frame file
    pub path: PathBuf,
}

/// Lazy selector over an ordered sequence of frame paths.
///
/// Also remembers the last path it was handed (selected or not), which is
/// what the preview builder repeats at the end of the animation.
#[derive(Debug)]
pub struct FrameSelector<I> {
    inner: I,
    position: i64,
    last_selected: i64,
    last_seen: Option<PathBuf>,
    skipped: usize,
}

impl<I> FrameSelector<I>
where
    I: Iterator<Item = PathBuf>,
{
    /// Wrap an ordered path iterator
    pub fn new(paths: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            inner: paths.into_iter(),
            position: 0,
            last_selected: NONE_SELECTED,
            last_seen: None,
            skipped: 0,
        }
    }

    /// Last path pulled from the underlying sequence, if any
    #[must_use]
    pub fn last_seen(&self) -> Option<&PathBuf> {
        self.last_seen.as_ref()
    }

    /// Logical index of the last selected entry (`-1` before the first)
    #[must_use]
    pub const fn last_selected(&self) -> i64 {
        self.last_selected
    }

    /// Number of entries dropped so far
    #[must_use]
    pub const fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<I> Iterator for FrameSelector<I>
where
    I: Iterator<Item = PathBuf>,
{
    type Item = SelectedFrame;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.inner.next()?;
            let frame = self.position;
            self.position += 1;
            self.last_seen = Some(path.clone());

            if frame > self.last_selected {
                self.last_selected = frame;
                return Some(SelectedFrame { index: frame, path });
            }

            self.skipped += 1;
            warn!(path = %path.display(), frame, "skipping repeated frame index");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_selects_every_entry_in_order() {
        let input = paths(&["a.png", "b.png", "c.png"]);
        let selected: Vec<_> = FrameSelector::new(input.clone()).collect();

        assert_eq!(selected.len(), 3);
        for (i, (sel, path)) in selected.iter().zip(&input).enumerate() {
            assert_eq!(sel.index, i as i64);
            assert_eq!(&sel.path, path);
        }
    }

    #[test]
    fn test_empty_sequence() {
        let mut selector = FrameSelector::new(Vec::<PathBuf>::new());
        assert!(selector.next().is_none());
        assert!(selector.last_seen().is_none());
        assert_eq!(selector.last_selected(), -1);
    }

    #[test]
    fn test_tracks_last_seen_path() {
        let mut selector = FrameSelector::new(paths(&["a.png", "b.png"]));
        selector.next();
        assert_eq!(selector.last_seen().unwrap(), &PathBuf::from("a.png"));
        selector.next();
        assert_eq!(selector.last_seen().unwrap(), &PathBuf::from("b.png"));
        assert!(selector.next().is_none());
        assert_eq!(selector.last_seen().unwrap(), &PathBuf::from("b.png"));
        assert_eq!(selector.last_selected(), 1);
    }

    #[test]
    fn test_duplicate_names_are_not_skipped() {
        // Positions still increase, so even a repeated name is kept.
        let selected: Vec<_> = FrameSelector::new(paths(&["a.png", "a.png"])).collect();
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn test_is_lazy() {
        let mut pulled = 0;
        let source = paths(&["a.png", "b.png", "c.png"])
            .into_iter()
            .inspect(|_| pulled += 1);
        let first = FrameSelector::new(source).next();
        assert!(first.is_some());
        assert_eq!(pulled, 1);
    }

    proptest! {
        #[test]
        fn prop_never_skips_a_listing(n in 0usize..200) {
            let input: Vec<PathBuf> = (0..n).map(|i| PathBuf::from(format!("image_{i:04}.png"))).collect();
            let mut selector = FrameSelector::new(input.clone());
            let selected: Vec<_> = selector.by_ref().collect();

            prop_assert_eq!(selected.len(), n);
            prop_assert_eq!(selector.skipped(), 0);
            prop_assert!(selected.windows(2).all(|w| w[0].index < w[1].index));
            prop_assert_eq!(selector.last_seen(), input.last());
        }
    }
}
