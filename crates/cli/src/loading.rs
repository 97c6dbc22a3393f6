use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Story,
    Voice,
    Lyrics,
    RaceStory,
    MdbTable,
    Dictionary,
    Discovery,
}

impl LoadKind {
    const COUNT: usize = 7;

    fn slot(self) -> usize {
        self as usize
    }
}

/// Advisory "something of this kind is loading" indicators.
///
/// Counts in-flight loads per kind so overlapping requests of the same kind
/// keep the flag raised until the last one finishes. Nothing is locked.
#[derive(Debug, Default)]
pub struct LoadingFlags {
    in_flight: [AtomicUsize; LoadKind::COUNT],
}

impl LoadingFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag for `kind` until the returned guard drops.
    pub fn begin(&self, kind: LoadKind) -> LoadingGuard<'_> {
        self.in_flight[kind.slot()].fetch_add(1, Ordering::SeqCst);
        LoadingGuard { flags: self, kind }
    }

    pub fn is_loading(&self, kind: LoadKind) -> bool {
        self.in_flight[kind.slot()].load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the loading flag drops with the guard"]
pub struct LoadingGuard<'a> {
    flags: &'a LoadingFlags,
    kind: LoadKind,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flags.in_flight[self.kind.slot()].fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_flag_on_every_exit() {
        let flags = LoadingFlags::new();

        fn failing(flags: &LoadingFlags) -> Result<(), &'static str> {
            let _loading = flags.begin(LoadKind::Dictionary);
            assert!(flags.is_loading(LoadKind::Dictionary));
            Err("parse failure")
        }

        assert!(failing(&flags).is_err());
        assert!(!flags.is_loading(LoadKind::Dictionary));
    }

    #[test]
    fn overlapping_loads_keep_flag_raised() {
        let flags = LoadingFlags::new();
        let first = flags.begin(LoadKind::Story);
        let second = flags.begin(LoadKind::Story);
        drop(first);
        assert!(flags.is_loading(LoadKind::Story));
        assert!(!flags.is_loading(LoadKind::Voice));
        drop(second);
        assert!(!flags.is_loading(LoadKind::Story));
    }
}
