use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static TOOLBOX_PROGRESS: AtomicBool = AtomicBool::new(true);
static SILENCERS: AtomicUsize = AtomicUsize::new(0);

/// Whether collaborators report their own progress: the flag is set and no
/// run currently silences them.
pub fn toolbox_progress_enabled() -> bool {
    TOOLBOX_PROGRESS.load(Ordering::SeqCst) && SILENCERS.load(Ordering::SeqCst) == 0
}

/// Set the flag and return the previous value. Active silencers still win.
pub fn set_toolbox_progress(enabled: bool) -> bool {
    TOOLBOX_PROGRESS.swap(enabled, Ordering::SeqCst)
}

/// Register one more silencer. Pair every call with [`release_toolbox_progress`].
pub fn silence_toolbox_progress() {
    SILENCERS.fetch_add(1, Ordering::SeqCst);
}

/// Drop one silencer. Extra releases are ignored.
pub fn release_toolbox_progress() {
    let _ = SILENCERS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
}
