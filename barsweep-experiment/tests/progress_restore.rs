mod common;

use barsweep_experiment::{ProgressOverride, StimulusSequencer};
use barsweep_toolbox::{set_toolbox_progress, toolbox_progress_enabled};
use common::{CountingOptics, RecordingMosaic, small_params, toolbox_with};

// One test per binary: the flag is process-wide.
#[test]
fn toolbox_progress_is_silenced_during_a_run_and_restored_on_every_exit() {
    set_toolbox_progress(true);

    let (toolbox, _, seen) = toolbox_with(CountingOptics::new());
    StimulusSequencer::new(&toolbox)
        .show_progress(true)
        .run(&small_params(), RecordingMosaic::default())
        .unwrap();
    assert!(!seen.borrow().is_empty());
    assert!(seen.borrow().iter().all(|enabled| !enabled));
    assert!(toolbox_progress_enabled());

    let (failing, calls, _) = toolbox_with(CountingOptics::failing_after(2));
    let result = StimulusSequencer::new(&failing).run(&small_params(), RecordingMosaic::default());
    assert!(result.is_err());
    assert_eq!(calls.get(), 3);
    assert!(toolbox_progress_enabled());

    // Another run still in flight keeps collaborators quiet after this one ends.
    let other_run = ProgressOverride::silence();
    StimulusSequencer::new(&toolbox)
        .run(&small_params(), RecordingMosaic::default())
        .unwrap();
    assert!(!toolbox_progress_enabled());
    drop(other_run);
    assert!(toolbox_progress_enabled());

    set_toolbox_progress(false);
    StimulusSequencer::new(&toolbox)
        .run(&small_params(), RecordingMosaic::default())
        .unwrap();
    assert!(!toolbox_progress_enabled());
}
