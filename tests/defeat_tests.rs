use frostrift::defeat::{DefeatSequence, DefeatStep};

#[test]
fn trigger_is_idempotent() {
    let mut sequence = DefeatSequence::default();
    assert!(sequence.trigger());
    assert!(!sequence.trigger(), "second trigger must be swallowed");
    assert!(sequence.is_triggered());
}

#[test]
fn no_steps_before_trigger() {
    let mut sequence = DefeatSequence::default();
    assert!(sequence.advance(100.0).is_empty());
}

#[test]
fn teardown_fires_immediately_on_first_advance() {
    let mut sequence = DefeatSequence::default();
    sequence.trigger();
    let due = sequence.advance(0.0);
    assert_eq!(due, vec![DefeatStep::Teardown]);
}

#[test]
fn steps_fire_in_schedule_order_at_their_offsets() {
    let mut sequence = DefeatSequence::default();
    sequence.trigger();
    assert_eq!(sequence.advance(0.016), vec![DefeatStep::Teardown]);
    // Nothing due until the reposition delay passes.
    assert!(sequence.advance(0.5).is_empty());
    assert_eq!(sequence.advance(1.0), vec![DefeatStep::Reposition]);
    assert!(sequence.advance(0.5).is_empty());
    assert_eq!(sequence.advance(1.5), vec![DefeatStep::DialogueRelease]);
    assert!(sequence.advance(10.0).is_empty(), "sequence is exhausted");
}

#[test]
fn huge_delta_drains_every_step_in_order() {
    let mut sequence = DefeatSequence::default();
    sequence.trigger();
    let due = sequence.advance(60.0);
    assert_eq!(
        due,
        vec![
            DefeatStep::Teardown,
            DefeatStep::Reposition,
            DefeatStep::DialogueRelease
        ]
    );
}

#[test]
fn reset_rearms_the_sequence() {
    let mut sequence = DefeatSequence::default();
    sequence.trigger();
    sequence.advance(60.0);
    sequence.reset();
    assert!(!sequence.is_triggered());
    assert!(sequence.trigger(), "a fresh encounter can trigger again");
}
