use zenread_core::{update, AppState, Msg};

#[test]
fn noop_and_tick_leave_state_untouched() {
    for msg in [Msg::NoOp, Msg::Tick] {
        let state = AppState::new();
        let (next, effects) = update(state.clone(), msg);

        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
