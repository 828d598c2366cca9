#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rui_session::{
    ConnectionState, EnvironmentFacts, OutboundFrame, SessionAction, SessionConfig, SessionEvent,
    SessionMachine,
};
use rui_wire::Record;

#[derive(Debug, Arbitrary)]
enum Op {
    Start,
    Submit,
    Opened,
    Message(String),
    Closed(bool),
    Error,
    SendFailed(u8),
    FocusGained,
    FocusLost,
    Unload,
    Close,
    Tick(u16),
    Assign(u8),
    Restart,
}

fuzz_target!(|ops: Vec<Op>| {
    let mut machine = SessionMachine::new(
        SessionConfig::default(),
        "ws://fuzz/ws",
        Box::new(EnvironmentFacts::default()),
    );
    let mut now = 0u64;
    let mut in_flight: Vec<OutboundFrame> = Vec::new();

    for op in ops {
        let event = match op {
            Op::Start => SessionEvent::Start,
            Op::Submit => SessionEvent::Submit(Record::new("m")),
            Op::Opened => SessionEvent::TransportOpened,
            Op::Message(text) => SessionEvent::TransportMessage(text),
            Op::Closed(clean) => SessionEvent::TransportClosed {
                clean,
                code: if clean { 1000 } else { 1006 },
                reason: String::new(),
            },
            Op::Error => SessionEvent::TransportError("fuzz".into()),
            Op::SendFailed(n) => {
                let keep = usize::from(n).min(in_flight.len());
                let unsent = in_flight.split_off(in_flight.len() - keep);
                SessionEvent::SendFailed {
                    unsent,
                    reason: "fuzz".into(),
                }
            }
            Op::FocusGained => SessionEvent::FocusGained,
            Op::FocusLost => SessionEvent::FocusLost,
            Op::Unload => SessionEvent::Unload,
            Op::Close => SessionEvent::CloseRequested,
            Op::Tick(ms) => {
                now += u64::from(ms);
                SessionEvent::Tick
            }
            Op::Assign(id) => SessionEvent::SessionAssigned(id.to_string()),
            Op::Restart => SessionEvent::RestartRequested,
        };

        let transition = machine.handle_event(now, event);
        let arms = transition
            .actions
            .iter()
            .filter(|action| matches!(action, SessionAction::ArmReconnectTimer { .. }))
            .count();
        assert!(arms <= 1, "more than one timer armed in one step");
        if machine.is_terminated() {
            assert!(
                !transition
                    .actions
                    .iter()
                    .any(|action| matches!(action, SessionAction::OpenTransport { .. })),
                "terminated session reconnected"
            );
        }
        for action in transition.actions {
            if let SessionAction::Send(frame) = action {
                in_flight.push(frame);
            }
        }
        assert!(
            machine.state() != ConnectionState::Connecting || machine.reconnect_deadline().is_none(),
            "timer armed while connecting"
        );
    }
});
