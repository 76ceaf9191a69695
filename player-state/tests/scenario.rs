//! End-to-end scenarios against a machine wired to a queue engine

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use player_state::{
    Effect, EngineError, FaultCause, FaultKind, ListenerError, PlayerEvent, PlayerState,
    QueueEngine, StateChange, StateKind, StateListener, StateMachine, Warning,
};

/// Listener recording (old, new) pairs
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(StateKind, StateKind)>>,
}

impl StateListener for Recorder {
    fn on_state_changed(&self, change: &StateChange) -> Result<(), ListenerError> {
        self.seen.lock().push((change.from.kind(), change.to.kind()));
        Ok(())
    }
}

#[test]
fn full_lifecycle() {
    let (engine, commands) = QueueEngine::new();
    let machine = StateMachine::builder().name("scenario").engine(engine).build();
    let recorder = Arc::new(Recorder::default());
    machine.subscribe_shared(recorder.clone());

    assert_eq!(machine.stop().unwrap().state(), &PlayerState::Stopped);
    assert_eq!(machine.play().unwrap().state(), &PlayerState::Playing);
    assert_eq!(machine.pause().unwrap().state(), &PlayerState::Paused);
    assert_eq!(machine.resume().unwrap().state(), &PlayerState::Playing);
    assert_eq!(machine.end_of_media().unwrap().state(), &PlayerState::Stopped);

    let applied = machine.fault(FaultCause::io("stream truncated")).unwrap();
    assert_eq!(applied.state().fault().map(|c| c.kind), Some(FaultKind::Io));

    assert_eq!(machine.reset().unwrap().state(), &PlayerState::Idle);

    let dispatched: Vec<Effect> = commands.try_iter().collect();
    assert_eq!(
        dispatched,
        vec![
            Effect::Start,
            Effect::Pause,
            Effect::Resume,
            Effect::Stop,
            Effect::Release,
            Effect::Release,
        ]
    );

    use StateKind::*;
    assert_eq!(
        *recorder.seen.lock(),
        vec![
            (Idle, Stopped),
            (Stopped, Playing),
            (Playing, Paused),
            (Paused, Playing),
            (Playing, Stopped),
            (Stopped, Error),
            (Error, Idle),
        ]
    );
    assert_eq!(machine.transition_count(), 7);
}

#[test]
fn failing_listener_is_reported_not_fatal() {
    let machine = StateMachine::new();
    let recorder = Arc::new(Recorder::default());

    let broken = machine.subscribe(|_: &StateChange| -> Result<(), ListenerError> {
        Err(ListenerError::new("display detached"))
    });
    machine.subscribe(|_: &StateChange| -> Result<(), ListenerError> {
        panic!("telemetry crashed")
    });
    machine.subscribe_shared(recorder.clone());

    let applied = machine.apply(PlayerEvent::Stop).unwrap();

    assert_eq!(applied.state(), &PlayerState::Stopped);
    assert_eq!(machine.current(), PlayerState::Stopped);
    assert_eq!(applied.warnings().len(), 2);
    assert!(applied.warnings().iter().all(Warning::is_listener_failure));
    match &applied.warnings()[0] {
        Warning::Listener(failure) => {
            assert_eq!(failure.subscription, broken);
            assert!(!failure.panicked);
        }
        other => panic!("unexpected warning {other:?}"),
    }
    assert_eq!(*recorder.seen.lock(), vec![(StateKind::Idle, StateKind::Stopped)]);
}

#[test]
fn unsubscribed_listener_is_not_notified() {
    let machine = StateMachine::new();
    let recorder = Arc::new(Recorder::default());
    let id = machine.subscribe_shared(recorder.clone());

    machine.stop().unwrap();
    assert!(machine.unsubscribe(id));
    machine.play().unwrap();

    assert_eq!(recorder.seen.lock().len(), 1);
    assert_eq!(machine.listener_count(), 0);
}

#[test]
fn engine_reports_asynchronous_fault() {
    let (engine, commands) = QueueEngine::new();
    let machine = StateMachine::builder().engine(engine).build();
    let changes = machine.iter();

    // Engine worker: fails as soon as it is asked to start
    let handle = machine.clone();
    let worker = thread::spawn(move || {
        for effect in commands {
            if effect == Effect::Start {
                handle
                    .apply(PlayerEvent::Fault(FaultCause::device("output unplugged")))
                    .unwrap();
                break;
            }
        }
    });

    machine.stop().unwrap();
    machine.play().unwrap();
    worker.join().unwrap();

    let kinds: Vec<_> = changes
        .timeout_iter(Duration::from_millis(100))
        .map(|c| c.to.kind())
        .collect();
    assert_eq!(kinds, vec![StateKind::Stopped, StateKind::Playing, StateKind::Error]);
    assert_eq!(
        machine.current(),
        PlayerState::Error(FaultCause::device("output unplugged"))
    );
}

#[test]
fn disconnected_engine_faults_the_machine() {
    let (engine, commands) = QueueEngine::new();
    drop(commands);
    let machine = StateMachine::builder().engine(engine).build();
    machine.stop().unwrap();

    let applied = machine.play().unwrap();
    assert!(applied.state().is_error());
    assert_eq!(
        applied.engine_fault().map(|c| c.kind),
        Some(FaultKind::Engine)
    );
    assert!(matches!(
        applied.warnings().first(),
        Some(Warning::Effect { effect: Effect::Start, .. })
    ));

    // Error rejects ordinary control events
    assert!(machine.play().is_err());
    assert!(machine.resume().is_err());
    assert!(machine.current().is_error());
}

#[test]
fn reset_with_disconnected_engine_returns_to_idle() {
    let (engine, commands) = QueueEngine::new();
    let machine = StateMachine::builder().engine(engine).build();
    machine.stop().unwrap();
    machine.play().unwrap();
    assert_eq!(machine.current(), PlayerState::Playing);

    drop(commands);
    let applied = machine.reset().unwrap();
    assert_eq!(applied.state(), &PlayerState::Idle);
    assert!(applied.engine_fault().is_none());
    assert_eq!(applied.warnings().len(), 1);
    assert!(matches!(
        applied.warnings()[0],
        Warning::Effect { effect: Effect::Release, .. }
    ));

    // Still Idle on a second reset
    assert_eq!(machine.reset().unwrap().state(), &PlayerState::Idle);
    assert_eq!(machine.current(), PlayerState::Idle);
}

#[test]
fn reset_with_offline_engine_is_total() {
    let paths: [&[PlayerEvent]; 5] = [
        &[],
        &[PlayerEvent::Stop],
        &[PlayerEvent::Stop, PlayerEvent::Play],
        &[PlayerEvent::Stop, PlayerEvent::Play, PlayerEvent::Pause],
        &[PlayerEvent::Fault(FaultCause::decode("bad frame"))],
    ];

    for path in paths {
        let online = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&online);
        let engine = move |_: Effect| -> Result<(), EngineError> {
            if flag.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(EngineError::new("engine offline"))
            }
        };
        let machine = StateMachine::builder().engine(engine).build();
        for event in path {
            machine.apply(event.clone()).unwrap();
        }

        online.store(false, Ordering::SeqCst);
        let applied = machine.reset().unwrap();
        assert_eq!(applied.state(), &PlayerState::Idle, "path {:?}", path);
        assert_eq!(machine.current(), PlayerState::Idle);
        assert!(applied.engine_fault().is_none());
        assert_eq!(applied.warnings().len(), 1);
    }
}

#[test]
fn states_serialize_with_fault_payload() {
    let state = PlayerState::Error(FaultCause::network("dns failure"));
    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "Error": { "kind": "network", "message": "dns failure" } })
    );
    assert_eq!(serde_json::to_value(PlayerState::Paused).unwrap(), "Paused");

    let back: PlayerState = serde_json::from_value(json).unwrap();
    assert_eq!(back, state);
    assert_eq!(serde_json::to_value(StateKind::Playing).unwrap(), "PLAYING");
}
