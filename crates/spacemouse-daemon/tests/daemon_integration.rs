//! Daemon-level scenarios against the pull and push backends.
//!
//! The pull scenarios run a real polling thread over an in-memory spacenavd
//! connection, so they exercise the thread handoff and shutdown ordering the
//! way the socket client would.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use spacemouse_core::buttonmap::connexion::{BIT_ALT, BIT_MENU};
use spacemouse_core::{ButtonEvent, CanonicalButton, RawSample};
use spacemouse_daemon::infrastructure::backend::mock::MockBackend;
use spacemouse_daemon::infrastructure::backend::spnav::{
    SpnavBackend, SpnavConnection, SpnavEvent,
};
use spacemouse_daemon::{initialize_daemon, BackendError, EventDaemon, LogSink};

/// spacenavd stand-in: replays a queue, then keeps reporting motion if
/// `endless_motion` is set.
#[derive(Clone, Default)]
struct FakeSpnav {
    queue: Arc<Mutex<VecDeque<SpnavEvent>>>,
    endless_motion: Arc<AtomicBool>,
}

impl FakeSpnav {
    fn push(&self, event: SpnavEvent) {
        self.queue.lock().unwrap().push_back(event);
    }
}

impl SpnavConnection for FakeSpnav {
    fn open(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    fn close(&mut self) {}

    fn poll_event(&mut self) -> Option<SpnavEvent> {
        let queued = self.queue.lock().unwrap().pop_front();
        queued.or_else(|| {
            self.endless_motion.load(Ordering::SeqCst).then_some(SpnavEvent::Motion {
                translation: [1, 0, 0],
                rotation: [0, 0, 0],
                period: 1,
            })
        })
    }
}

fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn test_spnav_events_reach_callbacks_from_polling_thread() {
    // Arrange
    let spnav = FakeSpnav::default();
    let daemon = initialize_daemon(SpnavBackend::new(spnav.clone()), LogSink::noop());
    let presses = Arc::new(Mutex::new(Vec::<ButtonEvent>::new()));
    let releases = Arc::new(Mutex::new(Vec::<ButtonEvent>::new()));
    let p = presses.clone();
    daemon.set_button_press_callback(move |e| p.lock().unwrap().push(e));
    let r = releases.clone();
    daemon.set_button_release_callback(move |e| r.lock().unwrap().push(e));

    // Act: Alt down, Top down, Alt up
    spnav.push(SpnavEvent::Button { bnum: 23, press: true });
    spnav.push(SpnavEvent::Button { bnum: 2, press: true });
    spnav.push(SpnavEvent::Button { bnum: 23, press: false });
    assert!(wait_until(|| releases.lock().unwrap().len() == 1));
    daemon.close();

    // Assert
    let presses = presses.lock().unwrap();
    assert_eq!(presses[1].button, CanonicalButton::Top);
    assert!(presses[1].modifiers.alt());
    let releases = releases.lock().unwrap();
    assert_eq!(releases[0].button, CanonicalButton::Alt);
    assert!(releases[0].modifiers.is_empty());
}

#[test]
fn test_no_callback_runs_after_close_returns() {
    // Arrange: the device reports motion continuously
    let spnav = FakeSpnav::default();
    spnav.endless_motion.store(true, Ordering::SeqCst);
    let daemon = initialize_daemon(SpnavBackend::new(spnav), LogSink::noop());
    let moves = Arc::new(AtomicUsize::new(0));
    let m = moves.clone();
    daemon.set_move_callback(move |_| {
        m.fetch_add(1, Ordering::SeqCst);
    });
    assert!(wait_until(|| moves.load(Ordering::SeqCst) > 0));

    // Act
    daemon.close();
    let after_close = moves.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));

    // Assert
    assert_eq!(moves.load(Ordering::SeqCst), after_close);
    assert!(!daemon.is_initialized());
}

#[test]
fn test_close_completes_while_callback_queries_daemon() {
    // Arrange: every move asks the daemon whether it is still running
    let spnav = FakeSpnav::default();
    spnav.endless_motion.store(true, Ordering::SeqCst);
    let daemon = initialize_daemon(SpnavBackend::new(spnav), LogSink::noop());
    let queries = Arc::new(AtomicUsize::new(0));
    let weak = Arc::downgrade(&daemon);
    let q = queries.clone();
    daemon.set_move_callback(move |_| {
        if let Some(daemon) = weak.upgrade() {
            let _ = daemon.is_initialized();
            let _ = daemon.kind();
            q.fetch_add(1, Ordering::SeqCst);
        }
    });
    assert!(wait_until(|| queries.load(Ordering::SeqCst) > 0));

    // Act
    let (done, closed) = mpsc::channel();
    let closer = {
        let daemon = daemon.clone();
        thread::spawn(move || {
            daemon.close();
            let _ = done.send(());
        })
    };

    // Assert
    assert!(
        closed.recv_timeout(Duration::from_secs(5)).is_ok(),
        "close did not return while a callback was querying the daemon"
    );
    closer.join().expect("closer thread");
    assert!(!daemon.is_initialized());
}

#[test]
fn test_push_callback_can_query_daemon_during_dispatch() {
    // Arrange
    let daemon = initialize_daemon(MockBackend::new(), LogSink::noop());
    let answers = Arc::new(Mutex::new(Vec::new()));
    let weak = Arc::downgrade(&daemon);
    let a = answers.clone();
    daemon.set_button_press_callback(move |_| {
        if let Some(daemon) = weak.upgrade() {
            a.lock().unwrap().push(daemon.is_initialized());
        }
    });

    // Act: dispatch on another thread so a hang fails the test instead of blocking it
    let (done, finished) = mpsc::channel();
    {
        let daemon = daemon.clone();
        thread::spawn(move || {
            let _ = done.send(daemon.process_message(&RawSample::Buttons(BIT_MENU)));
        });
    }

    // Assert
    assert_eq!(finished.recv_timeout(Duration::from_secs(5)), Ok(true));
    assert_eq!(*answers.lock().unwrap(), vec![true]);
}

#[test]
fn test_release_while_polling_keeps_thread_alive_but_silent() {
    // Arrange
    let spnav = FakeSpnav::default();
    spnav.endless_motion.store(true, Ordering::SeqCst);
    let daemon = initialize_daemon(SpnavBackend::new(spnav), LogSink::noop());
    let moves = Arc::new(AtomicUsize::new(0));
    let m = moves.clone();
    daemon.set_move_callback(move |_| {
        m.fetch_add(1, Ordering::SeqCst);
    });
    assert!(wait_until(|| moves.load(Ordering::SeqCst) > 0));

    // Act
    daemon.release();
    let after_release = moves.load(Ordering::SeqCst);
    thread::sleep(Duration::from_millis(30));

    // Assert
    assert_eq!(moves.load(Ordering::SeqCst), after_release);
    assert!(daemon.is_initialized(), "release does not stop the backend");
    daemon.close();
}

#[test]
fn test_callbacks_can_be_swapped_while_polling() {
    // Arrange
    let spnav = FakeSpnav::default();
    spnav.endless_motion.store(true, Ordering::SeqCst);
    let daemon = initialize_daemon(SpnavBackend::new(spnav), LogSink::noop());
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    // Act
    let f = first.clone();
    daemon.set_move_callback(move |_| {
        f.fetch_add(1, Ordering::SeqCst);
    });
    assert!(wait_until(|| first.load(Ordering::SeqCst) > 0));
    let s = second.clone();
    daemon.set_move_callback(move |_| {
        s.fetch_add(1, Ordering::SeqCst);
    });
    let first_at_swap = first.load(Ordering::SeqCst);
    assert!(wait_until(|| second.load(Ordering::SeqCst) > 0));
    daemon.close();

    // Assert: at most the event in flight during the swap went to the old one
    assert!(first.load(Ordering::SeqCst) <= first_at_swap + 1);
}

#[test]
fn test_panicking_callback_does_not_stop_polling() {
    // Arrange
    let spnav = FakeSpnav::default();
    let lines = Arc::new(Mutex::new(Vec::<String>::new()));
    let l = lines.clone();
    let daemon = initialize_daemon(
        SpnavBackend::new(spnav.clone()),
        LogSink::new(move |m| l.lock().unwrap().push(m.to_string())),
    );
    let releases = Arc::new(AtomicUsize::new(0));
    daemon.set_button_press_callback(|_| panic!("application bug"));
    let r = releases.clone();
    daemon.set_button_release_callback(move |_| {
        r.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    spnav.push(SpnavEvent::Button { bnum: 0, press: true });
    spnav.push(SpnavEvent::Button { bnum: 0, press: false });
    assert!(wait_until(|| releases.load(Ordering::SeqCst) == 1));
    daemon.close();

    // Assert
    assert!(lines
        .lock()
        .unwrap()
        .iter()
        .any(|line| line == "button press callback panicked: application bug"));
}

#[test]
fn test_spnav_daemon_can_be_reinitialized_after_close() {
    let spnav = FakeSpnav::default();
    let daemon = EventDaemon::new(SpnavBackend::new(spnav.clone()));
    let presses = Arc::new(AtomicUsize::new(0));
    let p = presses.clone();
    daemon.set_button_press_callback(move |_| {
        p.fetch_add(1, Ordering::SeqCst);
    });

    daemon.initialize().expect("first run");
    daemon.close();
    daemon.initialize().expect("second run");
    spnav.push(SpnavEvent::Button { bnum: 1, press: true });

    assert!(wait_until(|| presses.load(Ordering::SeqCst) == 1));
    daemon.close();
}

#[test]
fn test_push_daemon_is_shareable_across_threads() {
    // Arrange
    let daemon = initialize_daemon(MockBackend::new(), LogSink::noop());
    let presses = Arc::new(Mutex::new(Vec::<CanonicalButton>::new()));
    let p = presses.clone();
    daemon.set_button_press_callback(move |e| p.lock().unwrap().push(e.button));

    // Act: the message pump runs on another thread
    let pump = {
        let daemon = daemon.clone();
        thread::spawn(move || {
            daemon.process_message(&RawSample::Buttons(BIT_MENU));
            daemon.process_message(&RawSample::Buttons(BIT_MENU | BIT_ALT));
        })
    };
    pump.join().expect("pump thread");

    // Assert
    assert_eq!(
        *presses.lock().unwrap(),
        vec![CanonicalButton::Menu, CanonicalButton::Alt]
    );
    assert_ne!(CanonicalButton::Menu.as_u8(), CanonicalButton::Alt.as_u8());
}
