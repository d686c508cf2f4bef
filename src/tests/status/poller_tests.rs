use std::sync::Mutex;

use super::*;
use crate::clock::SystemClock;
use crate::model::AuthStatus;
use crate::testing::{ManualClock, MockService};

fn config() -> ClientConfig {
    ClientConfig {
        poll_interval_ms: 5_000,
        poll_tick_ms: 100,
        ..ClientConfig::default()
    }
}

/// Drives the loop on the test thread; an `on_sleep` hook clears `running`.
fn run_until_stopped(poller: &StatusPoller) {
    poller.running.store(true, Ordering::SeqCst);
    poller.run_loop();
}

fn logged_in(svc: &MockService, name: &str) {
    *svc.auth.lock().expect("auth") = AuthStatus {
        logged_in: true,
        username: Some(name.to_string()),
    };
}

#[test]
fn disconnect_clears_login_within_one_cycle() {
    let svc = Arc::new(MockService::new(Default::default()));
    logged_in(&svc, "ada");
    let board = Arc::new(StatusBoard::new());
    let poller = StatusPoller::new(svc.clone(), board.clone(), Arc::new(ManualClock::new()), &config());

    poller.poll_once();
    assert!(board.snapshot().logged_in);
    assert_eq!(board.snapshot().username.as_deref(), Some("ada"));

    svc.reachable.store(false, Ordering::SeqCst);
    poller.poll_once();
    let snap = board.snapshot();
    assert!(!snap.service_reachable);
    assert!(!snap.logged_in);
    assert_eq!(snap.username, None);
    // auth is not probed when health fails
    assert_eq!(svc.calls("auth_status"), 1);
}

#[test]
fn long_usernames_are_truncated() {
    let svc = Arc::new(MockService::new(Default::default()));
    logged_in(&svc, "someone-with-a-very-long-handle");
    let board = Arc::new(StatusBoard::new());
    let poller = StatusPoller::new(svc, board.clone(), Arc::new(ManualClock::new()), &config());
    poller.poll_once();
    assert_eq!(board.snapshot().username.as_deref(), Some("someone-with..."));
}

#[test]
fn panicking_probe_counts_as_unreachable() {
    let svc = Arc::new(MockService::new(Default::default()));
    logged_in(&svc, "ada");
    let board = Arc::new(StatusBoard::new());
    let poller = StatusPoller::new(svc.clone(), board.clone(), Arc::new(ManualClock::new()), &config());
    poller.poll_once();

    svc.panic_on_health.store(true, Ordering::SeqCst);
    let snap = poller.poll_once();
    assert_eq!(snap, StatusSnapshot::unreachable());
    assert_eq!(*board.snapshot(), StatusSnapshot::unreachable());
}

#[test]
fn loop_sleeps_in_ticks_and_stops_within_one_tick() {
    let svc = Arc::new(MockService::new(Default::default()));
    let clock = Arc::new(ManualClock::new());
    let board = Arc::new(StatusBoard::new());
    let poller = StatusPoller::new(svc.clone(), board, clock.clone(), &config());

    let running = Arc::clone(&poller.running);
    clock.on_sleep(move |n| {
        if n == 120 {
            running.store(false, Ordering::SeqCst);
        }
    });
    run_until_stopped(&poller);

    // polls at 0s, 5s, 10s; stop requested at 12s is seen before the next tick
    assert_eq!(svc.calls("health"), 3);
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 120);
}

#[test]
fn zero_tick_still_advances_to_the_next_poll() {
    let svc = Arc::new(MockService::new(Default::default()));
    let clock = Arc::new(ManualClock::new());
    let cfg = ClientConfig {
        poll_interval_ms: 10,
        poll_tick_ms: 0,
        ..ClientConfig::default()
    };
    let poller = StatusPoller::new(svc.clone(), Arc::new(StatusBoard::new()), clock.clone(), &cfg);

    let running = Arc::clone(&poller.running);
    clock.on_sleep(move |n| {
        if n == 25 {
            running.store(false, Ordering::SeqCst);
        }
    });
    run_until_stopped(&poller);

    // tick clamped to 1ms: polls at 0, 10 and 20 ticks
    assert_eq!(svc.calls("health"), 3);
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 25);
}

#[test]
fn refresh_request_cuts_the_sleep_short() {
    let svc = Arc::new(MockService::new(Default::default()));
    let clock = Arc::new(ManualClock::new());
    let poller = StatusPoller::new(svc.clone(), Arc::new(StatusBoard::new()), clock.clone(), &config());

    let running = Arc::clone(&poller.running);
    let refresh = Arc::clone(&poller.refresh);
    clock.on_sleep(move |n| {
        if n == 3 {
            refresh.store(true, Ordering::SeqCst);
        }
        if n == 10 {
            running.store(false, Ordering::SeqCst);
        }
    });
    run_until_stopped(&poller);

    // second poll after 3 ticks instead of 50
    assert_eq!(svc.calls("health"), 2);
    assert_eq!(clock.sleeps.load(Ordering::SeqCst), 10);
}

#[test]
fn spawned_poller_publishes_and_shuts_down_without_join() {
    let svc = Arc::new(MockService::new(Default::default()));
    logged_in(&svc, "ada");
    let cfg = ClientConfig {
        poll_interval_ms: 20,
        poll_tick_ms: 5,
        ..ClientConfig::default()
    };
    let poller = StatusPoller::new(svc.clone(), Arc::new(StatusBoard::new()), Arc::new(SystemClock), &cfg);
    let mut handle = poller.spawn().expect("spawn");

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while !handle.snapshot().logged_in {
        assert!(std::time::Instant::now() < deadline, "poller never published");
        std::thread::sleep(Duration::from_millis(5));
    }

    handle.shutdown();
    assert!(!handle.is_running());
    std::thread::sleep(Duration::from_millis(100));
    let after_stop = svc.calls("health");
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(svc.calls("health"), after_stop);
}

#[test]
fn readers_only_observe_whole_snapshots() {
    let board = Arc::new(StatusBoard::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let writer = {
        let board = Arc::clone(&board);
        std::thread::spawn(move || {
            for i in 0..500 {
                if i % 2 == 0 {
                    board.publish(StatusSnapshot::unreachable());
                } else {
                    board.publish(StatusSnapshot {
                        service_reachable: true,
                        logged_in: true,
                        username: Some("ada".into()),
                    });
                }
            }
        })
    };
    for _ in 0..500 {
        let snap = board.snapshot();
        seen.lock().expect("seen").push(snap);
    }
    writer.join().expect("writer");
    for snap in seen.lock().expect("seen").iter() {
        assert_eq!(snap.logged_in, snap.username.is_some());
        if snap.logged_in {
            assert!(snap.service_reachable);
        }
    }
}
