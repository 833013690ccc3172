//! Registry tests
//!
//! Lookup, disconnect and shutdown semantics, plus races between host
//! threads on the same user.

mod common;

use common::{song, Harness};
use musicbox_core::{MusicBoxError, UserId};
use musicbox_playback::PlaybackStatus;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn get_never_creates() {
    let h = Harness::new();
    let user = UserId::new("steve");

    assert!(h.registry.get(&user).is_none());
    assert!(h.registry.is_empty());
    assert_eq!(h.store.loads.load(Ordering::SeqCst), 0);
}

#[test]
fn get_or_create_returns_same_instance() {
    let h = Harness::new();
    let user = UserId::new("steve");

    let first = h.registry.get_or_create(&user).unwrap();
    let second = h.registry.get_or_create(&user).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &h.registry.get(&user).unwrap()));
    assert_eq!(h.registry.len(), 1);
    assert_eq!(h.store.loads.load(Ordering::SeqCst), 1);
}

#[test]
fn disconnect_without_session_is_a_no_op() {
    let h = Harness::new();

    assert!(!h.registry.disconnect(&UserId::new("ghost")).unwrap());
    assert_eq!(h.store.saves(), 0);
}

#[test]
fn disconnect_removes_entry_even_when_save_fails() {
    let h = Harness::new();
    let user = UserId::new("steve");
    let session = h.registry.get_or_create(&user).unwrap();
    h.store.fail_saves.store(true, Ordering::SeqCst);

    let result = h.registry.disconnect(&user);

    assert!(matches!(result, Err(MusicBoxError::Storage(_))));
    assert!(h.registry.get(&user).is_none());
    assert!(session.is_closed());
}

#[test]
fn reconnect_gets_fresh_session_with_saved_config() {
    let h = Harness::new();
    let user = UserId::new("steve");
    let old = h.registry.get_or_create(&user).unwrap();
    old.with_config_mut(|config| config.set("plays", 3)).unwrap();
    old.switch_mode().unwrap();
    h.registry.disconnect(&user).unwrap();

    let new = h.registry.get_or_create(&user).unwrap();

    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(new.with_config(|config| config.get::<u32>("plays")), Some(3));
    // The speaker flag lives in memory only
    assert!(!new.is_speaker());
}

#[test]
fn destroy_removes_session_from_registry() {
    let h = Harness::new();
    let user = UserId::new("steve");
    let session = h.registry.get_or_create(&user).unwrap();
    session.play(song("a", 100), None).unwrap();

    session.destroy().unwrap();

    assert!(h.registry.get(&user).is_none());
    assert_eq!(h.registry.len(), 0);
    assert!(h.registry.users().is_empty());
    assert_eq!(h.store.saves(), 1);
}

#[test]
fn destroying_a_stale_session_keeps_the_newer_one() {
    let h = Harness::new();
    let user = UserId::new("steve");
    let old = h.registry.get_or_create(&user).unwrap();
    h.registry.disconnect(&user).unwrap();
    let new = h.registry.get_or_create(&user).unwrap();

    old.destroy().unwrap();

    assert!(Arc::ptr_eq(&h.registry.get(&user).unwrap(), &new));
    assert!(!new.is_closed());
    assert_eq!(h.store.saves(), 1);
}

#[test]
fn destroy_after_registry_is_gone_still_saves() {
    let h = Harness::new();
    let session = h.registry.get_or_create(&UserId::new("steve")).unwrap();
    let Harness {
        registry, store, ..
    } = h;
    drop(registry);

    session.destroy().unwrap();

    assert!(session.is_closed());
    assert_eq!(store.saves(), 1);
}

#[test]
fn destroy_all_destroys_each_session_once() {
    let h = Harness::new();
    let users: Vec<_> = ["alex", "steve", "herobrine"]
        .into_iter()
        .map(UserId::new)
        .collect();
    let sessions: Vec<_> = users
        .iter()
        .map(|user| h.registry.get_or_create(user).unwrap())
        .collect();
    for session in &sessions {
        session.play(song("a", 100), None).unwrap();
    }

    let destroyed = h.registry.destroy_all().unwrap();

    assert_eq!(destroyed, 3);
    assert!(h.registry.is_empty());
    assert_eq!(h.store.saves(), 3);
    assert_eq!(h.players.stats.live(), 0);
    for index in 0..3 {
        assert_eq!(h.indicators.view(index).detach_calls, 1);
    }
    assert!(sessions.iter().all(|session| session.is_closed()));

    // A second sweep finds nothing
    assert_eq!(h.registry.destroy_all().unwrap(), 0);
    assert_eq!(h.store.saves(), 3);
}

#[test]
fn destroy_all_reports_failure_after_processing_everyone() {
    let h = Harness::new();
    for name in ["alex", "steve"] {
        h.registry.get_or_create(&UserId::new(name)).unwrap();
    }
    h.store.fail_saves.store(true, Ordering::SeqCst);

    assert!(h.registry.destroy_all().is_err());
    assert!(h.registry.is_empty());
    assert_eq!(h.store.saves(), 2);
}

#[test]
fn advance_all_counts_playing_sessions() {
    let h = Harness::new();
    let playing = h.registry.get_or_create(&UserId::new("alex")).unwrap();
    h.registry.get_or_create(&UserId::new("steve")).unwrap();
    playing.play(song("a", 100), None).unwrap();

    assert_eq!(h.registry.advance_all(), 1);
    assert_eq!(playing.current_tick(), Some(1));
}

#[test]
fn users_are_sorted() {
    let h = Harness::new();
    for name in ["steve", "alex"] {
        h.registry.get_or_create(&UserId::new(name)).unwrap();
    }

    assert_eq!(
        h.registry.users(),
        vec![UserId::new("alex"), UserId::new("steve")]
    );
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[test]
fn concurrent_get_or_create_yields_one_session() {
    let h = Arc::new(Harness::new());
    let user = UserId::new("steve");
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let h = Arc::clone(&h);
            let user = user.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                h.registry.get_or_create(&user).unwrap()
            })
        })
        .collect();

    let sessions: Vec<_> = handles.into_iter().map(|t| t.join().unwrap()).collect();

    assert!(sessions.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(h.store.loads.load(Ordering::SeqCst), 1);
    assert_eq!(h.indicators.count(), 1);
}

#[test]
fn racing_play_switch_and_tick_never_overlap_engines() {
    let h = Arc::new(Harness::new());
    let user = UserId::new("steve");
    let session = h.registry.get_or_create(&user).unwrap();
    let barrier = Arc::new(Barrier::new(3));

    let player = {
        let session = Arc::clone(&session);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..200 {
                session.play(song(&i.to_string(), 1_000), None).unwrap();
            }
        })
    };
    let switcher = {
        let session = Arc::clone(&session);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..200 {
                session.switch_mode().unwrap();
            }
        })
    };
    let ticker = {
        let session = Arc::clone(&session);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for _ in 0..500 {
                session.advance();
            }
        })
    };

    player.join().unwrap();
    switcher.join().unwrap();
    ticker.join().unwrap();

    assert_eq!(h.players.max_live_for(&user), 1);
    assert_eq!(h.players.stats.live(), 1);

    h.registry.disconnect(&user).unwrap();
    assert_eq!(h.players.stats.live(), 0);
    assert_eq!(h.players.stats.started(), h.players.stats.stopped());
}

#[test]
fn disconnect_racing_play_leaves_nothing_running() {
    for _ in 0..50 {
        let h = Arc::new(Harness::new());
        let user = UserId::new("steve");
        let session = h.registry.get_or_create(&user).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let player = {
            let session = Arc::clone(&session);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..20 {
                    // Fails with SessionClosed once the disconnect won
                    let _ = session.play(song("a", 100), None);
                }
            })
        };

        barrier.wait();
        h.registry.disconnect(&user).unwrap();
        player.join().unwrap();

        assert!(session.is_closed());
        assert_eq!(session.status(), PlaybackStatus::Idle);
        assert_eq!(h.players.stats.live(), 0);
    }
}

#[test]
fn reconnect_racing_disconnect_sees_saved_config() {
    for _ in 0..50 {
        let h = Arc::new(Harness::new());
        let user = UserId::new("steve");
        let session = h.registry.get_or_create(&user).unwrap();
        session
            .with_config_mut(|config| config.set("plays", 1))
            .unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let reconnect = {
            let h = Arc::clone(&h);
            let user = user.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Either the old session or a new one loaded after the save
                let session = h.registry.get_or_create(&user).unwrap();
                session.with_config(|config| config.get::<u32>("plays"))
            })
        };

        barrier.wait();
        h.registry.disconnect(&user).unwrap();
        let seen = reconnect.join().unwrap();

        assert_eq!(seen, Some(1));
        h.registry.destroy_all().unwrap();
        assert_eq!(
            h.store.record(&user).unwrap().get::<u32>("plays"),
            Some(1)
        );
    }
}

#[test]
fn destroy_all_racing_creation_leaves_consistent_registry() {
    let h = Arc::new(Harness::new());
    let barrier = Arc::new(Barrier::new(5));

    let creators: Vec<_> = (0..4)
        .map(|i| {
            let h = Arc::clone(&h);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for j in 0..25 {
                    let user = UserId::new(format!("user-{}-{}", i, j));
                    let session = h.registry.get_or_create(&user).unwrap();
                    let _ = session.play(song("a", 100), None);
                }
            })
        })
        .collect();

    barrier.wait();
    let mut destroyed = h.registry.destroy_all().unwrap();
    for creator in creators {
        creator.join().unwrap();
    }
    destroyed += h.registry.destroy_all().unwrap();

    assert_eq!(destroyed, 100);
    assert_eq!(h.store.saves(), 100);
    assert!(h.registry.is_empty());
    assert_eq!(h.players.stats.live(), 0);
}
