//! services/api/tests/gamification_flow.rs
//!
//! End-to-end gamification flows against the production store adapter,
//! exercising the compare-and-swap retry loop under real task concurrency.

use api_lib::adapters::MemoryStore;
use futures::StreamExt;
use pinboard_core::domain::{PinDraft, ProgressEventKind};
use pinboard_core::gamification::{xp, Gamification};
use pinboard_core::progress::ProgressStore;
use std::sync::Arc;

fn draft(user_id: &str, author: &str) -> PinDraft {
    PinDraft {
        url: "https://img.example/x.png".to_string(),
        width: None,
        height: None,
        description: "a pin".to_string(),
        author: author.to_string(),
        user_id: user_id.to_string(),
        tags: Vec::new(),
        sector: Some("Architecture".to_string()),
        ai_description: None,
        link: None,
    }
}

/// Waits for outstanding fire-and-forget log appends.
async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn concurrent_events_for_one_user_lose_no_xp() {
    // Spawned writers race on one progress record; the final XP must be
    // the exact sum of all deltas.
    let progress = ProgressStore::new(Arc::new(MemoryStore::new()));
    let mut handles = Vec::new();
    for _ in 0..10 {
        let progress = progress.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..20 {
                progress
                    .apply_event("u1", ProgressEventKind::Like, xp::LIKE_PIN)
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let record = progress.get("u1").await.unwrap();
    assert_eq!(record.entropy, 200 * xp::LIKE_PIN);
    assert_eq!(record.likes_given, 200);
    // 1000 XP: level 5 and the veteran badge, reached exactly once.
    assert_eq!(record.level, 5);
    assert!(record.badges.contains(&"veteran".to_string()));
    assert!(record.badges.contains(&"supporter".to_string()));
}

#[tokio::test]
async fn concurrent_likes_on_one_pin_both_land() {
    let game = Gamification::new(Arc::new(MemoryStore::new()));
    let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();

    let (a, b) = {
        let game_a = game.clone();
        let game_b = game.clone();
        let pin_a = pin.id.clone();
        let pin_b = pin.id.clone();
        tokio::join!(
            tokio::spawn(async move { game_a.toggle_like(&pin_a, "alice").await.unwrap() }),
            tokio::spawn(async move { game_b.toggle_like(&pin_b, "bob").await.unwrap() }),
        )
    };
    assert!(a.unwrap().is_now_member);
    assert!(b.unwrap().is_now_member);

    let stored = game.pins().get(&pin.id).await.unwrap();
    assert_eq!(stored.like_count, 2);
    assert!(stored.likes.contains_key("alice"));
    assert!(stored.likes.contains_key("bob"));

    // The owner got one cross-credit per like, on top of the publish XP.
    let owner = game.progress().get("owner").await.unwrap();
    assert_eq!(owner.entropy, xp::CREATE_PIN + 2 * xp::RECEIVE_LIKE);
    assert_eq!(owner.likes_given, 0);
}

#[tokio::test]
async fn like_toggle_awards_xp_exactly_once() {
    let game = Gamification::new(Arc::new(MemoryStore::new()));
    let pin = game.publish_pin(draft("owner", "Owner")).await.unwrap();
    let baseline = game.pins().get(&pin.id).await.unwrap().like_count;

    game.toggle_like(&pin.id, "alice").await.unwrap();
    game.toggle_like(&pin.id, "alice").await.unwrap();

    let stored = game.pins().get(&pin.id).await.unwrap();
    assert_eq!(stored.like_count, baseline);
    let alice = game.progress().get("alice").await.unwrap();
    assert_eq!(alice.entropy, xp::LIKE_PIN);
    assert_eq!(alice.likes_given, 1);
}

#[tokio::test]
async fn activity_feed_stays_bounded_under_load() {
    let game = Gamification::new(Arc::new(MemoryStore::new()));
    for i in 0..30 {
        game.publish_pin(draft(&format!("u{i}"), "Author")).await.unwrap();
    }
    settle().await;

    let window = game.activity().recent().await.unwrap();
    assert_eq!(window.len(), 20);
    assert!(window
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
}

#[tokio::test]
async fn feed_subscription_replaces_the_window_on_every_action() {
    let game = Gamification::new(Arc::new(MemoryStore::new()));
    let mut windows = game.activity().subscribe().await.unwrap();
    assert!(windows.next().await.unwrap().is_empty());

    game.publish_pin(draft("u1", "Alice")).await.unwrap();
    let window = windows.next().await.unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].detail, "Sector: Architecture");
}

#[tokio::test]
async fn stats_subscription_tracks_level_ups() {
    let store = Arc::new(MemoryStore::new());
    let game = Gamification::new(store);
    let mut stats = game.progress().subscribe("u1").await.unwrap();
    assert_eq!(stats.next().await.unwrap().level, 1);

    // Two publishes cross the 100 XP threshold.
    game.publish_pin(draft("u1", "Alice")).await.unwrap();
    let after_first = stats.next().await.unwrap();
    assert_eq!(after_first.entropy, xp::CREATE_PIN);
    assert_eq!(after_first.level, 1);

    game.publish_pin(draft("u1", "Alice")).await.unwrap();
    let after_second = stats.next().await.unwrap();
    assert_eq!(after_second.entropy, 2 * xp::CREATE_PIN);
    assert_eq!(after_second.level, 2);
}
