use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use render_integration::{BoardLayout, HeadlessRenderer, SlotRenderer};
use rotator_core::{Phase, Rotator, RotatorConfig};
use shared::{
    domain::{Mode, SlotIndex, TimingMode, WordIndex},
    protocol::RotatorEvent,
};
use tokio::{sync::broadcast, time::Instant};

/// A board whose flaps jam on the first flip and never report back.
struct JammedRenderer;

#[async_trait]
impl SlotRenderer for JammedRenderer {
    async fn prepare_board(&self, _layout: &BoardLayout) {}

    async fn set_slot_visual(&self, _slot: SlotIndex, _resting: char, _incoming: char) {}

    async fn play_transition(&self, _slot: SlotIndex, _duration: Duration) -> anyhow::Result<()> {
        std::future::pending::<()>().await;
        Ok(())
    }

    async fn slide_to_word(
        &self,
        _from: WordIndex,
        _to: WordIndex,
        _duration: Duration,
    ) -> anyhow::Result<()> {
        Ok(())
    }
}

fn cat_dog(timing_mode: TimingMode) -> RotatorConfig {
    RotatorConfig {
        words: vec!["cat".to_string(), "dog".to_string()],
        mode: Mode::Flip,
        timing_mode,
        ..RotatorConfig::default()
    }
}

async fn collect_until_settled(
    rx: &mut broadcast::Receiver<RotatorEvent>,
    word_index: WordIndex,
) -> Vec<RotatorEvent> {
    let mut events = Vec::new();
    loop {
        let event = rx.recv().await.expect("event stream open");
        let done = event == RotatorEvent::Rotated {
            word_index,
            settled: true,
        };
        events.push(event);
        if done {
            return events;
        }
    }
}

#[tokio::test(start_paused = true)]
async fn flip_board_cycles_cat_dog_cat() {
    let renderer = Arc::new(HeadlessRenderer::new());
    let rotator = Rotator::new(cat_dog(TimingMode::Pause), renderer.clone())
        .await
        .expect("rotator");
    let mut rx = rotator.subscribe_events();
    assert_eq!(renderer.resting_text().await, "CAT");

    let started = Instant::now();
    rotator.start().await;

    let to_dog = collect_until_settled(&mut rx, WordIndex(1)).await;
    assert_eq!(
        to_dog.first(),
        Some(&RotatorEvent::Rotated {
            word_index: WordIndex(1),
            settled: false
        })
    );
    let landed: Vec<(SlotIndex, char, bool)> = (0..3)
        .map(SlotIndex)
        .map(|slot| {
            to_dog
                .iter()
                .rev()
                .find_map(|event| match event {
                    RotatorEvent::LetterLanded {
                        slot: landed_slot,
                        letter,
                        accent,
                        ..
                    } if *landed_slot == slot => Some((slot, *letter, *accent)),
                    _ => None,
                })
                .expect("slot landed")
        })
        .collect();
    assert_eq!(
        landed,
        vec![
            (SlotIndex(0), 'D', false),
            (SlotIndex(1), 'O', false),
            (SlotIndex(2), 'G', false),
        ]
    );
    assert_eq!(renderer.resting_text().await, "DOG");
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(3600) && elapsed < Duration::from_millis(3605),
        "settled at {elapsed:?}"
    );

    // The C leaves from the accent position, so it goes the long way round to D.
    assert_eq!(renderer.steps_for(SlotIndex(0)).await.len(), 5);
    let snapshot = rotator.snapshot().await;
    assert_eq!(snapshot.current, WordIndex(1));
    assert_eq!(snapshot.phase, Phase::Waiting);

    collect_until_settled(&mut rx, WordIndex(0)).await;
    assert_eq!(renderer.resting_text().await, "CAT");

    rotator.destroy().await;
}

#[tokio::test(start_paused = true)]
async fn jammed_flap_holds_rotation_under_pause_timing() {
    let rotator = Rotator::new(cat_dog(TimingMode::Pause), Arc::new(JammedRenderer))
        .await
        .expect("rotator");
    let mut rx = rotator.subscribe_events();
    rotator.start().await;

    let first = rx.recv().await.expect("event");
    assert_eq!(
        first,
        RotatorEvent::Rotated {
            word_index: WordIndex(1),
            settled: false
        }
    );

    tokio::time::sleep(Duration::from_secs(60)).await;
    let snapshot = rotator.snapshot().await;
    assert_eq!(snapshot.phase, Phase::Animating);
    assert_eq!(snapshot.current, WordIndex(1));
    assert!(snapshot.active_session.is_some());
}

#[tokio::test(start_paused = true)]
async fn jammed_flap_does_not_hold_fixed_timing() {
    let rotator = Rotator::new(cat_dog(TimingMode::Fixed), Arc::new(JammedRenderer))
        .await
        .expect("rotator");
    let mut rx = rotator.subscribe_events();
    rotator.start().await;

    let mut rotations = Vec::new();
    while rotations.len() < 3 {
        if let RotatorEvent::Rotated {
            word_index,
            settled,
        } = rx.recv().await.expect("event")
        {
            assert!(!settled);
            rotations.push(word_index);
        }
    }
    assert_eq!(rotations, vec![WordIndex(1), WordIndex(0), WordIndex(1)]);

    rotator.destroy().await;
}

#[tokio::test(start_paused = true)]
async fn events_serialize_as_tagged_json() {
    let renderer = Arc::new(HeadlessRenderer::new());
    let rotator = Rotator::new(cat_dog(TimingMode::Pause), renderer)
        .await
        .expect("rotator");
    let mut rx = rotator.subscribe_events();
    rotator.start().await;

    let event = rx.recv().await.expect("event");
    let json = serde_json::to_value(&event).expect("json");
    assert_eq!(json["type"], "rotated");
    assert_eq!(json["payload"]["word_index"], 1);
    assert_eq!(json["payload"]["settled"], false);

    rotator.destroy().await;
}
