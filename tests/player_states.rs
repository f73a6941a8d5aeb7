use inkframe::{
    PlayState, Player, RenderSettings, StyleMode, create_backend, render_frame, scene_from_json,
};

fn growing_circle() -> inkframe::Scene {
    scene_from_json(
        r##"{"id":"growth","duration":2000,"layers":[
            {"id":"cell","type":"circle","props":{"x":64,"y":64,"r":10,"fill":"#06c"},
             "animations":[{"property":"r","from":10,"to":50,"start":0,"end":2000}]}
        ]}"##,
    )
    .unwrap()
}

#[test]
fn scheduler_drives_a_full_playback() {
    let mut player = Player::new();
    player.load(growing_circle()).unwrap();
    player.play().unwrap();

    // Host timestamps at a coarse 250ms cadence; progress must be clamped
    // and monotonic, and the player must stop requesting ticks at 1.
    let mut now = 100_000.0;
    let mut prev_progress = -1.0;
    let mut ticks = 0;
    loop {
        let tick = player.tick(now);
        assert!(tick.progress >= prev_progress);
        assert!((0.0..=1.0).contains(&tick.progress));
        prev_progress = tick.progress;
        ticks += 1;
        if !tick.request_next {
            break;
        }
        now += 250.0;
        assert!(ticks < 100, "scheduler never finished");
    }
    assert_eq!(player.state(), PlayState::Finished);
    assert_eq!(prev_progress, 1.0);
}

#[test]
fn finished_player_renders_the_final_frame() {
    let mut player = Player::new();
    player.load(growing_circle()).unwrap();
    player.play().unwrap();
    player.tick(0.0);
    player.tick(10_000.0);
    assert_eq!(player.state(), PlayState::Finished);
    assert_eq!(player.elapsed_ms(), 2000.0);

    let settings = RenderSettings {
        width: 128,
        height: 128,
        mode: StyleMode::Rich,
        ..RenderSettings::default()
    };
    let scene = player.scene().unwrap();
    let mut backend = create_backend().unwrap();
    let frame = render_frame(scene, player.elapsed_ms(), &settings, backend.as_mut()).unwrap();

    // At the final frame the circle has grown to r=50; far more pixels are
    // inked than at the start.
    let count_ink = |data: &[u8]| {
        data.chunks_exact(4)
            .filter(|px| *px != [255u8, 255, 255, 255])
            .count()
    };
    let first = render_frame(scene, 0.0, &settings, backend.as_mut()).unwrap();
    assert!(count_ink(&frame.data) > count_ink(&first.data) * 4);
}

#[test]
fn pause_requests_no_ticks_and_keeps_the_frame() {
    let mut player = Player::new();
    player.load(growing_circle()).unwrap();
    player.play().unwrap();
    player.tick(0.0);
    let before = player.tick(800.0);
    player.pause();

    let during = player.tick(1_000_000.0);
    assert_eq!(during.elapsed_ms, before.elapsed_ms);
    assert!(!during.request_next);
    assert_eq!(player.state(), PlayState::Paused);
}

#[test]
fn loading_a_new_scene_resets_playback() {
    let mut player = Player::new();
    player.load(growing_circle()).unwrap();
    player.play().unwrap();
    player.tick(0.0);
    player.tick(1000.0);

    player.load(growing_circle()).unwrap();
    assert_eq!(player.state(), PlayState::Idle);
    assert_eq!(player.elapsed_ms(), 0.0);
    let tick = player.tick(2000.0);
    assert!(!tick.request_next);
}
