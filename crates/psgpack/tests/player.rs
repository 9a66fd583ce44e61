mod common;

use psgpack::chip::{Register, RegisterState, RegisterWrite};
use psgpack::codec::{EncoderConfig, Player, encode};
use psgpack::event::EventLog;

use common::{NTSC, play_ticks, quantized_timeline, tune};

#[test]
fn test_playback_matches_quantized_log() {
    let log = tune();
    let encoded = encode(&log, EncoderConfig::default()).unwrap();
    let timeline = quantized_timeline(&log, NTSC);

    let mut player = Player::new(&encoded.artifact);
    let mut state = RegisterState::new();
    for (tick, expected) in timeline.iter().enumerate() {
        player.tick(&mut state);
        assert_eq!(&state, expected, "register state differs at tick {}", tick);
    }
    assert_eq!(player.loops(), 1);
}

#[test]
fn test_loop_replays_from_requested_tick() {
    let base = tune();
    let pass = (base.total_samples() / u64::from(NTSC)) as usize;
    let mut looped_inside_reference = 0;

    // every tick, including ticks in the middle of multi-tick waits
    for loop_tick in 0..pass {
        let mut log = base.clone();
        log.set_loop_at_sample(loop_tick as u64 * u64::from(NTSC));
        let encoded = encode(&log, EncoderConfig::default()).unwrap();

        let loop_point = encoded.artifact.loop_point;
        if loop_point.inner + 1 != loop_point.outer {
            looped_inside_reference += 1;
        }

        let body = pass - loop_tick;
        let ticks = play_ticks(&encoded.artifact, pass + 2 * body);
        for (tick, writes) in ticks.iter().enumerate().skip(pass) {
            let first_pass = loop_tick + (tick - pass) % body;
            assert_eq!(
                writes, &ticks[first_pass],
                "loop at tick {}: tick {} should replay tick {}",
                loop_tick, tick, first_pass
            );
        }
    }

    assert!(looped_inside_reference > 0);
}

#[test]
fn test_loop_between_waits_keeps_loop_length() {
    let mut log = EventLog::new();
    log.push_write(Register::Volume0, 0x1);
    log.push_wait(3 * NTSC);
    log.mark_loop();
    log.push_wait(NTSC);
    log.push_write(Register::Volume0, 0x2);
    log.push_wait(NTSC);

    let encoded = encode(&log, EncoderConfig::default()).unwrap();
    let ticks = play_ticks(&encoded.artifact, 9);
    let volume2 = vec![RegisterWrite::new(Register::Volume0, 0x2)];
    // ticks 3-4 are the loop body: one silent tick, then vol0=2
    for body_start in [3, 5, 7] {
        assert!(ticks[body_start].is_empty(), "tick {}", body_start);
        assert_eq!(ticks[body_start + 1], volume2, "tick {}", body_start + 1);
    }
}

#[test]
fn test_trailing_repeat_plays_in_full() {
    let mut log = EventLog::new();
    for volume in [1, 2, 3, 4, 1, 2, 3, 4] {
        log.push_write(Register::Volume0, volume);
        log.push_wait(NTSC);
    }
    let encoded = encode(&log, EncoderConfig::default()).unwrap();
    let last = *encoded.artifact.index_table.last().unwrap();
    assert_eq!(last & 0x8000, 0);

    let mut player = Player::new(&encoded.artifact);
    let mut state = RegisterState::new();
    let mut volumes = Vec::new();
    for _ in 0..16 {
        player.tick(&mut state);
        volumes.push(state.get(Register::Volume0));
    }
    assert_eq!(volumes, [1, 2, 3, 4].repeat(4));
}

#[test]
fn test_loop_past_end_restarts_from_the_top() {
    let mut log = tune();
    log.mark_loop();
    let encoded = encode(&log, EncoderConfig::default()).unwrap();
    assert_eq!(encoded.loop_offset, encoded.index_words.len());
    assert_eq!(encoded.artifact.loop_point, Default::default());

    let pass: usize = encoded.index_words.iter().map(|w| w.delay() as usize).sum();
    let ticks = play_ticks(&encoded.artifact, pass * 2);
    assert_eq!(ticks[..pass], ticks[pass..]);
}

#[test]
fn test_run_counts_loops() {
    let log = tune();
    let encoded = encode(&log, EncoderConfig::default()).unwrap();
    let pass = log.total_samples() / u64::from(NTSC);

    let mut player = Player::new(&encoded.artifact);
    let mut state = RegisterState::new();
    player.run(pass * 3, &mut state);
    assert_eq!(player.ticks(), pass * 3);
    assert_eq!(player.loops(), 3);

    player.reset();
    assert_eq!(player.ticks(), 0);
    assert_eq!(player.loops(), 0);
}
