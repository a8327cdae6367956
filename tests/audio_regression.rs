use std::f32::consts::FRAC_PI_4;

use saavy_console::fx::EffectSlot;
use saavy_console::io::VecSink;
use saavy_console::{Bus, ChannelSource, ConsoleEngine, EngineConfig, FxParameter, MixingConsole};

fn noise_sources(channels: usize) -> Vec<Box<dyn ChannelSource>> {
    (0..channels)
        .map(|ch| {
            let mut state = 0x9e37_79b9u32.wrapping_mul(ch as u32 + 1);
            Box::new(move |out: &mut [f32]| {
                for s in out.iter_mut() {
                    state ^= state << 13;
                    state ^= state >> 17;
                    state ^= state << 5;
                    *s = (state as f32 / u32::MAX as f32) * 0.5 - 0.25;
                }
            }) as Box<dyn ChannelSource>
        })
        .collect()
}

#[test]
fn centre_pan_splits_power_equally() {
    let mut console = MixingConsole::new(48_000.0, 128, 1).unwrap();
    console.set_channel_level(0, 1.0);
    console.set_pan(0, 0.5);
    console.set_send_level(0, Bus::MainOutput, 1.0);
    console.slot_mut(Bus::MainOutput).set_bypass(true);

    for len in [1usize, 37, 128] {
        let input: Vec<f32> = (0..len).map(|i| ((i as f32) * 0.3).sin()).collect();
        console.pre_process_input_sample_buffer(0, Some(input.as_slice()), len);
        let mut left = vec![0.0; len];
        let mut right = vec![0.0; len];
        assert_eq!(console.process(&mut left, &mut right), len);

        for i in 0..len {
            assert!((left[i] - input[i] * FRAC_PI_4.cos()).abs() < 1e-6);
            assert!((right[i] - input[i] * FRAC_PI_4.sin()).abs() < 1e-6);
        }
    }
}

#[test]
fn constant_power_law_holds_across_pan() {
    let mut console = MixingConsole::new(48_000.0, 16, 1).unwrap();
    for level in [0.0, 0.25, 1.0] {
        console.set_channel_level(0, level);
        for step in 0..=20 {
            console.set_pan(0, step as f32 / 20.0);
            let (l, r) = console.channel_gains(0);
            assert!((l * l + r * r - level * level).abs() < 1e-5);
            if level == 0.0 {
                assert_eq!((l, r), (0.0, 0.0));
            }
        }
    }
}

#[test]
fn parallel_cores_do_not_change_the_mix() {
    let base = EngineConfig::default().with_channels(4).with_chunk_size(64);
    let mut single = ConsoleEngine::new(base.clone(), noise_sources(4)).unwrap();
    let mut dual = ConsoleEngine::new(base.with_cores(2), noise_sources(4)).unwrap();

    for engine in [&single, &dual] {
        let control = engine.control();
        for ch in 0..4 {
            control.set_pan(ch, (ch * 40) as i32);
            control.set_send_level(ch, Bus::Delay, 50);
            control.set_send_level(ch, Bus::PlateReverb, 30);
        }
        control.set_return_level(Bus::Delay, Bus::MainOutput, 80);
        control.set_return_level(Bus::PlateReverb, Bus::MainOutput, 60);
        control.set_return_level(Bus::Delay, Bus::PlateReverb, 40);
    }

    for frames in [64, 64, 13, 64] {
        let a = single.render(frames).to_vec();
        let b = dual.render(frames).to_vec();
        assert_eq!(a, b);
    }
}

#[test]
fn full_patch_stays_bounded_and_finite() {
    let config = EngineConfig::default().with_channels(8).with_chunk_size(256).with_cores(2);
    let mut engine = ConsoleEngine::new(config, noise_sources(8)).unwrap();
    let control = engine.control();
    for ch in 0..8 {
        for bus in Bus::FX {
            control.set_send_level(ch, bus, 40);
        }
    }
    for from in Bus::FX {
        control.set_return_level(from, Bus::MainOutput, 60);
    }
    control.set_return_level(Bus::Chorus, Bus::Delay, 30);
    control.set_return_level(Bus::Delay, Bus::PlateReverb, 40);
    control.set_parameter(FxParameter::DelayFeedback, 99);
    control.set_parameter(FxParameter::ReverberatorTime, 99);

    let mut sink = VecSink::new();
    for _ in 0..200 {
        assert_eq!(engine.process_chunk(256, &mut sink), 256);
    }
    assert_eq!(engine.dropped_chunks(), 0);
    assert_eq!(sink.samples().len(), 200 * 256 * 2);

    let tail = engine.render(256);
    assert!(tail.iter().all(|s| s.is_finite()));
}

#[test]
fn self_sends_never_stick() {
    let mut console = MixingConsole::new(48_000.0, 16, 2).unwrap();
    for bus in Bus::FX {
        console.set_fx_send_level(bus, bus, 0.9);
        assert_eq!(console.fx_send_level(bus, bus), 0.0);
    }
}

#[test]
fn full_sink_drops_chunk_without_retry() {
    let config = EngineConfig::default().with_channels(2).with_chunk_size(32);
    let mut engine = ConsoleEngine::new(config, noise_sources(2)).unwrap();
    let mut sink = VecSink::with_capacity_limit(100);

    assert_eq!(engine.process_chunk(32, &mut sink), 32);
    assert_eq!(engine.process_chunk(32, &mut sink), 0);
    assert_eq!(engine.process_chunk(32, &mut sink), 0);
    assert_eq!(engine.dropped_chunks(), 2);
    assert_eq!(sink.samples().len(), 64);
}

#[test]
fn effect_return_arrives_one_sample_late() {
    let mut console = MixingConsole::new(48_000.0, 8, 1).unwrap();
    console.set_channel_level(0, 1.0);
    console.set_pan(0, 0.0);
    console.set_send_level(0, Bus::Tube, 1.0);
    console.set_fx_send_level(Bus::Tube, Bus::MainOutput, 1.0);
    console.slot_mut(Bus::Tube).set_bypass(true);

    let mut impulse = [0.0f32; 8];
    impulse[0] = 1.0;
    console.pre_process_input_sample_buffer(0, Some(&impulse[..]), 8);
    let mut left = [0.0; 8];
    let mut right = [0.0; 8];
    console.process(&mut left, &mut right);

    assert_eq!(left, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn muted_bus_returns_silence() {
    let config = EngineConfig::default().with_channels(1).with_chunk_size(64);
    let mut engine = ConsoleEngine::new(config, noise_sources(1)).unwrap();
    let control = engine.control();
    control.set_send_level(0, Bus::MainOutput, 0);
    control.set_send_level(0, Bus::Chorus, 99);
    control.set_return_level(Bus::Chorus, Bus::MainOutput, 99);
    control.set_parameter(FxParameter::ChorusEnable, 0);

    for _ in 0..10 {
        assert!(engine.render(64).iter().all(|&s| s == 0.0));
    }
}
