//! Sample App: scripted walk through the category manager.
//!
//! Attaches one asset per category, plays BGM with a fade-in, fires an SE
//! with a completion callback and a voice line, pauses and resumes the BGM,
//! adjusts volumes, then fades everything out and detaches.
//!
//! Run with `RUST_LOG=info cargo run -p rf-voice --example sample_app`.

use rf_voice::{
    AudioAsset, AudioCategory, AudioManager, ClipId, FadeCurve, HeadlessBackend, ManagerConfig,
    ParamTable, PlayParams, VoiceResult,
};

const FRAME: f32 = 1.0 / 60.0;

const CONFIG_JSON: &str = r#"{
    "master_volume_param": "MasterVolume",
    "bgm":   { "resource_max": 2,  "pool_size": 2, "simultaneous_play_max": 1, "volume_param_name": "BgmVolume" },
    "se":    { "resource_max": 16, "pool_size": 8, "simultaneous_play_max": 4, "volume_param_name": "SeVolume" },
    "voice": { "resource_max": 4,  "pool_size": 1, "simultaneous_play_max": 1, "volume_param_name": "VoiceVolume" }
}"#;

fn run_seconds(manager: &mut AudioManager<HeadlessBackend, ParamTable>, secs: f32) {
    let frames = (secs / FRAME).round() as usize;
    for _ in 0..frames {
        for category in AudioCategory::ALL {
            manager.player_mut(category).backend_mut().advance(FRAME);
        }
        manager.tick(FRAME);
    }
}

fn main() -> VoiceResult<()> {
    env_logger::init();

    let mixer = ParamTable::new()
        .with_param("MasterVolume", 0.0)
        .with_param("BgmVolume", 0.0)
        .with_param("SeVolume", 0.0)
        .with_param("VoiceVolume", 0.0);

    let mut manager = AudioManager::new(ManagerConfig::from_json(CONFIG_JSON)?, mixer, |category| {
        let backend = HeadlessBackend::new();
        match category {
            AudioCategory::Bgm => backend.with_clip_length(ClipId(100), 30.0),
            AudioCategory::Se => backend.with_clip_length(ClipId(200), 0.4),
            AudioCategory::Voice => backend.with_clip_length(ClipId(300), 2.5),
        }
    })?;

    let bgm = manager.bgm().register(
        AudioAsset::new("bgm")
            .with_clip(ClipId(100))
            .with_fade_in(FadeCurve::SCurve)
            .with_fade_out(FadeCurve::Sine),
    )?;
    let se = manager.se().register(AudioAsset::new("se").with_clip(ClipId(200)))?;
    let voice = manager.voice().register(AudioAsset::new("voice").with_clip(ClipId(300)))?;

    // BGM with a 10 second fade-in
    let bgm_handle = bgm.play(manager.bgm(), 0, true, 10.0, 1.0);
    log::info!("BGM started: {:?}", bgm_handle);

    let se_handle = se.play_with(
        manager.se(),
        PlayParams::new(0).on_ended(|handle| log::info!("SE {} ended", handle)),
    );
    log::info!("SE started: {:?}", se_handle);

    let voice_handle = voice.play(manager.voice(), 0, false, 0.0, 1.0);
    run_seconds(&mut manager, 1.0);
    log::info!(
        "after 1s: bgm={:?} se={:?} voice={:?}",
        manager.player(AudioCategory::Bgm).state(bgm_handle),
        manager.player(AudioCategory::Se).state(se_handle),
        manager.player(AudioCategory::Voice).state(voice_handle)
    );

    bgm.pause(manager.bgm(), bgm_handle);
    run_seconds(&mut manager, 0.5);
    log::info!("BGM paused: {}", bgm.is_paused(manager.player(AudioCategory::Bgm), bgm_handle));
    bgm.unpause(manager.bgm(), bgm_handle);

    manager.set_master_volume(0.8);
    manager.set_volume(AudioCategory::Bgm, 0.5);
    log::info!(
        "volumes: master={:.2} bgm={:.2} se={:.2}",
        manager.master_volume(),
        manager.volume(AudioCategory::Bgm),
        manager.volume(AudioCategory::Se)
    );

    manager.stop_all(2.0);
    run_seconds(&mut manager, 2.5);
    for category in AudioCategory::ALL {
        log::info!("{:?}: {:?}", category, manager.player(category).stats());
    }

    manager.detach_bgm(bgm);
    manager.detach_se(se);
    manager.detach_voice(voice);
    Ok(())
}
