use crate::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Jump,
    Dash,
    Hit,
    Shoot,
}

impl SoundCue {
    pub fn name(self) -> &'static str {
        match self {
            SoundCue::Jump => "jump",
            SoundCue::Dash => "dash",
            SoundCue::Hit => "hit",
            SoundCue::Shoot => "shoot",
        }
    }
}

/// Audio trigger consumer. Playback is fire-and-forget.
pub trait SoundSink {
    fn play(&mut self, cue: SoundCue);
}

impl SoundSink for Vec<SoundCue> {
    fn play(&mut self, cue: SoundCue) {
        self.push(cue);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MuteSound;

impl SoundSink for MuteSound {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Entities a behavior wants added to the world; drained by the owning level after the tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SpawnRequest {
    Projectile { pos: Vec2, velocity_x: f32 },
}
