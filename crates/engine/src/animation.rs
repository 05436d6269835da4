use crate::assets::AnimationDesc;

/// Ticks spent in the current animation. Frame selection needs the animation's frame count,
/// which lives in the asset catalog, so the clock stays asset-free and is resolved at draw time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationClock {
    ticks: u32,
}

impl AnimationClock {
    pub fn restart(&mut self) {
        self.ticks = 0;
    }

    pub fn advance(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    pub fn frame_index(&self, animation: &AnimationDesc) -> usize {
        let frame_count = animation.frames.len() as u32;
        if frame_count == 0 {
            return 0;
        }
        let duration = animation.frame_duration.max(1);
        let total = duration * frame_count;
        let tick = if animation.looping {
            self.ticks % total
        } else {
            self.ticks.min(total - 1)
        };
        (tick / duration) as usize
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::assets::SpriteInfo;

    fn animation(frames: usize, frame_duration: u32, looping: bool) -> AnimationDesc {
        AnimationDesc {
            frames: (0..frames)
                .map(|index| SpriteInfo {
                    path: PathBuf::from(format!("{index:02}.png")),
                    width: 8,
                    height: 15,
                })
                .collect(),
            frame_duration,
            looping,
        }
    }

    #[test]
    fn looping_animation_wraps() {
        let run = animation(4, 4, true);
        let mut clock = AnimationClock::default();
        let mut seen = Vec::new();
        for _ in 0..20 {
            seen.push(clock.frame_index(&run));
            clock.advance();
        }
        assert_eq!(&seen[..4], &[0, 0, 0, 0]);
        assert_eq!(seen[4], 1);
        assert_eq!(seen[15], 3);
        assert_eq!(seen[16], 0);
    }

    #[test]
    fn one_shot_animation_holds_last_frame() {
        let burst = animation(3, 2, false);
        let mut clock = AnimationClock::default();
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(clock.frame_index(&burst));
            clock.advance();
        }
        assert_eq!(seen, vec![0, 0, 1, 1, 2, 2]);
        for _ in 0..10 {
            clock.advance();
        }
        assert_eq!(clock.frame_index(&burst), 2);
    }

    #[test]
    fn restart_returns_to_first_frame() {
        let idle = animation(6, 6, true);
        let mut clock = AnimationClock::default();
        for _ in 0..13 {
            clock.advance();
        }
        assert_eq!(clock.frame_index(&idle), 2);
        clock.restart();
        assert_eq!(clock.frame_index(&idle), 0);
    }
}
