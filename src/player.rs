//! Playback state machine.
//!
//! The player owns no clock. The host feeds it monotonic timestamps (one per
//! display tick) and the player turns them into clamped progress through the
//! loaded scene, reporting whether another tick should be scheduled. Actual
//! frame rendering stays outside; the player is pure bookkeeping and easy to
//! drive from tests.

use crate::{
    error::{InkframeError, InkframeResult},
    scene::Scene,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Idle,
    Playing,
    Paused,
    /// Reached progress 1. The last frame stays on the surface; `play`
    /// starts over from zero.
    Finished,
}

/// Result of advancing the clock once.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    /// Elapsed scene time in milliseconds, clamped to the duration.
    pub elapsed_ms: f64,
    /// `elapsed / duration`, clamped to [0, 1].
    pub progress: f64,
    /// Whether the host should schedule another tick.
    pub request_next: bool,
}

#[derive(Debug, Default)]
pub struct Player {
    scene: Option<Scene>,
    state: PlayState,
    /// Host timestamp of the first tick after (re)entering Playing.
    origin_ms: Option<f64>,
    elapsed_ms: f64,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and installs a scene, resetting playback to Idle.
    pub fn load(&mut self, scene: Scene) -> InkframeResult<()> {
        scene.validate()?;
        self.scene = Some(scene);
        self.state = PlayState::Idle;
        self.origin_ms = None;
        self.elapsed_ms = 0.0;
        Ok(())
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn state(&self) -> PlayState {
        self.state
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Starts or resumes playback. From Finished this restarts at zero.
    pub fn play(&mut self) -> InkframeResult<()> {
        if self.scene.is_none() {
            return Err(InkframeError::evaluation("no scene loaded"));
        }
        match self.state {
            PlayState::Idle | PlayState::Paused => self.state = PlayState::Playing,
            PlayState::Finished => {
                self.origin_ms = None;
                self.elapsed_ms = 0.0;
                self.state = PlayState::Playing;
            }
            PlayState::Playing => {}
        }
        Ok(())
    }

    /// Pauses playback. The time origin is dropped, so resuming re-derives
    /// it from the next host timestamp and playback continues from zero
    /// elapsed; hosts that want seamless resume keep their own offset.
    pub fn pause(&mut self) {
        if self.state == PlayState::Playing {
            self.state = PlayState::Paused;
            self.origin_ms = None;
        }
    }

    /// Restarts playback from zero.
    pub fn restart(&mut self) -> InkframeResult<()> {
        if self.scene.is_none() {
            return Err(InkframeError::evaluation("no scene loaded"));
        }
        self.origin_ms = None;
        self.elapsed_ms = 0.0;
        self.state = PlayState::Playing;
        Ok(())
    }

    /// Advances the clock to `now_ms`. Outside Playing this is a no-op that
    /// reports the frozen position and requests no further ticks.
    pub fn tick(&mut self, now_ms: f64) -> Tick {
        let Some(scene) = &self.scene else {
            return Tick {
                elapsed_ms: 0.0,
                progress: 0.0,
                request_next: false,
            };
        };
        let duration = scene.duration;

        if self.state != PlayState::Playing {
            return Tick {
                elapsed_ms: self.elapsed_ms,
                progress: (self.elapsed_ms / duration).clamp(0.0, 1.0),
                request_next: false,
            };
        }

        let origin = *self.origin_ms.get_or_insert(now_ms);
        let elapsed = (now_ms - origin).max(0.0).min(duration);
        let progress = (elapsed / duration).clamp(0.0, 1.0);
        self.elapsed_ms = elapsed;

        if progress >= 1.0 {
            self.state = PlayState::Finished;
            self.origin_ms = None;
        }

        Tick {
            elapsed_ms: elapsed,
            progress,
            request_next: self.state == PlayState::Playing,
        }
    }
}
