//! Frame-driven counter and ring animations.
//!
//! Each animated value owns a `Timeline` that moves `Idle -> Animating -> Settled`. Starting or
//! restarting a timeline bumps its generation, and every `FrameToken` remembers the generation it
//! was issued for. A tick carrying an older generation is ignored without touching any state, so a
//! retarget can never race with frames that were scheduled before it.
//!
//! Time is a `Duration` since some origin, supplied by a `FrameClock`. The `Animator` owns a set of
//! instances and the queue of pending frames and can drive them on a `tokio` interval.

use crate::config::ChartSettings;
use crate::geometry::ProgressRing;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, trace};

/// `1 - (1 - progress)^3`, with `progress` clamped into `0..=1`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    };
    1.0 - (1.0 - p).powi(3)
}

/// The counter value shown `elapsed` into an animation toward `target`.
///
/// ```
/// use resource_tracker::animation::counter_value;
/// use std::time::Duration;
///
/// let shown = counter_value(100.0, Duration::from_millis(500), Duration::from_millis(1000));
/// assert_eq!(shown, 87.0);
/// ```
pub fn counter_value(target: f64, elapsed: Duration, duration: Duration) -> f64 {
    if elapsed >= duration {
        return target;
    }
    (target * ease_out_cubic(elapsed.as_secs_f64() / duration.as_secs_f64())).floor()
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Animating,
    Settled,
}

/// A handle for one scheduled frame of one animation run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FrameToken {
    generation: u64,
}

impl FrameToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

enum Tick {
    Stale,
    Running(f64),
    Finished,
}

#[derive(Debug, Clone)]
struct Timeline {
    duration: Duration,
    phase: Phase,
    generation: u64,
    started_at: Duration,
}

impl Timeline {
    fn new(duration: Duration) -> Self {
        Self {
            duration,
            phase: Phase::Idle,
            generation: 0,
            started_at: Duration::ZERO,
        }
    }

    /// Invalidates every outstanding token and starts over. Returns the first token when there is
    /// something to animate.
    fn restart(&mut self, now: Duration, animate: bool) -> Option<FrameToken> {
        self.generation += 1;
        self.started_at = now;
        if !animate {
            self.phase = Phase::Idle;
            None
        } else if self.duration.is_zero() {
            self.phase = Phase::Settled;
            None
        } else {
            self.phase = Phase::Animating;
            Some(self.token())
        }
    }

    fn cancel(&mut self) {
        self.generation += 1;
        if self.phase == Phase::Animating {
            self.phase = Phase::Idle;
        }
    }

    fn tick(&mut self, token: FrameToken, now: Duration) -> Tick {
        if token.generation != self.generation || self.phase != Phase::Animating {
            return Tick::Stale;
        }
        let elapsed = now.saturating_sub(self.started_at);
        if elapsed >= self.duration {
            self.phase = Phase::Settled;
            Tick::Finished
        } else {
            Tick::Running(elapsed.as_secs_f64() / self.duration.as_secs_f64())
        }
    }

    fn token(&self) -> FrameToken {
        FrameToken {
            generation: self.generation,
        }
    }
}

/// A number that counts up from zero to its target with a cubic ease-out, floored on every frame
/// and exact once settled. Targets of zero or less are shown immediately.
#[derive(Debug, Clone)]
pub struct EasedCounter {
    timeline: Timeline,
    target: f64,
    displayed: f64,
}

impl EasedCounter {
    pub fn new(duration: Duration) -> Self {
        Self {
            timeline: Timeline::new(duration),
            target: 0.0,
            displayed: 0.0,
        }
    }

    /// Restarts from zero toward `target`. Any frame scheduled before this call becomes stale.
    pub fn set_target(&mut self, target: f64, now: Duration) -> Option<FrameToken> {
        let target = if target.is_nan() { 0.0 } else { target };
        self.target = target;
        let token = self.timeline.restart(now, target > 0.0);
        self.displayed = match self.timeline.phase {
            Phase::Animating => 0.0,
            Phase::Idle | Phase::Settled => target,
        };
        token
    }

    /// Advances to `now`. Returns the token for the next frame while still animating.
    pub fn tick(&mut self, token: FrameToken, now: Duration) -> Option<FrameToken> {
        match self.timeline.tick(token, now) {
            Tick::Stale => None,
            Tick::Running(progress) => {
                self.displayed = (self.target * ease_out_cubic(progress)).floor();
                Some(self.timeline.token())
            }
            Tick::Finished => {
                self.displayed = self.target;
                None
            }
        }
    }

    /// Stops the current run. Outstanding tokens become stale.
    pub fn cancel(&mut self) {
        self.timeline.cancel();
    }

    pub fn displayed(&self) -> f64 {
        self.displayed
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn phase(&self) -> Phase {
        self.timeline.phase
    }

    pub fn generation(&self) -> u64 {
        self.timeline.generation
    }
}

/// A progress ring sweeping from empty to its target percentage with the same easing and state
/// machine as `EasedCounter`, without flooring.
#[derive(Debug, Clone)]
pub struct RingTransition {
    timeline: Timeline,
    settings: ChartSettings,
    target: f64,
    current: f64,
}

impl RingTransition {
    pub fn new(duration: Duration, settings: ChartSettings) -> Self {
        Self {
            timeline: Timeline::new(duration),
            settings,
            target: 0.0,
            current: 0.0,
        }
    }

    pub fn set_target(&mut self, percent: f64, now: Duration) -> Option<FrameToken> {
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        self.target = percent;
        let token = self.timeline.restart(now, percent > 0.0);
        self.current = match self.timeline.phase {
            Phase::Animating => 0.0,
            Phase::Idle | Phase::Settled => percent,
        };
        token
    }

    pub fn tick(&mut self, token: FrameToken, now: Duration) -> Option<FrameToken> {
        match self.timeline.tick(token, now) {
            Tick::Stale => None,
            Tick::Running(progress) => {
                self.current = self.target * ease_out_cubic(progress);
                Some(self.timeline.token())
            }
            Tick::Finished => {
                self.current = self.target;
                None
            }
        }
    }

    pub fn cancel(&mut self) {
        self.timeline.cancel();
    }

    /// The ring as it should be drawn on this frame.
    pub fn ring(&self) -> ProgressRing {
        ProgressRing::with_settings(self.current, &self.settings)
    }

    pub fn percent(&self) -> f64 {
        self.current
    }

    pub fn phase(&self) -> Phase {
        self.timeline.phase
    }
}

/// A monotonic source of frame times.
pub trait FrameClock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to, optionally by a fixed step on every read.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    step: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that advances by `step` every time it is read.
    pub fn stepping(step: Duration) -> Self {
        Self {
            now: Mutex::new(Duration::ZERO),
            step,
        }
    }

    pub fn set(&self, now: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> Duration {
        match self.now.lock() {
            Ok(mut guard) => {
                *guard += self.step;
                *guard
            }
            Err(_) => Duration::ZERO,
        }
    }
}

/// Identifies an instance owned by an `Animator`.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InstanceId(u64);

#[derive(Debug, Clone)]
enum Instance {
    Counter(EasedCounter),
    Ring(RingTransition),
}

impl Instance {
    fn set_target(&mut self, target: f64, now: Duration) -> Option<FrameToken> {
        match self {
            Instance::Counter(c) => c.set_target(target, now),
            Instance::Ring(r) => r.set_target(target, now),
        }
    }

    fn tick(&mut self, token: FrameToken, now: Duration) -> Option<FrameToken> {
        match self {
            Instance::Counter(c) => c.tick(token, now),
            Instance::Ring(r) => r.tick(token, now),
        }
    }
}

/// Owns animation instances and the frames scheduled for them.
#[derive(Debug, Default)]
pub struct Animator {
    instances: BTreeMap<InstanceId, Instance>,
    queue: Vec<(InstanceId, FrameToken)>,
    next_id: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_counter(&mut self, duration: Duration) -> InstanceId {
        self.insert(Instance::Counter(EasedCounter::new(duration)))
    }

    pub fn add_ring(&mut self, duration: Duration, settings: ChartSettings) -> InstanceId {
        self.insert(Instance::Ring(RingTransition::new(duration, settings)))
    }

    fn insert(&mut self, instance: Instance) -> InstanceId {
        self.next_id += 1;
        let id = InstanceId(self.next_id);
        let _ = self.instances.insert(id, instance);
        id
    }

    /// Restarts instance `id` toward `target`, replacing any frame already queued for it. Returns
    /// false when `id` is not mounted.
    pub fn set_target(&mut self, id: InstanceId, target: f64, now: Duration) -> bool {
        let Some(instance) = self.instances.get_mut(&id) else {
            return false;
        };
        self.queue.retain(|(queued, _)| *queued != id);
        if let Some(token) = instance.set_target(target, now) {
            self.queue.push((id, token));
        }
        true
    }

    /// Removes instance `id` and its queued frames.
    pub fn unmount(&mut self, id: InstanceId) -> bool {
        self.queue.retain(|(queued, _)| *queued != id);
        self.instances.remove(&id).is_some()
    }

    pub fn counter(&self, id: InstanceId) -> Option<&EasedCounter> {
        match self.instances.get(&id) {
            Some(Instance::Counter(c)) => Some(c),
            _ => None,
        }
    }

    pub fn ring(&self, id: InstanceId) -> Option<&RingTransition> {
        match self.instances.get(&id) {
            Some(Instance::Ring(r)) => Some(r),
            _ => None,
        }
    }

    /// True while any instance has a frame queued.
    pub fn is_animating(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Runs one frame at `now`: every queued token is ticked once and the tokens they return are
    /// queued for the next frame. Returns the number of instances ticked.
    pub fn frame(&mut self, now: Duration) -> usize {
        let due = std::mem::take(&mut self.queue);
        let count = due.len();
        for (id, token) in due {
            if let Some(instance) = self.instances.get_mut(&id) {
                if let Some(next) = instance.tick(token, now) {
                    self.queue.push((id, next));
                }
            }
        }
        trace!("Frame at {now:?} ticked {count} instances, {} pending", self.queue.len());
        count
    }

    /// Drives frames every `frame_interval` until nothing is pending. Returns the number of frames
    /// run.
    pub async fn run(&mut self, clock: &impl FrameClock, frame_interval: Duration) -> u64 {
        let mut interval = tokio::time::interval(frame_interval.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut frames = 0;
        while self.is_animating() {
            let _ = interval.tick().await;
            let _ = self.frame(clock.now());
            frames += 1;
        }
        debug!("Animations settled after {frames} frames");
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_counter_value_example() {
        assert_eq!(counter_value(100.0, ms(500), ms(1000)), 87.0);
        assert_eq!(counter_value(100.0, ms(0), ms(1000)), 0.0);
        assert_eq!(counter_value(100.0, ms(1000), ms(1000)), 100.0);
        assert_eq!(counter_value(739.25, ms(5000), ms(1000)), 739.25);
    }

    #[test]
    fn test_ease_out_cubic_bounds() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert_eq!(ease_out_cubic(-1.0), 0.0);
        assert_eq!(ease_out_cubic(0.5), 0.875);
    }

    #[test]
    fn test_counter_runs_to_exact_target() {
        let mut counter = EasedCounter::new(ms(1000));
        assert_eq!(counter.phase(), Phase::Idle);

        let token = counter.set_target(100.0, ms(0)).unwrap();
        assert_eq!(counter.phase(), Phase::Animating);
        assert_eq!(counter.displayed(), 0.0);

        let token = counter.tick(token, ms(0)).unwrap();
        assert_eq!(counter.displayed(), 0.0);
        let token = counter.tick(token, ms(500)).unwrap();
        assert_eq!(counter.displayed(), 87.0);
        assert!(counter.tick(token, ms(1016)).is_none());
        assert_eq!(counter.displayed(), 100.0);
        assert_eq!(counter.phase(), Phase::Settled);
    }

    #[test]
    fn test_non_positive_target_is_immediate() {
        let mut counter = EasedCounter::new(ms(1000));
        assert!(counter.set_target(0.0, ms(0)).is_none());
        assert_eq!(counter.phase(), Phase::Idle);
        assert!(counter.set_target(-4.0, ms(0)).is_none());
        assert_eq!(counter.displayed(), -4.0);
        assert_eq!(counter.phase(), Phase::Idle);
    }

    #[test]
    fn test_zero_duration_settles_immediately() {
        let mut counter = EasedCounter::new(Duration::ZERO);
        assert!(counter.set_target(42.0, ms(10)).is_none());
        assert_eq!(counter.displayed(), 42.0);
        assert_eq!(counter.phase(), Phase::Settled);
    }

    #[test]
    fn test_retarget_restarts_from_zero() {
        let mut counter = EasedCounter::new(ms(1000));
        let token = counter.set_target(100.0, ms(0)).unwrap();
        let _ = counter.tick(token, ms(500)).unwrap();
        assert_eq!(counter.displayed(), 87.0);

        let fresh = counter.set_target(200.0, ms(500)).unwrap();
        assert_eq!(counter.displayed(), 0.0);
        assert_eq!(counter.phase(), Phase::Animating);
        let _ = counter.tick(fresh, ms(1000)).unwrap();
        assert_eq!(counter.displayed(), 175.0);
    }

    #[test]
    fn test_retarget_after_settle_animates_again() {
        let mut counter = EasedCounter::new(ms(100));
        let token = counter.set_target(10.0, ms(0)).unwrap();
        assert!(counter.tick(token, ms(100)).is_none());
        assert_eq!(counter.phase(), Phase::Settled);
        assert!(counter.set_target(20.0, ms(200)).is_some());
        assert_eq!(counter.phase(), Phase::Animating);
        assert_eq!(counter.displayed(), 0.0);
    }

    #[test]
    fn test_stale_token_is_ignored() {
        let mut counter = EasedCounter::new(ms(1000));
        let old = counter.set_target(100.0, ms(0)).unwrap();
        let _ = counter.set_target(50.0, ms(100)).unwrap();
        assert!(counter.tick(old, ms(2000)).is_none());
        assert_eq!(counter.displayed(), 0.0);
        assert_eq!(counter.phase(), Phase::Animating);
    }

    #[test]
    fn test_cancel_invalidates_tokens() {
        let mut counter = EasedCounter::new(ms(1000));
        let token = counter.set_target(100.0, ms(0)).unwrap();
        counter.cancel();
        assert!(counter.tick(token, ms(500)).is_none());
        assert_eq!(counter.displayed(), 0.0);
        assert_eq!(counter.phase(), Phase::Idle);
    }

    #[test]
    fn test_ring_transition() {
        let mut ring = RingTransition::new(ms(1000), ChartSettings::default());
        let token = ring.set_target(150.0, ms(0)).unwrap();
        assert_eq!(ring.ring().arc_length(), 0.0);
        let token = ring.tick(token, ms(500)).unwrap();
        assert!((ring.percent() - 87.5).abs() < 1e-9);
        assert!(ring.tick(token, ms(1000)).is_none());
        let drawn = ring.ring();
        assert!((drawn.arc_length() - drawn.circumference()).abs() < 1e-9);
    }

    #[test]
    fn test_animator_instances_are_independent() {
        let mut animator = Animator::new();
        let fast = animator.add_counter(ms(100));
        let slow = animator.add_counter(ms(1000));
        assert!(animator.set_target(fast, 10.0, ms(0)));
        assert!(animator.set_target(slow, 10.0, ms(0)));

        assert_eq!(animator.frame(ms(100)), 2);
        assert_eq!(animator.counter(fast).unwrap().phase(), Phase::Settled);
        assert_eq!(animator.counter(slow).unwrap().phase(), Phase::Animating);
        assert_eq!(animator.frame(ms(1000)), 1);
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_animator_retarget_drops_queued_frame() {
        let mut animator = Animator::new();
        let id = animator.add_counter(ms(1000));
        animator.set_target(id, 100.0, ms(0));
        animator.set_target(id, 100.0, ms(200));
        assert_eq!(animator.frame(ms(700)), 1);
        assert_eq!(animator.counter(id).unwrap().displayed(), 87.0);
    }

    #[test]
    fn test_animator_unmount() {
        let mut animator = Animator::new();
        let id = animator.add_counter(ms(1000));
        animator.set_target(id, 100.0, ms(0));
        assert!(animator.unmount(id));
        assert!(!animator.is_animating());
        assert_eq!(animator.frame(ms(10)), 0);
        assert!(!animator.set_target(id, 5.0, ms(20)));
        assert!(animator.counter(id).is_none());
    }

    #[tokio::test]
    async fn test_run_until_settled() {
        let mut animator = Animator::new();
        let counter = animator.add_counter(ms(50));
        let ring = animator.add_ring(ms(50), ChartSettings::default());
        animator.set_target(counter, 1234.0, ms(0));
        animator.set_target(ring, 40.0, ms(0));

        let clock = ManualClock::stepping(ms(10));
        let frames = animator.run(&clock, ms(1)).await;
        assert!(frames >= 5);
        assert_eq!(animator.counter(counter).unwrap().displayed(), 1234.0);
        assert_eq!(animator.ring(ring).unwrap().percent(), 40.0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new();
        clock.set(ms(5));
        clock.advance(ms(5));
        assert_eq!(clock.now(), ms(10));
    }
}
