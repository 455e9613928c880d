//! Dead-reckoned position of the gimbal head.
//!
//! The firmware reports nothing back, so the position is the sum of every
//! finished move plus a linear extrapolation of the move currently in
//! flight. The extrapolation assumes constant speed from the moment the
//! frame was sent and never runs past the frame's target.

use crate::vector::Vector2;
use std::time::Instant;

/// Snapshot of everything the position estimate depends on.
///
/// Callers that share a `Kinematics` between threads must keep it behind a
/// single lock so a reader never sees a move half begun or half committed.
#[derive(Clone, Copy, Debug)]
pub struct Kinematics {
    start_time: Instant,
    in_flight_displacement: Vector2,
    in_flight_speed: Vector2,
    committed: Vector2,
}

impl Kinematics {
    pub fn new(now: Instant) -> Self {
        Self {
            start_time: now,
            in_flight_displacement: Vector2::ZERO,
            in_flight_speed: Vector2::ZERO,
            committed: Vector2::ZERO,
        }
    }

    /// Position accumulated from finished moves only.
    pub fn committed(&self) -> Vector2 {
        self.committed
    }

    pub fn in_flight_displacement(&self) -> Vector2 {
        self.in_flight_displacement
    }

    pub fn in_flight_speed(&self) -> Vector2 {
        self.in_flight_speed
    }

    pub fn start_time(&self) -> Instant {
        self.start_time
    }

    /// Estimated position in steps at `now`.
    pub fn position_at(&self, now: Instant) -> Vector2 {
        let elapsed_ms = now.saturating_duration_since(self.start_time).as_secs_f64() * 1000.0;
        let d = self.in_flight_displacement;
        let v = self.in_flight_speed;
        Vector2::new(
            extrapolate(self.committed.x(), d.x(), v.x(), elapsed_ms),
            extrapolate(self.committed.y(), d.y(), v.y(), elapsed_ms),
        )
    }

    /// Starts tracking a move of `steps` at `speed` sent at `now`.
    ///
    /// Progress still attributed to a previous move is folded into the
    /// committed position first: the firmware replaces a running move when a
    /// new frame arrives.
    pub fn begin(&mut self, steps: Vector2, speed: Vector2, now: Instant) {
        self.settle(now);
        self.start_time = now;
        self.in_flight_displacement = steps;
        self.in_flight_speed = speed;
    }

    /// Marks the in-flight move as finished at its full displacement.
    pub fn complete(&mut self) {
        self.committed = self.committed + self.in_flight_displacement;
        self.in_flight_displacement = Vector2::ZERO;
        self.in_flight_speed = Vector2::ZERO;
    }

    /// Forgets the in-flight move without committing any of it, for a frame
    /// that never reached the head.
    pub fn discard(&mut self) {
        self.in_flight_displacement = Vector2::ZERO;
        self.in_flight_speed = Vector2::ZERO;
    }

    /// Freezes the estimate at `now`, dropping whatever is left of the
    /// in-flight move.
    pub fn settle(&mut self, now: Instant) {
        self.committed = self.position_at(now);
        self.in_flight_displacement = Vector2::ZERO;
        self.in_flight_speed = Vector2::ZERO;
    }
}

fn signum(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v.signum() }
}

fn extrapolate(committed: f64, displacement: f64, speed: f64, elapsed_ms: f64) -> f64 {
    let progress = (speed * elapsed_ms / 1000.0)
        .max(0.0)
        .min(displacement.abs());
    committed + signum(displacement) * progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn idle_estimate_is_committed_position() {
        let t0 = Instant::now();
        let k = Kinematics::new(t0);
        assert_eq!(k.position_at(t0 + ms(10_000)), Vector2::ZERO);
    }

    #[test]
    fn extrapolates_linearly_then_clamps() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(1000.0, 0.0), Vector2::new(500.0, 0.0), t0);

        assert_eq!(k.position_at(t0), Vector2::ZERO);
        assert_eq!(k.position_at(t0 + ms(1000)), Vector2::new(500.0, 0.0));
        assert_eq!(k.position_at(t0 + ms(2000)), Vector2::new(1000.0, 0.0));
        assert_eq!(k.position_at(t0 + ms(2500)), Vector2::new(1000.0, 0.0));
    }

    #[test]
    fn negative_moves_extrapolate_downwards() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(-200.0, 300.0), Vector2::new(100.0, 100.0), t0);

        assert_eq!(k.position_at(t0 + ms(1000)), Vector2::new(-100.0, 100.0));
        assert_eq!(k.position_at(t0 + ms(5000)), Vector2::new(-200.0, 300.0));
    }

    #[test]
    fn queries_are_idempotent() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(100.0, 40.0), Vector2::new(30.0, 7.0), t0);
        let at = t0 + ms(1234);
        assert_eq!(k.position_at(at), k.position_at(at));
    }

    #[test]
    fn complete_commits_full_displacement() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(500.0, 0.0), Vector2::new(250.0, 0.0), t0);
        k.complete();
        k.begin(Vector2::new(0.0, 300.0), Vector2::new(0.0, 100.0), t0 + ms(2000));
        k.complete();

        assert_eq!(k.committed(), Vector2::new(500.0, 300.0));
        assert!(k.in_flight_displacement().is_zero());
        assert_eq!(k.position_at(t0 + ms(60_000)), Vector2::new(500.0, 300.0));
    }

    #[test]
    fn settle_freezes_partial_progress() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(1000.0, -1000.0), Vector2::new(100.0, 100.0), t0);
        k.settle(t0 + ms(3000));

        let frozen = Vector2::new(300.0, -300.0);
        assert_eq!(k.committed(), frozen);
        assert_eq!(k.position_at(t0 + ms(9000)), frozen);

        // a late completion has nothing left to add
        k.complete();
        assert_eq!(k.committed(), frozen);
    }

    #[test]
    fn discard_keeps_committed_position() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(10.0, 0.0), Vector2::new(10.0, 0.0), t0);
        k.complete();
        k.begin(Vector2::new(90.0, 0.0), Vector2::new(10.0, 0.0), t0 + ms(1000));
        k.discard();
        assert_eq!(k.position_at(t0 + ms(5000)), Vector2::new(10.0, 0.0));
    }

    #[test]
    fn begin_folds_unfinished_move() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(1000.0, 0.0), Vector2::new(100.0, 0.0), t0);
        k.begin(Vector2::new(50.0, 0.0), Vector2::new(50.0, 0.0), t0 + ms(2000));

        assert_eq!(k.committed(), Vector2::new(200.0, 0.0));
        assert_eq!(k.position_at(t0 + ms(2500)), Vector2::new(225.0, 0.0));
    }

    #[test]
    fn estimate_never_moves_backwards_on_bad_speed() {
        let t0 = Instant::now();
        let mut k = Kinematics::new(t0);
        k.begin(Vector2::new(100.0, 0.0), Vector2::new(-10.0, -10.0), t0);
        assert_eq!(k.position_at(t0 + ms(1000)), Vector2::ZERO);
    }
}
