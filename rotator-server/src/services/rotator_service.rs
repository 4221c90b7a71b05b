use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::configs::Device;
use crate::errors::DeviceError;

const FULL_TURN: f64 = 360.0;
const HALF_TURN: f64 = 180.0;

/// Wraps an angle into [0, 360).
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN);
    // rem_euclid rounds tiny negative inputs up to exactly 360
    if wrapped >= FULL_TURN { 0.0 } else { wrapped }
}

/// Wraps an angle into (-180, 180].
pub fn normalize_offset(angle: f64) -> f64 {
    let wrapped = normalize_degrees(angle);
    if wrapped > HALF_TURN { wrapped - FULL_TURN } else { wrapped }
}

/// Wraps an angle into [-180, 180).
pub fn normalize_delta(angle: f64) -> f64 {
    let wrapped = normalize_degrees(angle);
    if wrapped >= HALF_TURN { wrapped - FULL_TURN } else { wrapped }
}

/// Consistent view of every rotator field, taken under one lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatorStatus {
    pub connected: bool,
    pub position: f64,
    pub mechanical_position: f64,
    pub target_position: f64,
    pub position_offset: f64,
    pub is_moving: bool,
    pub reverse: bool,
    pub can_reverse: bool,
    pub step_size: f64,
    pub steps_per_sec: u32,
}

struct Motion {
    epoch: u64,
    task: JoinHandle<()>,
}

struct RotatorState {
    connected: bool,
    mechanical_position: f64,
    position_offset: f64,
    target_mechanical_position: f64,
    is_moving: bool,
    reverse: bool,
    can_reverse: bool,
    step_size: f64,
    steps_per_sec: u32,
    step_interval: Duration,
    /// Bumped on every arm and halt so a superseded task stops on its next tick
    epoch: u64,
    motion: Option<Motion>,
}

enum StepOutcome {
    Moving,
    Arrived,
    Superseded,
}

impl RotatorState {
    fn position(&self) -> f64 {
        normalize_degrees(self.mechanical_position + self.position_offset)
    }

    fn target_position(&self) -> f64 {
        normalize_degrees(self.target_mechanical_position + self.position_offset)
    }

    fn to_mechanical(&self, position: f64) -> f64 {
        normalize_degrees(position - self.position_offset)
    }

    fn remaining(&self) -> f64 {
        normalize_delta(self.target_mechanical_position - self.mechanical_position)
    }

    fn within_tolerance(&self, delta: f64) -> bool {
        delta.abs() <= self.step_size / 2.0
    }

    /// Runs one motion step. Returns `true` once the target is reached.
    fn step(&mut self) -> bool {
        let delta = self.remaining();
        if self.within_tolerance(delta) {
            return true;
        }

        let advance = if delta > 0.0 { self.step_size } else { -self.step_size };
        self.mechanical_position = normalize_degrees(self.mechanical_position + advance);

        self.within_tolerance(self.remaining())
    }

    fn ensure_connected(&self) -> Result<(), DeviceError> {
        if self.connected {
            Ok(())
        } else {
            Err(DeviceError::NotConnected)
        }
    }

    fn ensure_idle(&self, message: &'static str) -> Result<(), DeviceError> {
        if self.is_moving {
            Err(DeviceError::InvalidOperation(message))
        } else {
            Ok(())
        }
    }

    fn cancel_motion(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.is_moving = false;
        if let Some(motion) = self.motion.take() {
            motion.task.abort();
        }
    }

    fn status(&self) -> RotatorStatus {
        RotatorStatus {
            connected: self.connected,
            position: self.position(),
            mechanical_position: self.mechanical_position,
            target_position: self.target_position(),
            position_offset: self.position_offset,
            is_moving: self.is_moving,
            reverse: self.reverse,
            can_reverse: self.can_reverse,
            step_size: self.step_size,
            steps_per_sec: self.steps_per_sec,
        }
    }
}

/// Simulated rotator. Every operation takes the same per-device lock; motion
/// runs on a spawned task that advances one step per tick.
pub struct RotatorDevice {
    device_number: u32,
    state: Arc<Mutex<RotatorState>>,
}

impl RotatorDevice {
    pub fn new(device_number: u32, device: &Device) -> Self {
        let state = RotatorState {
            connected: false,
            mechanical_position: 0.0,
            position_offset: 0.0,
            target_mechanical_position: 0.0,
            is_moving: false,
            reverse: false,
            can_reverse: device.can_reverse,
            step_size: device.step_size,
            steps_per_sec: device.steps_per_sec,
            step_interval: device.step_interval(),
            epoch: 0,
            motion: None,
        };

        Self {
            device_number,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn device_number(&self) -> u32 {
        self.device_number
    }

    fn lock(&self) -> Result<MutexGuard<'_, RotatorState>, DeviceError> {
        self.state.lock().map_err(|_| DeviceError::LockPoisoned)
    }

    pub fn connect(&self, target: bool) -> Result<(), DeviceError> {
        {
            let mut state = self.lock()?;
            if !target && state.is_moving {
                return Err(DeviceError::InvalidOperation(
                    "Cannot disconnect while rotator is moving",
                ));
            }
            state.connected = target;
        }

        if target {
            tracing::info!(device = self.device_number, "[connected]");
        } else {
            tracing::info!(device = self.device_number, "[disconnected]");
        }

        Ok(())
    }

    pub fn move_relative(&self, delta: f64) -> Result<(), DeviceError> {
        tracing::debug!(device = self.device_number, "[Move] delta={}", delta);

        let mut state = self.lock()?;
        state.ensure_connected()?;
        state.ensure_idle("Rotator is already moving")?;
        let target = normalize_degrees(state.mechanical_position + delta);
        self.arm_motion(&mut state, target);

        Ok(())
    }

    /// Moves to `position` in the reported (offset-corrected) frame.
    pub fn move_absolute(&self, position: f64) -> Result<(), DeviceError> {
        tracing::debug!(device = self.device_number, "[MoveAbsolute] position={}", position);

        let mut state = self.lock()?;
        state.ensure_connected()?;
        state.ensure_idle("Rotator is already moving")?;
        let target = state.to_mechanical(position);
        self.arm_motion(&mut state, target);

        Ok(())
    }

    pub fn move_mechanical(&self, position: f64) -> Result<(), DeviceError> {
        tracing::debug!(device = self.device_number, "[MoveMechanical] position={}", position);

        let mut state = self.lock()?;
        state.ensure_connected()?;
        state.ensure_idle("Rotator is already moving")?;
        self.arm_motion(&mut state, normalize_degrees(position));

        Ok(())
    }

    /// Recalibrates so the current mechanical angle reads as `position`.
    pub fn sync(&self, position: f64) -> Result<(), DeviceError> {
        tracing::debug!(device = self.device_number, "[Sync] position={}", position);

        let mut state = self.lock()?;
        state.ensure_connected()?;
        state.ensure_idle("Cannot sync while rotator is moving")?;
        state.position_offset = normalize_offset(position - state.mechanical_position);

        Ok(())
    }

    pub fn halt(&self) -> Result<(), DeviceError> {
        tracing::debug!(device = self.device_number, "[Halt]");

        self.lock()?.cancel_motion();

        Ok(())
    }

    pub fn set_reverse(&self, reverse: bool) -> Result<(), DeviceError> {
        self.lock()?.reverse = reverse;
        Ok(())
    }

    pub fn is_connected(&self) -> Result<bool, DeviceError> {
        Ok(self.lock()?.connected)
    }

    pub fn position(&self) -> Result<f64, DeviceError> {
        Ok(self.lock()?.position())
    }

    pub fn mechanical_position(&self) -> Result<f64, DeviceError> {
        Ok(self.lock()?.mechanical_position)
    }

    pub fn target_position(&self) -> Result<f64, DeviceError> {
        Ok(self.lock()?.target_position())
    }

    pub fn is_moving(&self) -> Result<bool, DeviceError> {
        Ok(self.lock()?.is_moving)
    }

    pub fn reverse(&self) -> Result<bool, DeviceError> {
        Ok(self.lock()?.reverse)
    }

    pub fn can_reverse(&self) -> Result<bool, DeviceError> {
        Ok(self.lock()?.can_reverse)
    }

    pub fn step_size(&self) -> Result<f64, DeviceError> {
        Ok(self.lock()?.step_size)
    }

    pub fn status(&self) -> Result<RotatorStatus, DeviceError> {
        Ok(self.lock()?.status())
    }

    fn arm_motion(&self, state: &mut RotatorState, target_mechanical_position: f64) {
        state.target_mechanical_position = target_mechanical_position;
        state.is_moving = true;
        state.epoch = state.epoch.wrapping_add(1);

        let epoch = state.epoch;
        let task = tokio::spawn(run_motion(
            Arc::clone(&self.state),
            self.device_number,
            epoch,
            state.step_interval,
        ));

        state.motion = Some(Motion { epoch, task });
    }
}

impl Drop for RotatorDevice {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.cancel_motion();
        }
    }
}

async fn run_motion(state: Arc<Mutex<RotatorState>>, device_number: u32, epoch: u64, period: Duration) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match advance(&state, epoch) {
            Ok(StepOutcome::Moving) => continue,
            Ok(StepOutcome::Arrived) => {
                tracing::debug!(device = device_number, "motion complete");
                break;
            }
            Ok(StepOutcome::Superseded) => break,
            Err(e) => {
                tracing::error!(device = device_number, "motion step failed: {}", e);
                break;
            }
        }
    }
}

fn advance(state: &Mutex<RotatorState>, epoch: u64) -> Result<StepOutcome, DeviceError> {
    let mut state = state.lock().map_err(|_| DeviceError::LockPoisoned)?;

    if !state.is_moving || state.epoch != epoch {
        return Ok(StepOutcome::Superseded);
    }

    if state.step() {
        state.is_moving = false;
        if state.motion.as_ref().is_some_and(|motion| motion.epoch == epoch) {
            state.motion = None;
        }
        Ok(StepOutcome::Arrived)
    } else {
        Ok(StepOutcome::Moving)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> Device {
        Device {
            count: 1,
            can_reverse: true,
            step_size: 1.0,
            steps_per_sec: 6,
        }
    }

    fn connected_rotator() -> RotatorDevice {
        let rotator = RotatorDevice::new(0, &device());
        rotator.connect(true).unwrap();
        rotator
    }

    #[test]
    fn test_normalization_ranges() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-10.0), 350.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        assert_eq!(normalize_degrees(-1e-18), 0.0);

        assert_eq!(normalize_offset(180.0), 180.0);
        assert_eq!(normalize_offset(-180.0), 180.0);
        assert_eq!(normalize_offset(190.0), -170.0);

        assert_eq!(normalize_delta(180.0), -180.0);
        assert_eq!(normalize_delta(-181.0), 179.0);
        assert_eq!(normalize_delta(30.0), 30.0);
    }

    #[test]
    fn test_step_takes_shortest_path() {
        let rotator = RotatorDevice::new(0, &device());
        let mut state = rotator.state.lock().unwrap();
        state.mechanical_position = 2.0;
        state.target_mechanical_position = 358.0;

        assert!(!state.step());
        assert_eq!(state.mechanical_position, 1.0);
        assert!(!state.step());
        assert_eq!(state.mechanical_position, 0.0);
        assert!(!state.step());
        assert_eq!(state.mechanical_position, 359.0);
        assert!(state.step());
        assert_eq!(state.mechanical_position, 358.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_absolute_settles_on_target() {
        let rotator = connected_rotator();

        rotator.move_absolute(10.0).unwrap();
        assert!(rotator.is_moving().unwrap());
        assert_eq!(rotator.target_position().unwrap(), 10.0);

        time::sleep(Duration::from_millis(1700)).await;

        assert!(!rotator.is_moving().unwrap());
        assert_eq!(rotator.position().unwrap(), 10.0);
        assert_eq!(rotator.mechanical_position().unwrap(), 10.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_relative_wraps_backwards() {
        let rotator = connected_rotator();

        rotator.move_relative(-30.0).unwrap();
        assert_eq!(rotator.target_position().unwrap(), 330.0);

        time::sleep(Duration::from_secs(6)).await;

        assert!(!rotator.is_moving().unwrap());
        assert_eq!(rotator.position().unwrap(), 330.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_absolute_uses_sync_offset() {
        let rotator = connected_rotator();
        rotator.sync(100.0).unwrap();

        rotator.move_absolute(105.0).unwrap();
        time::sleep(Duration::from_secs(2)).await;

        let status = rotator.status().unwrap();
        assert!(!status.is_moving);
        assert_eq!(status.position, 105.0);
        assert_eq!(status.mechanical_position, 5.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_mechanical_ignores_offset() {
        let rotator = connected_rotator();
        rotator.sync(100.0).unwrap();

        rotator.move_mechanical(3.0).unwrap();
        time::sleep(Duration::from_secs(1)).await;

        assert_eq!(rotator.mechanical_position().unwrap(), 3.0);
        assert_eq!(rotator.position().unwrap(), 103.0);
    }

    #[test]
    fn test_sync_recalibrates_without_motion() {
        let rotator = connected_rotator();

        rotator.sync(90.0).unwrap();
        assert_eq!(rotator.position().unwrap(), 90.0);
        assert_eq!(rotator.mechanical_position().unwrap(), 0.0);

        rotator.sync(300.0).unwrap();
        let status = rotator.status().unwrap();
        assert_eq!(status.position, 300.0);
        assert_eq!(status.position_offset, -60.0);
        assert!(!status.is_moving);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_rotator_rejects_motion_and_sync() {
        let rotator = connected_rotator();
        rotator.move_absolute(10.0).unwrap();

        assert!(matches!(
            rotator.move_absolute(20.0),
            Err(DeviceError::InvalidOperation(_))
        ));
        assert!(matches!(
            rotator.move_relative(5.0),
            Err(DeviceError::InvalidOperation(_))
        ));
        assert!(matches!(
            rotator.move_mechanical(50.0),
            Err(DeviceError::InvalidOperation(_))
        ));
        assert!(matches!(
            rotator.sync(45.0),
            Err(DeviceError::InvalidOperation(_))
        ));

        let status = rotator.status().unwrap();
        assert_eq!(status.target_position, 10.0);
        assert_eq!(status.position_offset, 0.0);
        assert_eq!(status.position, 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_while_moving_is_rejected() {
        let rotator = connected_rotator();
        rotator.move_relative(45.0).unwrap();

        assert!(matches!(
            rotator.connect(false),
            Err(DeviceError::InvalidOperation(_))
        ));
        assert!(rotator.is_connected().unwrap());

        rotator.halt().unwrap();
        rotator.connect(false).unwrap();
        assert!(!rotator.is_connected().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_stops_future_steps() {
        let rotator = connected_rotator();
        rotator.move_absolute(90.0).unwrap();

        time::sleep(Duration::from_millis(1050)).await;
        rotator.halt().unwrap();
        let stopped_at = rotator.position().unwrap();
        assert_eq!(stopped_at, 6.0);
        assert!(!rotator.is_moving().unwrap());

        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rotator.position().unwrap(), stopped_at);
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_is_idempotent() {
        let rotator = connected_rotator();

        rotator.halt().unwrap();
        assert!(!rotator.is_moving().unwrap());
        rotator.halt().unwrap();
        assert!(!rotator.is_moving().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_after_halt_starts_fresh() {
        let rotator = connected_rotator();
        rotator.move_absolute(90.0).unwrap();
        time::sleep(Duration::from_millis(550)).await;
        rotator.halt().unwrap();

        rotator.move_absolute(0.0).unwrap();
        time::sleep(Duration::from_secs(1)).await;

        assert!(!rotator.is_moving().unwrap());
        assert_eq!(rotator.position().unwrap(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnected_rotator_refuses_motion_and_sync() {
        let rotator = RotatorDevice::new(0, &device());

        assert!(matches!(
            rotator.move_absolute(10.0),
            Err(DeviceError::NotConnected)
        ));
        assert!(matches!(
            rotator.move_relative(10.0),
            Err(DeviceError::NotConnected)
        ));
        assert!(matches!(
            rotator.move_mechanical(10.0),
            Err(DeviceError::NotConnected)
        ));
        assert!(matches!(rotator.sync(10.0), Err(DeviceError::NotConnected)));

        let status = rotator.status().unwrap();
        assert!(!status.is_moving);
        assert_eq!(status.target_position, 0.0);
        assert_eq!(status.position_offset, 0.0);
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let rotator = connected_rotator();
        let state = Arc::clone(&rotator.state);

        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("poison the rotator lock");
        })
        .join();

        assert!(matches!(rotator.position(), Err(DeviceError::LockPoisoned)));
        assert!(matches!(rotator.halt(), Err(DeviceError::LockPoisoned)));
    }

    #[test]
    fn test_reverse_flag() {
        let rotator = connected_rotator();

        assert!(rotator.can_reverse().unwrap());
        assert!(!rotator.reverse().unwrap());
        rotator.set_reverse(true).unwrap();
        assert!(rotator.reverse().unwrap());
    }
}
