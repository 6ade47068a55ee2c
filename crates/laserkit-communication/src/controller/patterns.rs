//! Timed laser sequences built from the basic operations
//!
//! Both sequences are fail-stop: the first failed command aborts the run and
//! is returned as-is. Nothing is rolled back, because after a failed write the
//! cache can no longer vouch for the hardware.

use super::LaserController;
use laserkit_core::{ControllerError, LaserId};
use std::thread;
use std::time::Duration;

impl LaserController {
    /// Flash laser `id` `count` times, then restore its previous state
    ///
    /// Each flash is on for `interval` and off for `interval`.
    pub fn flash(
        &mut self,
        id: LaserId,
        count: usize,
        interval: Duration,
    ) -> Result<(), ControllerError> {
        let original = self.get_state(id)?;

        let result: Result<(), ControllerError> = (0..count).try_for_each(|_| {
            self.turn_on(id)?;
            thread::sleep(interval);
            self.turn_off(id)?;
            thread::sleep(interval);
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!("Flash sequence failed: {}", e);
            return Err(e);
        }

        self.set(id, original)?;
        tracing::info!("Flashed laser {} {} times", id, count);
        Ok(())
    }

    /// Light each laser in turn, `cycles` times
    ///
    /// For every id in increasing order: all off, settle, turn the laser on
    /// and hold it for `delay`. Every cycle ends with all lasers off, and
    /// cycles are separated by `delay`.
    pub fn sequential_pattern(
        &mut self,
        delay: Duration,
        cycles: usize,
    ) -> Result<(), ControllerError> {
        let settle = self.config.pattern_settle;
        let count = self.laser_count();

        for cycle in 0..cycles {
            tracing::info!("Sequential pattern cycle {}/{}", cycle + 1, cycles);

            let result: Result<(), ControllerError> = (1..=count).try_for_each(|id| {
                self.all_off()?;
                thread::sleep(settle);
                self.turn_on(id)?;
                thread::sleep(delay);
                Ok(())
            });
            if let Err(e) = result.and_then(|_| self.all_off()) {
                tracing::error!("Sequential pattern failed: {}", e);
                return Err(e);
            }

            if cycle + 1 < cycles {
                thread::sleep(delay);
            }
        }
        Ok(())
    }
}
