//! Strand test pattern
//!
//! Lights the first three pixels red, green and blue and rolls them one
//! pixel per frame. If the wiring and configuration are right the three
//! colors travel down the whole strip in order.

use std::sync::atomic::{AtomicBool, Ordering};

use embassy_time::Instant;

use crate::frame::FrameBuffer;
use crate::frame_scheduler::FrameScheduler;

/// Reset the frame to the red, green, blue seed
pub fn seed_pattern(frame: &mut FrameBuffer) {
    frame.fill([0.0; 3]);
    frame.set(0, [255.0, 0.0, 0.0]);
    frame.set(1, [0.0, 255.0, 0.0]);
    frame.set(2, [0.0, 0.0, 255.0]);
}

/// Roll the pattern until `stop` is raised, then turn every output off
///
/// Each frame rolls the strip by one pixel before it is pushed out.
pub fn run(scheduler: &mut FrameScheduler, stop: &AtomicBool) {
    seed_pattern(scheduler.renderer_mut().frame_mut());
    tracing::info!("Starting LED strand test");

    while !stop.load(Ordering::Relaxed) {
        scheduler
            .renderer_mut()
            .frame_mut()
            .current_mut()
            .rotate_right(1);
        let result = scheduler.tick(Instant::now());
        std::thread::sleep(std::time::Duration::from_millis(
            result.sleep_duration.as_millis(),
        ));
    }

    tracing::info!("Stopping LED strand test");
    scheduler.renderer_mut().shutdown();
}
