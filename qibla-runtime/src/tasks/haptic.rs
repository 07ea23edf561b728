//! Haptic pulse executor
//!
//! Waits for pulses requested by the alignment detector and plays them.
//! Vibration is best effort: a device without a motor, or one that
//! refuses, costs nothing but a debug log line.

use qibla_hal::HapticOutput;

use crate::channels::SessionChannels;
use crate::log_debug;

/// Haptic task - runs until the session drops it
pub async fn haptic_task<H: HapticOutput>(haptics: &mut H, channels: &SessionChannels) {
    loop {
        let pulse = channels.haptic.wait().await;
        match haptics.vibrate(pulse) {
            Ok(()) => log_debug!("Haptic pulse {} ms", pulse.duration_ms),
            Err(e) => log_debug!("Haptic pulse failed: {:?}", e),
        }
    }
}
