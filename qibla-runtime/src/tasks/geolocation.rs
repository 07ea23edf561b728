//! One-shot target resolution
//!
//! Asks the platform for the current position once per view session and
//! turns it into a target bearing. The session loop receives the result
//! through the target signal; heading tracking never waits for it.

use qibla_core::bearing::BearingProvider;
use qibla_hal::Geolocation;

use crate::channels::SessionChannels;
use crate::{log_info, log_warn};

/// Geolocation task - resolves once, then returns
pub async fn geolocation_task<G: Geolocation, B: BearingProvider>(
    geolocation: &mut G,
    provider: &B,
    channels: &SessionChannels,
) {
    match geolocation.current_position().await {
        Ok(position) => {
            let target = provider.bearing_from(position);
            log_info!(
                "Qibla bearing {} deg, {} km",
                target.bearing_deg,
                target.distance_km
            );
            channels.target.signal(Ok(target));
        }
        Err(e) => {
            log_warn!("Geolocation failed: {:?}", e);
            channels.target.signal(Err(e));
        }
    }
}
