//! The mixing seam.
//!
//! Mixing is an external collaborator: a pure function over the acquired
//! pigments with no locking of its own. The engine calls it through this
//! trait while holding exactly the order's pigment wells and nothing else.

use crate::core::order::FilledCan;
use crate::core::rack::PigmentHold;
use crate::core::ShopError;

/// Turns an order's acquired pigments into a filled can.
///
/// Implementations must not block or take locks; they run with the order's
/// well locks held and bounded time is assumed. A returned error is
/// propagated to the waiting customer after the pigments are released.
pub trait Mixer: Send + Sync + 'static {
    /// Fill a can for `order_id` from the held pigments.
    ///
    /// # Errors
    ///
    /// Implementation-defined mixing failures, reported as
    /// [`ShopError::MixFailed`].
    fn mix(&self, order_id: u64, hold: &mut PigmentHold<'_>) -> Result<FilledCan, ShopError>;
}

/// Default mixer: dispenses one unit from every held well into the can.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlendMixer;

impl Mixer for BlendMixer {
    fn mix(&self, order_id: u64, hold: &mut PigmentHold<'_>) -> Result<FilledCan, ShopError> {
        Ok(FilledCan {
            order_id,
            contents: hold.draw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShopConfig;
    use crate::core::order::TintRequest;
    use crate::core::rack::PigmentRack;

    #[test]
    fn test_blend_mixer_fills_from_held_pigments() {
        let config = ShopConfig::new(1, 3, 3);
        let rack = PigmentRack::new(3);
        let request = TintRequest::new(vec![Some(2), Some(0), Some(2)], &config).unwrap();
        let mut hold = rack.acquire(&request);
        let can = BlendMixer.mix(11, &mut hold).unwrap();
        assert_eq!(can.order_id, 11);
        assert_eq!(can.contents, vec![0, 2]);
    }
}
