//! Rescaled play destinations.
//!
//! For a ward `u` with play links of total weight `Σw`:
//!
//! ```text
//! self share  = s + (1 − s) × w_self / Σw
//! other share =     (1 − s) × w      / Σw
//! ```
//!
//! where `s = static_play_at_home` and `w_self` is the weight of any
//! `u → u` links.  A ward whose play weights sum to zero (or to something
//! non-finite) keeps its whole play pool at home.
//!
//! The network is never modified; the matrix is a separate value tied to
//! one `ParameterSet`.

use log::debug;

use ws_core::{ParameterSet, WardId};
use ws_network::WardNetwork;

/// One daytime destination of a ward's play pool.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlayShare {
    pub to:       WardId,
    pub fraction: f64,
    pub distance: f64,
}

/// Per-ward play destinations in CSR order.  The first entry of every ward
/// is the ward itself.
#[derive(Clone, Debug, Default)]
pub struct PlayMatrix {
    out_start: Vec<u32>,
    shares:    Vec<PlayShare>,
}

impl PlayMatrix {
    #[inline]
    pub fn destinations(&self, ward: WardId) -> &[PlayShare] {
        let start = self.out_start[ward.index()] as usize;
        let end   = self.out_start[ward.index() + 1] as usize;
        &self.shares[start..end]
    }

    /// Share of `ward`'s play pool that stays in `ward` by day.
    #[inline]
    pub fn self_fraction(&self, ward: WardId) -> f64 {
        self.destinations(ward)[0].fraction
    }

    pub fn ward_count(&self) -> usize {
        self.out_start.len().saturating_sub(1)
    }
}

/// Build the [`PlayMatrix`] for `network` under `params`.
pub fn rescale_play_matrix(network: &WardNetwork, params: &ParameterSet) -> PlayMatrix {
    let stay = params.static_play_at_home;
    let mut out_start = Vec::with_capacity(network.ward_count() + 1);
    let mut shares = Vec::with_capacity(network.ward_count() + network.play.len());
    let mut degenerate = 0usize;

    out_start.push(0);
    for ward in network.ward_ids() {
        let links = network.play_links(ward);
        let total: f64 = links.iter().map(|l| l.weight).sum();

        if total <= 0.0 || !total.is_finite() {
            if !links.is_empty() {
                debug!("{ward}: play weights sum to {total}; play pool stays home");
            }
            degenerate += 1;
            shares.push(PlayShare { to: ward, fraction: 1.0, distance: 0.0 });
            out_start.push(shares.len() as u32);
            continue;
        }

        let self_index = shares.len();
        shares.push(PlayShare { to: ward, fraction: stay, distance: 0.0 });
        for l in links {
            let fraction = (1.0 - stay) * l.weight / total;
            if l.to == ward {
                shares[self_index].fraction += fraction;
            } else {
                shares.push(PlayShare { to: l.to, fraction, distance: l.distance });
            }
        }
        out_start.push(shares.len() as u32);
    }

    debug!(
        "play matrix: {} destinations over {} wards ({} stay home), static share {stay}",
        shares.len(),
        network.ward_count(),
        degenerate,
    );
    PlayMatrix { out_start, shares }
}
