//! Reinvestment of cash left after the spending target is met

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub tfsa: f64,
    pub non_registered: f64,
}

impl Contribution {
    pub fn total(&self) -> f64 {
        self.tfsa + self.non_registered
    }
}

/// Fill TFSA room in person order; the residue goes to person 1's
/// non-registered invested bucket
pub fn allocate_surplus(surplus: f64, tfsa_room: &[f64]) -> Vec<Contribution> {
    let mut contributions = vec![Contribution::default(); tfsa_room.len()];
    let mut remaining = surplus.max(0.0);

    for (contribution, room) in contributions.iter_mut().zip(tfsa_room) {
        let amount = remaining.min(room.max(0.0));
        contribution.tfsa = amount;
        remaining -= amount;
    }

    if remaining > 0.0 {
        if let Some(first) = contributions.first_mut() {
            first.non_registered = remaining;
        }
    }
    contributions
}
