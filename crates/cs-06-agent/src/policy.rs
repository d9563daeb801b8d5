//! Aggregation policy over local and peer predictions.

use shared_types::PredictionVector;

/// Pick an action from the peer vectors and the local vector.
///
/// The vector whose largest element is strictly greater than every earlier
/// candidate's wins; peers are considered in order, the local vector last,
/// so on a tie the first-seen vector is kept. The chosen vector's first
/// arg-max is returned.
///
/// Peer vectors whose length differs from the local one are skipped. With no
/// usable peer vectors this is the local arg-max. `None` only if the local
/// vector is empty and no peer vector is usable.
#[must_use]
pub fn choose_best_action(local: &PredictionVector, peers: &[PredictionVector]) -> Option<usize> {
    let mut best: Option<(&PredictionVector, f32)> = None;
    let candidates = peers
        .iter()
        .filter(|p| p.len() == local.len())
        .chain(std::iter::once(local));

    for candidate in candidates {
        let Some(max) = candidate.max_value() else {
            continue;
        };
        match best {
            Some((_, best_max)) if max <= best_max => {}
            _ => best = Some((candidate, max)),
        }
    }

    best.and_then(|(vector, _)| vector.arg_max())
}
