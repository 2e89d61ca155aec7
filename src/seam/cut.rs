use ahash::AHashSet;
use geo::MultiPolygon;
use geograph::Alignment;
use tracing::debug;

use crate::diagnostics::{self, Diagnostics};
use crate::error::{invariant, Result};
use crate::graph::most_in_direction;
use crate::registry::Registry;
use crate::seam::walk::Seam;
use crate::types::{AtomId, GroupId};

/// Pieces smaller than this share of the group's area are dropped as slivers.
const SLIVER_RATIO: f64 = 1e-9;

/// Result of cutting a group along a seam.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Cut {
    /// Nothing remains once the seam is removed.
    Force,
    /// Both halves landed in the same piece; the seam ended in the wrong place.
    Degenerate,
    Split { a: Vec<AtomId>, b: Vec<AtomId> },
}

/// Cut `group` along `seam` and assign each member to one of the two halves.
pub(crate) fn cut_along(
    registry: &Registry,
    group: GroupId,
    seam: &Seam,
    alignment: Alignment,
    diagnostics: &dyn Diagnostics,
) -> Result<Cut> {
    let container = registry.group(group);
    let seam_shape = geograph::union_all(seam.members.iter().map(|&id| registry.atom(id).geometry()));
    let min_area = SLIVER_RATIO * geograph::area(container.geometry());

    let remainder = geograph::polygons(&geograph::difference(container.geometry(), &seam_shape)).into_iter()
        .filter(|piece| geograph::area(piece) >= min_area)
        .collect::<Vec<_>>();
    if remainder.is_empty() { return Ok(Cut::Force) }

    // A seam along the edge leaves one piece; the seam itself is then the other side.
    let on_edge = remainder.len() == 1;
    let in_seam = seam.members.iter().copied().collect::<AHashSet<_>>();
    let (pieces, candidates) = if on_edge {
        (vec![remainder[0].clone(), seam_shape], container.border().members().to_vec())
    } else {
        let candidates = container.border().members().iter()
            .copied()
            .filter(|id| !in_seam.contains(id))
            .collect::<Vec<_>>();
        (remainder, candidates)
    };

    let (dir_a, dir_b) = alignment.halves();
    let reps = (most_in_direction(registry, &candidates, dir_a), most_in_direction(registry, &candidates, dir_b));
    let (Some(rep_a), Some(rep_b)) = reps else {
        dump_pieces(registry, group, &pieces, diagnostics);
        invariant!("{group}: no {dir_a} or {dir_b} representative for a {alignment} cut");
    };

    let (Some(piece_a), Some(piece_b)) = (piece_of(registry, &pieces, rep_a), piece_of(registry, &pieces, rep_b)) else {
        dump_pieces(registry, group, &pieces, diagnostics);
        invariant!("{group}: representative {rep_a} or {rep_b} lies in no piece of the cut");
    };

    if piece_a == piece_b {
        debug!("{group}: {alignment} seam ending at {} leaves both sides in one piece", seam.finish);
        return Ok(Cut::Degenerate);
    }

    let (mut a, mut b, mut unresolved) = (Vec::new(), Vec::new(), Vec::new());
    for &id in container.members() {
        match piece_of(registry, &pieces, id) {
            Some(p) if p == piece_a => a.push(id),
            Some(p) if p == piece_b => b.push(id),
            _ => unresolved.push(id),
        }
    }

    let population = |ids: &[AtomId]| ids.iter().map(|&id| registry.atom(id).population()).sum::<u64>();
    if population(&a) < population(&b) { a.extend(unresolved) } else { b.extend(unresolved) }

    if a.is_empty() || b.is_empty() {
        invariant!("{group}: {alignment} cut left an empty side ({} / {})", a.len(), b.len());
    }

    Ok(Cut::Split { a, b })
}

/// Index of the piece holding an interior point of the atom.
fn piece_of(registry: &Registry, pieces: &[MultiPolygon<f64>], id: AtomId) -> Option<usize> {
    let point = geograph::interior_point(registry.atom(id).geometry())?;
    pieces.iter().position(|piece| geograph::point_in(piece, &point))
}

fn dump_pieces(registry: &Registry, group: GroupId, pieces: &[MultiPolygon<f64>], diagnostics: &dyn Diagnostics) {
    if !diagnostics.enabled() { return }
    diagnostics.save(&format!("cut-failed-{}", group.0), &diagnostics::group_snapshot(registry, &[group]));
    diagnostics.plot(&format!("cut-failed-{}", group.0), &pieces.iter().enumerate()
        .map(|(i, piece)| diagnostics::PlotLayer { name: format!("piece-{i}"), shapes: vec![piece.clone()], edges: vec![] })
        .collect::<Vec<_>>());
}
