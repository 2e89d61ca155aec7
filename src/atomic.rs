//! Merging census blocks into atomic blocks.
//!
//! A block that fully contains other blocks (an enclave, or the blocks inside
//! the hole of a ring-shaped block) cannot be separated from them without
//! producing a district that surrounds another. Such blocks are fused into a
//! single `AtomicBlock` before any graph is built.

use tracing::debug;

use geograph::SpatialIndex;

use crate::error::Result;
use crate::registry::AtomicBlock;
use crate::types::CensusBlock;

/// Fuse every block with the blocks it contains.
///
/// Blocks are visited from the back; each block not yet absorbed starts a new
/// atom and absorbs every remaining block it contains. A block absorbing the
/// root of an earlier atom takes over that whole atom. Atoms are returned in the
/// input order of their roots, and each atom lists its root block first.
pub fn assemble_atoms(blocks: Vec<CensusBlock>) -> Result<Vec<AtomicBlock>> {
    let n = blocks.len();
    let index = SpatialIndex::new(blocks.iter().map(|block| &block.geometry));

    // owner[i] is the root block of the atom holding block i.
    let mut owner: Vec<Option<usize>> = vec![None; n];
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); n];

    for i in (0..n).rev() {
        if owner[i].is_some() { continue }
        owner[i] = Some(i);
        members[i].push(i);

        let Some(bounds) = geograph::bounds(&blocks[i].geometry) else { continue };
        for j in index.query(&bounds, 0.0) {
            if j == i { continue }
            // Blocks already inside another atom stay there.
            if owner[j].is_some_and(|root| root != j) { continue }
            if !geograph::contains(&blocks[i].geometry, &blocks[j].geometry) { continue }

            let absorbed = std::mem::take(&mut members[j]);
            let absorbed = if absorbed.is_empty() { vec![j] } else { absorbed };
            for &k in &absorbed {
                owner[k] = Some(i);
            }
            debug!("block {} absorbs {} contained block(s)", blocks[i].id, absorbed.len());
            members[i].extend(absorbed);
        }
    }

    let mut slots = blocks.into_iter().map(Some).collect::<Vec<_>>();
    let mut atoms = Vec::new();
    for (root, mut list) in members.into_iter().enumerate() {
        if list.is_empty() { continue }
        list[1..].sort_unstable();
        let children = list.into_iter()
            .filter_map(|k| slots[k].take())
            .collect::<Vec<_>>();
        debug_assert_eq!(owner[root], Some(root));
        atoms.push(AtomicBlock::new(children)?);
    }

    Ok(atoms)
}
