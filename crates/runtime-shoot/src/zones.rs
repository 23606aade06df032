//! Zone union across worker pools

use std::collections::HashSet;

use runtime_common::crd::WorkerPool;
use runtime_common::error::UNKNOWN_CONTEXT;
use runtime_common::{Error, Result};

/// Union of the zones of all pools, in order of first appearance
///
/// Fails when no pools are given or the pools reference no zones at all.
pub fn networking_zones<'a, I>(pools: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a WorkerPool>,
{
    let mut seen = HashSet::new();
    let mut zones = Vec::new();
    let mut pool_count = 0usize;

    for pool in pools {
        pool_count += 1;
        for zone in &pool.zones {
            if seen.insert(zone.as_str()) {
                zones.push(zone.clone());
            }
        }
    }

    if pool_count == 0 {
        return Err(Error::validation_for_field(
            UNKNOWN_CONTEXT,
            "spec.shoot.provider.workers",
            "no zones derivable: no worker pools given",
        ));
    }
    if zones.is_empty() {
        return Err(Error::validation_for_field(
            UNKNOWN_CONTEXT,
            "spec.shoot.provider.workers",
            "no zones derivable: worker pools reference no zones",
        ));
    }

    Ok(zones)
}
