//! Initial network generators.
//!
//! | Topology    | Undirected                              | Directed                                   |
//! |-------------|-----------------------------------------|--------------------------------------------|
//! | `random`    | G(n, m) with `m = n·k/2`                | G(n, m) with `m = n·k` ordered pairs       |
//! | `scale_free`| Barabási–Albert, `k/2` links per node   | Barabási–Albert, `k` out-links per node    |
//! | `regular`   | random `k`-regular                      | random `k`-out / `k`-in regular            |
//! | `complete`  | every pair tied                         | every ordered pair tied                    |
//!
//! Undirected `random`, `scale_free` and `regular` need an even `k`, so
//! that mean degree is comparable across topologies.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::SocialNetwork;
use crate::error::{CascadeError, Result};

/// Restarts allowed for the regular-graph pairing before giving up.
const REGULAR_MAX_RESTARTS: usize = 1000;

/// Initial network topology.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Erdős–Rényi with a fixed edge count
    #[default]
    Random,
    /// Preferential attachment
    ScaleFree,
    /// Every agent has degree exactly `k`
    Regular,
    /// Every agent tied to every other agent
    Complete,
}

impl Topology {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::ScaleFree => "scale_free",
            Self::Regular => "regular",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Topology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "random" | "erdos_renyi" => Ok(Self::Random),
            "scale_free" | "scalefree" | "barabasi" => Ok(Self::ScaleFree),
            "regular" => Ok(Self::Regular),
            "complete" | "full" => Ok(Self::Complete),
            _ => Err(format!("Unknown topology: {}", s)),
        }
    }
}

/// Build the initial social network with target mean degree `k`.
///
/// Any agent left with zero degree is attached by [`repair_isolated`],
/// which keeps the total tie count unchanged.
pub fn seed_social_network<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    topology: Topology,
    directed: bool,
    rng: &mut R,
) -> Result<SocialNetwork> {
    if n < 2 {
        return Err(CascadeError::InvalidParameter(format!(
            "a social network needs at least 2 agents, got {n}"
        )));
    }
    if topology != Topology::Complete {
        if k == 0 || k >= n {
            return Err(CascadeError::InvalidDegree(format!(
                "mean degree k = {k} must satisfy 0 < k < n = {n}"
            )));
        }
        if !directed && k % 2 != 0 {
            return Err(CascadeError::InvalidDegree(format!(
                "undirected {topology} networks need an even mean degree, got k = {k}"
            )));
        }
    }

    let mut network = match topology {
        Topology::Random => erdos_renyi(n, k, directed, rng),
        Topology::ScaleFree => barabasi_albert(n, k, directed, rng)?,
        Topology::Regular => random_regular(n, k, directed, rng)?,
        Topology::Complete => SocialNetwork::complete(n, directed),
    };

    let repaired = repair_isolated(&mut network, rng)?;
    if repaired > 0 {
        tracing::debug!("Attached {} isolated agents in {} network", repaired, topology);
    }
    Ok(network)
}

/// Attach every zero-degree agent, preserving the total tie count.
///
/// For each isolated agent (in index order) one redundant tie elsewhere is
/// removed and the agent is tied to a uniformly chosen other agent. A tie
/// `a → b` is redundant when removing it leaves `a` (and `b`, if undirected)
/// with degree at least one. Returns the number of agents attached.
pub fn repair_isolated<R: Rng + ?Sized>(network: &mut SocialNetwork, rng: &mut R) -> Result<usize> {
    let n = network.len();
    let mut repaired = 0;

    for loner in network.isolated() {
        // An earlier repair may already have tied this agent.
        if network.tie_count_of(loner) > 0 {
            continue;
        }

        let redundant = redundant_ties(network, loner);
        let &(a, b) = redundant
            .choose(rng)
            .ok_or(CascadeError::NoRedundantEdge(loner))?;
        network.remove_tie(a, b)?;

        let others: Vec<usize> = (0..n).filter(|&j| j != loner).collect();
        let &target = others
            .choose(rng)
            .ok_or(CascadeError::NoRedundantEdge(loner))?;
        network.add_tie(loner, target)?;
        repaired += 1;
    }
    Ok(repaired)
}

fn redundant_ties(network: &SocialNetwork, loner: usize) -> Vec<(usize, usize)> {
    let n = network.len();
    let counts: Vec<usize> = (0..n).map(|i| network.tie_count_of(i)).collect();
    let mut ties = Vec::new();
    for a in 0..n {
        if a == loner || counts[a] < 2 {
            continue;
        }
        for b in network.neighbors(a) {
            if b == loner {
                continue;
            }
            if network.is_directed() {
                ties.push((a, b));
            } else if a < b && counts[b] >= 2 {
                ties.push((a, b));
            }
        }
    }
    ties
}

fn erdos_renyi<R: Rng + ?Sized>(n: usize, k: usize, directed: bool, rng: &mut R) -> SocialNetwork {
    let pairs: Vec<(usize, usize)> = if directed {
        (0..n)
            .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect()
    } else {
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect()
    };
    let edges = if directed { n * k } else { n * k / 2 };

    let mut network = SocialNetwork::empty(n, directed);
    for idx in index::sample(rng, pairs.len(), edges.min(pairs.len())).iter() {
        let (i, j) = pairs[idx];
        network.adjacency[[i, j]] = 1.0;
        if !directed {
            network.adjacency[[j, i]] = 1.0;
        }
    }
    network
}

/// Linear preferential attachment with unit zero-appeal: each new agent
/// links to `m` distinct earlier agents chosen with weight `degree + 1`
/// (in-degree for directed networks).
fn barabasi_albert<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    directed: bool,
    rng: &mut R,
) -> Result<SocialNetwork> {
    let m = if directed { k } else { k / 2 };
    let mut network = SocialNetwork::empty(n, directed);
    let mut attraction = vec![0.0_f64; n];

    for newcomer in 1..n {
        let earlier: Vec<usize> = (0..newcomer).collect();
        let targets: Vec<usize> = earlier
            .choose_multiple_weighted(rng, m.min(newcomer), |&j| attraction[j] + 1.0)
            .map_err(|e| CascadeError::TopologyGeneration(format!("preferential attachment: {e}")))?
            .copied()
            .collect();

        for target in targets {
            network.add_tie(newcomer, target)?;
            attraction[target] += 1.0;
            if !directed {
                attraction[newcomer] += 1.0;
            }
        }
    }
    Ok(network)
}

fn random_regular<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    directed: bool,
    rng: &mut R,
) -> Result<SocialNetwork> {
    for _ in 0..REGULAR_MAX_RESTARTS {
        let pairing = if directed {
            try_directed_pairing(n, k, rng)
        } else {
            try_undirected_pairing(n, k, rng)
        };
        if let Some(edges) = pairing {
            let mut network = SocialNetwork::empty(n, directed);
            for (a, b) in edges {
                network.add_tie(a, b)?;
            }
            return Ok(network);
        }
    }
    Err(CascadeError::TopologyGeneration(format!(
        "no simple {k}-regular graph on {n} agents after {REGULAR_MAX_RESTARTS} restarts"
    )))
}

/// Stub pairing that keeps good pairs and re-pairs only the leftovers.
/// Returns `None` when the leftovers can no longer form a simple graph.
fn try_undirected_pairing<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    rng: &mut R,
) -> Option<BTreeSet<(usize, usize)>> {
    let mut edges = BTreeSet::new();
    let mut stubs: Vec<usize> = (0..n).flat_map(|i| std::iter::repeat(i).take(k)).collect();

    while !stubs.is_empty() {
        stubs.shuffle(rng);
        let mut leftover: BTreeMap<usize, usize> = BTreeMap::new();
        for pair in stubs.chunks_exact(2) {
            let (a, b) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            if a != b && edges.insert((a, b)) {
                continue;
            }
            *leftover.entry(a).or_default() += 1;
            *leftover.entry(b).or_default() += 1;
        }

        let vertices: Vec<usize> = leftover.keys().copied().collect();
        let pairable = vertices.iter().enumerate().any(|(idx, &a)| {
            vertices[idx + 1..]
                .iter()
                .any(|&b| !edges.contains(&(a, b)))
        });
        if !leftover.is_empty() && !pairable {
            return None;
        }
        stubs = leftover
            .into_iter()
            .flat_map(|(v, count)| std::iter::repeat(v).take(count))
            .collect();
    }
    Some(edges)
}

fn try_directed_pairing<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    rng: &mut R,
) -> Option<BTreeSet<(usize, usize)>> {
    let mut edges = BTreeSet::new();
    let mut outs: Vec<usize> = (0..n).flat_map(|i| std::iter::repeat(i).take(k)).collect();
    let mut ins = outs.clone();

    while !outs.is_empty() {
        ins.shuffle(rng);
        let mut left_out = Vec::new();
        let mut left_in = Vec::new();
        for (&a, &b) in outs.iter().zip(ins.iter()) {
            if a != b && edges.insert((a, b)) {
                continue;
            }
            left_out.push(a);
            left_in.push(b);
        }

        let pairable = left_out
            .iter()
            .any(|&a| left_in.iter().any(|&b| a != b && !edges.contains(&(a, b))));
        if !left_out.is_empty() && !pairable {
            return None;
        }
        outs = left_out;
        ins = left_in;
    }
    Some(edges)
}
