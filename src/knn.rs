//! k-Nearest-Neighbor Verdict
//!
//! Backend-independent half of the classification: given ranked neighbors
//! from any [`crate::store::NeighborSource`], run similarity-weighted voting
//! and blend a confidence score. Keeping this arithmetic outside the store
//! means a brute-force corpus and an externally-indexed one produce the same
//! verdict for the same neighbors.
//!
//! Confidence blends two signals equally: how close the single nearest
//! pattern is, and how dominant the winning label is in the weighted vote.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::labels::AttackLabel;
use crate::store::Neighbor;

/// Cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has near-zero norm, so degenerate inputs
/// read as maximally dissimilar rather than NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a < 1e-8 || norm_b < 1e-8 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Round to four decimal places for stable, comparable output
pub fn round4(v: f32) -> f32 {
    (v * 10_000.0).round() / 10_000.0
}

/// Neighbor projection carried in the result
#[derive(Debug, Clone, Serialize)]
pub struct NeighborSummary {
    pub label: AttackLabel,
    pub distance: f32,
}

/// Final classification verdict
#[derive(Debug, Clone, Serialize)]
pub struct ClassificationResult {
    pub label: AttackLabel,
    /// Blended confidence in [0, 1], rounded to 4 decimals
    pub confidence: f32,
    pub is_attack: bool,
    /// Cosine distance to the single closest pattern
    pub nearest_distance: f32,
    /// The k neighbors considered, ascending by distance
    pub neighbors: Vec<NeighborSummary>,
    /// Weighted vote mass per candidate label
    pub votes: BTreeMap<AttackLabel, f32>,
    pub latency_ms: f64,
}

impl ClassificationResult {
    /// Defined verdict for an empty corpus: benign with zero confidence
    pub fn empty_store() -> Self {
        Self {
            label: AttackLabel::Clean,
            confidence: 0.0,
            is_attack: false,
            nearest_distance: 1.0,
            neighbors: Vec::new(),
            votes: BTreeMap::new(),
            latency_ms: 0.0,
        }
    }
}

/// Similarity-weighted vote over ranked neighbors.
///
/// Each neighbor votes for its label with weight `similarity`
/// (`1 - distance`); a negative similarity subtracts from its label's
/// total. The winner is the label with the largest total, ties broken
/// lexicographically by canonical label string. Confidence averages
/// proximity `(1 - nearest_distance)` with the winner's vote share,
/// clamped into [0, 1] and rounded to 4 decimals.
pub fn vote(neighbors: &[Neighbor], latency_ms: f64) -> ClassificationResult {
    if neighbors.is_empty() {
        let mut result = ClassificationResult::empty_store();
        result.latency_ms = latency_ms;
        return result;
    }

    let mut votes: BTreeMap<AttackLabel, f32> = BTreeMap::new();
    let mut total = 0.0f32;
    for neighbor in neighbors {
        *votes.entry(neighbor.label).or_insert(0.0) += neighbor.similarity;
        total += neighbor.similarity;
    }

    // BTreeMap iteration follows enum declaration order; compare by the
    // canonical string so the tie-break is lexicographic, not declaration
    // order
    let mut winner = neighbors[0].label;
    let mut winner_weight = f32::NEG_INFINITY;
    for (&label, &weight) in &votes {
        let better = weight > winner_weight
            || (weight == winner_weight && label.as_str() < winner.as_str());
        if better {
            winner = label;
            winner_weight = weight;
        }
    }

    let nearest_distance = neighbors[0].distance;
    let proximity = (1.0 - nearest_distance).clamp(0.0, 1.0);
    // A non-positive total carries no usable vote signal; a winner with
    // negative mass contributes nothing either
    let vote_share = if total > 0.0 {
        (winner_weight / total).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let confidence = round4(((proximity + vote_share) / 2.0).clamp(0.0, 1.0));

    let votes = votes
        .into_iter()
        .map(|(label, weight)| (label, round4(weight)))
        .collect();

    ClassificationResult {
        label: winner,
        confidence,
        is_attack: winner.is_attack(),
        nearest_distance: round4(nearest_distance),
        neighbors: neighbors
            .iter()
            .map(|n| NeighborSummary {
                label: n.label,
                distance: round4(n.distance),
            })
            .collect(),
        votes,
        latency_ms,
    }
}
