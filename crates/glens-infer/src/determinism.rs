use glens_core::rng::{derive_substream_seed, label_substream, SAMPLER_STREAM};

/// Seed of the sampler run labelled `label` under `master_seed`.
///
/// Distinct labels draw from distinct substreams, so the lensed and unlensed
/// runs of one configuration never share a random sequence.
pub fn sampler_seed(master_seed: u64, label: &str) -> u64 {
    derive_substream_seed(
        derive_substream_seed(master_seed, SAMPLER_STREAM),
        label_substream(label),
    )
}
