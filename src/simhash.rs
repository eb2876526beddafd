//! Simhash
//!
//! 64-bit locality-sensitive fingerprints: similar feature sets produce
//! fingerprints with a small Hamming distance.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1 hash.
fn fnv1_64(data: &[u8]) -> u64 {
    data.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        hash.wrapping_mul(FNV_PRIME) ^ u64::from(byte)
    })
}

// == Feature ==
/// A hashed feature and its weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub sum: u64,
    pub weight: i32,
}

impl Feature {
    /// Hashes `data` with weight 1.
    pub fn new(data: &[u8]) -> Self {
        Self::with_weight(data, 1)
    }

    pub fn with_weight(data: &[u8], weight: i32) -> Self {
        Self {
            sum: fnv1_64(data),
            weight,
        }
    }
}

// == Feature Set ==
/// Anything that can be broken into features.
pub trait FeatureSet {
    fn features(&self) -> Vec<Feature>;
}

impl FeatureSet for [Feature] {
    fn features(&self) -> Vec<Feature> {
        self.to_vec()
    }
}

impl FeatureSet for Vec<Feature> {
    fn features(&self) -> Vec<Feature> {
        self.clone()
    }
}

// == Word Feature Set ==
/// Treats every word (run of `[A-Za-z0-9_']`) as a feature of weight 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordFeatureSet {
    text: Vec<u8>,
}

impl WordFeatureSet {
    /// Builds a word set from lowercased text.
    pub fn new(text: impl AsRef<[u8]>) -> Self {
        Self {
            text: text.as_ref().to_ascii_lowercase(),
        }
    }

    /// Builds a word set from text as-is.
    pub fn raw(text: impl Into<Vec<u8>>) -> Self {
        Self { text: text.into() }
    }

    /// Iterates the words in the text.
    pub fn words(&self) -> impl Iterator<Item = &[u8]> {
        self.text
            .split(|b| !is_word_byte(*b))
            .filter(|word| !word.is_empty())
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'\''
}

impl FeatureSet for WordFeatureSet {
    fn features(&self) -> Vec<Feature> {
        self.words().map(Feature::new).collect()
    }
}

// == Vectorize ==
/// Sums feature weights per bit: +weight where the bit is set, -weight
/// where it is clear.
pub fn vectorize(features: &[Feature]) -> [i64; 64] {
    let mut v = [0i64; 64];
    for feature in features {
        let weight = i64::from(feature.weight);
        for (bit, slot) in v.iter_mut().enumerate() {
            if (feature.sum >> bit) & 1 == 1 {
                *slot += weight;
            } else {
                *slot -= weight;
            }
        }
    }
    v
}

// == Fingerprint ==
/// Collapses a vector into a fingerprint: bit i is set where `v[i] > 0`.
pub fn fingerprint(v: &[i64; 64]) -> u64 {
    v.iter()
        .enumerate()
        .filter(|&(_, &weight)| weight > 0)
        .fold(0u64, |fp, (bit, _)| fp | 1 << bit)
}

// == Simhash ==
/// Computes the 64-bit simhash of a feature set.
pub fn simhash<F: FeatureSet + ?Sized>(set: &F) -> u64 {
    fingerprint(&vectorize(&set.features()))
}

/// Hamming distance between two fingerprints.
pub fn compare(a: u64, b: u64) -> u8 {
    (a ^ b).count_ones() as u8
}

// == Shingle ==
/// Joins every run of `w` consecutive words with a space.
///
/// `w` larger than the word count is clamped to it.
///
/// # Panics
/// Panics if `w` is zero.
pub fn shingle(w: usize, words: &[&[u8]]) -> Vec<Vec<u8>> {
    assert!(w > 0, "shingle width must be a positive integer");
    if w == 1 {
        return words.iter().map(|word| word.to_vec()).collect();
    }
    let w = w.min(words.len());
    if w == 0 {
        return Vec::new();
    }
    words.windows(w).map(|window| window.join(&b' ')).collect()
}
