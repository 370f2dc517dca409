//! Random sources that feed dice rolls.
//!
//! Every face drawn during a round comes from a [`RandomSource`]. A source is
//! owned by exactly one [`crate::Round`] and advanced only by it, so
//! implementations keep mutable state and only need to be [`Send`] to move
//! onto a worker thread.
//!
//! # Determinism
//!
//! [`PcgSource`] produces the same face sequence for the same seed, which
//! makes whole simulation sessions reproducible. [`ScriptedSource`] replays a
//! fixed sequence and is the tool for exercising exact game situations.

use thiserror::Error;

/// Failures raised while drawing faces.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RandomSourceError {
    #[error("random source exhausted after {draws} draws")]
    Exhausted { draws: u64 },

    #[error("random source produced face {face} outside [1, {sides}]")]
    FaceOutOfRange { face: u32, sides: u32 },
}

/// Supplier of uniformly distributed die faces.
pub trait RandomSource: Send {
    /// Draw one face in `[1, sides]` inclusive.
    ///
    /// `sides` is at least 1; callers check this before drawing.
    fn next_face(&mut self, sides: u32) -> Result<u32, RandomSourceError>;
}

impl<S: RandomSource + ?Sized> RandomSource for Box<S> {
    fn next_face(&mut self, sides: u32) -> Result<u32, RandomSourceError> {
        (**self).next_face(sides)
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// Uses the PCG-XSH-RR variant: 64 bits of LCG state permuted into 32 bits of
/// output. Faces are drawn with rejection sampling so every face of a die is
/// equally likely regardless of the side count.
///
/// # References
///
/// - PCG paper: <https://www.pcg-random.org/>
#[derive(Clone, Debug)]
pub struct PcgSource {
    state: u64,
}

impl PcgSource {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    /// Creates a source whose output is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        let mut source = Self {
            state: Self::pcg_step(seed.wrapping_add(Self::INCREMENT)),
        };
        source.next_u32();
        source
    }

    /// Advance the PCG state by one step.
    ///
    /// `state' = (state × multiplier + increment) mod 2^64`
    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation (xorshift high, random rotate).
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Returns the next raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.state = Self::pcg_step(old);
        Self::pcg_output(old)
    }
}

impl RandomSource for PcgSource {
    fn next_face(&mut self, sides: u32) -> Result<u32, RandomSourceError> {
        // Outputs below the threshold would bias the low faces.
        let threshold = sides.wrapping_neg() % sides;
        loop {
            let raw = self.next_u32();
            if raw >= threshold {
                return Ok(raw % sides + 1);
            }
        }
    }
}

/// Replays a predetermined sequence of faces.
///
/// A one-shot script faults with [`RandomSourceError::Exhausted`] once every
/// face has been handed out; a cycling script wraps around forever.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    faces: Vec<u32>,
    cursor: usize,
    cycle: bool,
    draws: u64,
}

impl ScriptedSource {
    /// Hands out `faces` once, then faults.
    pub fn new(faces: impl Into<Vec<u32>>) -> Self {
        Self {
            faces: faces.into(),
            cursor: 0,
            cycle: false,
            draws: 0,
        }
    }

    /// Hands out `faces` in a loop.
    pub fn cycling(faces: impl Into<Vec<u32>>) -> Self {
        Self {
            cycle: true,
            ..Self::new(faces)
        }
    }

    /// Number of faces drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for ScriptedSource {
    fn next_face(&mut self, sides: u32) -> Result<u32, RandomSourceError> {
        if self.cursor == self.faces.len() {
            if !self.cycle || self.faces.is_empty() {
                return Err(RandomSourceError::Exhausted { draws: self.draws });
            }
            self.cursor = 0;
        }

        let face = self.faces[self.cursor];
        if face == 0 || face > sides {
            return Err(RandomSourceError::FaceOutOfRange { face, sides });
        }

        self.cursor += 1;
        self.draws += 1;
        Ok(face)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pcg_is_deterministic_per_seed() {
        let mut a = PcgSource::new(42);
        let mut b = PcgSource::new(42);
        let left: Vec<u32> = (0..32).map(|_| a.next_u32()).collect();
        let right: Vec<u32> = (0..32).map(|_| b.next_u32()).collect();
        assert_eq!(left, right);

        let mut c = PcgSource::new(43);
        let other: Vec<u32> = (0..32).map(|_| c.next_u32()).collect();
        assert_ne!(left, other);
    }

    #[test]
    fn pcg_faces_cover_the_die() {
        let mut source = PcgSource::new(7);
        let mut seen = [0u32; 6];
        for _ in 0..6000 {
            let face = source.next_face(6).unwrap();
            assert!((1..=6).contains(&face));
            seen[(face - 1) as usize] += 1;
        }
        // Loose bound: each face should land near 1000.
        for count in seen {
            assert!((800..1200).contains(&count), "skewed face count {count}");
        }
    }

    #[test]
    fn pcg_single_sided_die_always_one() {
        let mut source = PcgSource::new(0);
        for _ in 0..16 {
            assert_eq!(source.next_face(1).unwrap(), 1);
        }
    }

    #[test]
    fn scripted_source_exhausts() {
        let mut source = ScriptedSource::new([1, 2]);
        assert_eq!(source.next_face(6), Ok(1));
        assert_eq!(source.next_face(6), Ok(2));
        assert_eq!(
            source.next_face(6),
            Err(RandomSourceError::Exhausted { draws: 2 })
        );
    }

    #[test]
    fn scripted_source_cycles() {
        let mut source = ScriptedSource::cycling([3, 4]);
        let faces: Vec<u32> = (0..5).map(|_| source.next_face(6).unwrap()).collect();
        assert_eq!(faces, vec![3, 4, 3, 4, 3]);
        assert_eq!(source.draws(), 5);
    }

    #[test]
    fn scripted_source_rejects_impossible_faces() {
        let mut source = ScriptedSource::cycling([9]);
        assert_eq!(
            source.next_face(6),
            Err(RandomSourceError::FaceOutOfRange { face: 9, sides: 6 })
        );

        let mut empty = ScriptedSource::cycling(Vec::<u32>::new());
        assert!(matches!(
            empty.next_face(6),
            Err(RandomSourceError::Exhausted { draws: 0 })
        ));
    }
}
