//! A single throw of one or more dice.

use crate::rng::{RandomSource, RandomSourceError};

/// Faces shown by one throw of the dice, plus their sum.
///
/// Immutable once constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roll {
    dice: Vec<u32>,
    value: u32,
}

impl Roll {
    /// Throws `dice` dice with `sides` sides each, drawing from `source`.
    ///
    /// # Panics
    ///
    /// Panics if `dice` or `sides` is zero.
    pub fn roll<R>(source: &mut R, dice: usize, sides: u32) -> Result<Self, RandomSourceError>
    where
        R: RandomSource + ?Sized,
    {
        assert!(dice >= 1, "a roll needs at least one die");
        assert!(sides >= 1, "a die needs at least one side");

        let faces = (0..dice)
            .map(|_| source.next_face(sides))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_faces(faces))
    }

    /// Builds a roll from faces that were already drawn.
    ///
    /// # Panics
    ///
    /// Panics if `faces` is empty.
    pub fn from_faces(faces: impl Into<Vec<u32>>) -> Self {
        let dice = faces.into();
        assert!(!dice.is_empty(), "a roll needs at least one die");
        let value = dice.iter().sum();
        Self { dice, value }
    }

    pub fn dice(&self) -> &[u32] {
        &self.dice
    }

    /// Sum of all faces.
    pub fn value(&self) -> u32 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{PcgSource, ScriptedSource};

    #[test]
    fn faces_stay_on_the_die_and_sum_to_value() {
        let mut source = PcgSource::new(2024);
        for (dice, sides) in [(1, 1), (2, 6), (3, 4), (5, 20)] {
            for _ in 0..200 {
                let roll = Roll::roll(&mut source, dice, sides).unwrap();
                assert_eq!(roll.dice().len(), dice);
                assert!(roll.dice().iter().all(|&face| (1..=sides).contains(&face)));
                assert_eq!(roll.value(), roll.dice().iter().sum::<u32>());
                assert!(roll.value() >= dice as u32 && roll.value() <= dice as u32 * sides);
            }
        }
    }

    #[test]
    fn scripted_faces_are_kept_in_order() {
        let mut source = ScriptedSource::new([3, 4]);
        let roll = Roll::roll(&mut source, 2, 6).unwrap();
        assert_eq!(roll.dice(), &[3, 4]);
        assert_eq!(roll.value(), 7);
    }

    #[test]
    fn source_fault_propagates() {
        let mut source = ScriptedSource::new([5]);
        let err = Roll::roll(&mut source, 2, 6).unwrap_err();
        assert_eq!(err, RandomSourceError::Exhausted { draws: 1 });
    }

    #[test]
    #[should_panic(expected = "at least one die")]
    fn zero_dice_is_a_programming_error() {
        let mut source = PcgSource::new(1);
        let _ = Roll::roll(&mut source, 0, 6);
    }

    #[test]
    #[should_panic(expected = "at least one side")]
    fn zero_sides_is_a_programming_error() {
        let mut source = PcgSource::new(1);
        let _ = Roll::roll(&mut source, 2, 0);
    }
}
