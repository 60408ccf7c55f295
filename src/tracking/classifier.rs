//! The per-attribute classifier contract.

use super::geometry::Region;
use super::score::ScoreSlots;

/// Classifies the card inside one region of a frame.
///
/// Implementations wrap whatever model is in use; the engine only needs a
/// best label per attribute. Returning `None` or an empty [`ScoreSlots`]
/// counts as a miss. The region is always non-empty and inside the frame.
///
/// `Frame` is whatever pixel container the caller feeds the engine; the
/// engine never inspects it.
pub trait AttributeClassifier {
    type Frame: ?Sized;

    fn classify(&mut self, frame: &Self::Frame, region: &Region) -> Option<ScoreSlots>;
}

impl<T: AttributeClassifier + ?Sized> AttributeClassifier for Box<T> {
    type Frame = T::Frame;

    fn classify(&mut self, frame: &Self::Frame, region: &Region) -> Option<ScoreSlots> {
        (**self).classify(frame, region)
    }
}
