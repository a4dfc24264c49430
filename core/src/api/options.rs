//! Evaluation options.

use bitflags::bitflags;

bitflags! {
    /// Flags controlling evaluation behavior.
    ///
    /// The default is the empty set: case-sensitive function names, banker's rounding
    /// and per-node caching enabled.
    ///
    /// # Example
    ///
    /// ```
    /// use tally_core::api::EvaluateOptions;
    ///
    /// let options = EvaluateOptions::IGNORE_CASE | EvaluateOptions::ROUND_AWAY_FROM_ZERO;
    /// assert!(options.contains(EvaluateOptions::IGNORE_CASE));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EvaluateOptions: u32 {
        /// Match function names case-insensitively. Names handed to the function hooks
        /// are lower-cased.
        const IGNORE_CASE = 1 << 0;

        /// Do not reuse resolutions cached on tree nodes; run the full lookup chain on
        /// every evaluation.
        const NO_CACHE = 1 << 1;

        /// `Round` resolves midpoints away from zero instead of to the nearest even.
        const ROUND_AWAY_FROM_ZERO = 1 << 2;
    }
}

impl EvaluateOptions {
    pub fn ignore_case(self) -> bool {
        self.contains(EvaluateOptions::IGNORE_CASE)
    }

    pub fn use_cache(self) -> bool {
        !self.contains(EvaluateOptions::NO_CACHE)
    }

    pub fn round_away_from_zero(self) -> bool {
        self.contains(EvaluateOptions::ROUND_AWAY_FROM_ZERO)
    }
}
