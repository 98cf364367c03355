//! Score calculation

/// Every scan starts here; rules only subtract
pub const START_SCORE: u8 = 100;

/// Calculator for cleanliness scores
pub struct ScoreCalculator;

impl ScoreCalculator {
    /// Subtract all deductions from the starting score, clamped to 0..=100
    pub fn from_deductions<I>(deductions: I) -> u8
    where
        I: IntoIterator<Item = u8>,
    {
        let penalty: i32 = deductions.into_iter().map(i32::from).sum();
        (START_SCORE as i32 - penalty).clamp(0, START_SCORE as i32) as u8
    }

    /// Short label for a score, used by the console summary
    pub fn label(score: u8) -> &'static str {
        match score {
            100 => "Ready to submit",
            75..=99 => "Nearly there",
            50..=74 => "Needs cleanup",
            _ => "Not submittable",
        }
    }
}
