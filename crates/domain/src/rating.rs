use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{DomainError, PhotoId, UserId};

pub const MAX_SCORE: u8 = 10;

/// Retires a photo from circulation once this many users have rated it.
pub const DEFAULT_MAX_RATERS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if !(0..=i64::from(MAX_SCORE)).contains(&value) {
            return Err(DomainError::ScoreOutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl Display for Score {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Wealth,
    Relevance,
}

impl Dimension {
    pub const ALL: [Dimension; 2] = [Dimension::Wealth, Dimension::Relevance];

    /// The score that needs no rationale.
    pub fn neutral_default(self) -> Score {
        match self {
            Self::Wealth => Score(5),
            Self::Relevance => Score(0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wealth => "wealth",
            Self::Relevance => "relevance",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Wealth => "Level of wealth",
            Self::Relevance => "Relevance",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|dimension| dimension.label().eq_ignore_ascii_case(label.trim()))
    }
}

impl Display for Dimension {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn rationale_required(dimension: Dimension, score: Score) -> bool {
    score != dimension.neutral_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingPolicy {
    /// When set, a score left at its displayed default blocks submission.
    pub require_explicit_selection: bool,
    pub max_raters_per_photo: u32,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self {
            require_explicit_selection: true,
            max_raters_per_photo: DEFAULT_MAX_RATERS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftProblem {
    Unselected(Dimension),
    MissingRationale(Dimension),
}

impl From<DraftProblem> for DomainError {
    fn from(value: DraftProblem) -> Self {
        match value {
            DraftProblem::Unselected(dimension) => Self::UnselectedScore(dimension),
            DraftProblem::MissingRationale(dimension) => {
                Self::MissingRationale(dimension, dimension.neutral_default().get())
            }
        }
    }
}

/// One slider plus its rationale box. `score == None` is the unselected marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionInput {
    pub score: Option<Score>,
    pub rationale: String,
}

impl DimensionInput {
    pub fn displayed_score(&self, dimension: Dimension) -> Score {
        self.score.unwrap_or_else(|| dimension.neutral_default())
    }

    fn effective_score(&self, dimension: Dimension, policy: RatingPolicy) -> Option<Score> {
        match self.score {
            Some(score) => Some(score),
            None if policy.require_explicit_selection => None,
            None => Some(dimension.neutral_default()),
        }
    }

    fn problem(&self, dimension: Dimension, policy: RatingPolicy) -> Option<DraftProblem> {
        let Some(score) = self.effective_score(dimension, policy) else {
            return Some(DraftProblem::Unselected(dimension));
        };
        if rationale_required(dimension, score) && self.rationale.trim().is_empty() {
            return Some(DraftProblem::MissingRationale(dimension));
        }
        None
    }

    fn stored_rationale(&self, dimension: Dimension, score: Score) -> Option<String> {
        rationale_required(dimension, score).then(|| self.rationale.trim().to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingDraft {
    pub wealth: DimensionInput,
    pub relevance: DimensionInput,
}

impl RatingDraft {
    pub fn input(&self, dimension: Dimension) -> &DimensionInput {
        match dimension {
            Dimension::Wealth => &self.wealth,
            Dimension::Relevance => &self.relevance,
        }
    }

    pub fn input_mut(&mut self, dimension: Dimension) -> &mut DimensionInput {
        match dimension {
            Dimension::Wealth => &mut self.wealth,
            Dimension::Relevance => &mut self.relevance,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn problems(&self, policy: RatingPolicy) -> Vec<DraftProblem> {
        Dimension::ALL
            .into_iter()
            .filter_map(|dimension| self.input(dimension).problem(dimension, policy))
            .collect()
    }

    pub fn is_complete(&self, policy: RatingPolicy) -> bool {
        self.problems(policy).is_empty()
    }

    pub fn to_rating(
        &self,
        user_id: &UserId,
        photo_id: &PhotoId,
        policy: RatingPolicy,
    ) -> Result<Rating, DomainError> {
        if let Some(problem) = self.problems(policy).into_iter().next() {
            return Err(problem.into());
        }

        let wealth = self
            .wealth
            .effective_score(Dimension::Wealth, policy)
            .ok_or(DomainError::UnselectedScore(Dimension::Wealth))?;
        let relevance = self
            .relevance
            .effective_score(Dimension::Relevance, policy)
            .ok_or(DomainError::UnselectedScore(Dimension::Relevance))?;

        Ok(Rating {
            user_id: user_id.clone(),
            photo_id: photo_id.clone(),
            wealth_score: wealth,
            wealth_rationale: self.wealth.stored_rationale(Dimension::Wealth, wealth),
            relevance_score: relevance,
            relevance_rationale: self
                .relevance
                .stored_rationale(Dimension::Relevance, relevance),
        })
    }
}

/// Stored per (user, photo); a later submission for the same pair replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub photo_id: PhotoId,
    pub wealth_score: Score,
    pub wealth_rationale: Option<String>,
    pub relevance_score: Score,
    pub relevance_rationale: Option<String>,
}
