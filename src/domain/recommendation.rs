use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// A recommendation is deleted as soon as a downvote leaves its score below this value.
pub const DELETION_THRESHOLD: i32 = -5;

/// Recommendations scoring strictly above this belong to the great band.
pub const GREAT_SCORE_FLOOR: i32 = 10;

/// How many recommendations the recent listing returns.
pub const RECENT_LIMIT: i64 = 10;

/// Probability of drawing from the great band in a random pick.
pub const GREAT_BAND_PROBABILITY: f64 = 0.7;

static YOUTUBE_WATCH_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://www\.youtube\.com/watch\?v=\S+$").expect("valid youtube link pattern")
});

pub fn is_youtube_watch_link(link: &str) -> bool {
    YOUTUBE_WATCH_LINK.is_match(link)
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: i32,
    pub name: String,
    pub youtube_link: String,
    pub score: i32,
}

impl Recommendation {
    pub fn is_below_threshold(&self) -> bool {
        self.score < DELETION_THRESHOLD
    }
}

/// Data needed to create a recommendation. Storage assigns the id and starts the score at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub name: String,
    pub youtube_link: String,
}

impl NewRecommendation {
    pub fn new(name: String, youtube_link: String) -> Self {
        Self { name, youtube_link }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreChange {
    Increment,
    Decrement,
}

impl ScoreChange {
    pub fn delta(self) -> i32 {
        match self {
            ScoreChange::Increment => 1,
            ScoreChange::Decrement => -1,
        }
    }
}

/// Score pools used by the weighted random pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    /// score > 10
    Great,
    /// -5 <= score <= 10
    Regular,
}

impl ScoreBand {
    pub fn from_draw(draw: f64) -> Self {
        if draw <= GREAT_BAND_PROBABILITY {
            ScoreBand::Great
        } else {
            ScoreBand::Regular
        }
    }

    pub fn contains(self, score: i32) -> bool {
        match self {
            ScoreBand::Great => score > GREAT_SCORE_FLOOR,
            ScoreBand::Regular => (DELETION_THRESHOLD..=GREAT_SCORE_FLOOR).contains(&score),
        }
    }

    /// Inclusive score bounds, `None` meaning unbounded.
    pub fn bounds(self) -> (Option<i32>, Option<i32>) {
        match self {
            ScoreBand::Great => (Some(GREAT_SCORE_FLOOR + 1), None),
            ScoreBand::Regular => (Some(DELETION_THRESHOLD), Some(GREAT_SCORE_FLOOR)),
        }
    }
}
