//! Keyword routing of questions.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Revenue, units, trends, rankings
    Kpi,
    /// Customer feedback and sentiment
    Sentiment,
    General,
}

const KPI_WORDS: &[&str] = &["revenue", "sales", "units", "trend", "top", "leaderboard"];
const SENTIMENT_WORDS: &[&str] = &["sentiment", "feedback", "review", "complaint"];

impl Intent {
    /// Classify a question. Sentiment words win over KPI words.
    pub fn classify(question: &str) -> Self {
        let q = question.to_lowercase();
        if mentions(&q, SENTIMENT_WORDS) {
            Intent::Sentiment
        } else if mentions(&q, KPI_WORDS) {
            Intent::Kpi
        } else {
            Intent::General
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Kpi => "kpi",
            Intent::Sentiment => "sentiment",
            Intent::General => "general",
        }
    }

    /// Table hints appended to the system prompt
    pub fn hints(&self) -> &'static [&'static str] {
        match self {
            Intent::Kpi => &[
                "Revenue and units live in sales_data (TotalRevenue, UnitsSold).",
                "For trends group by DATE(Date) AS Date and order by Date.",
                "For rankings order by the measure descending and apply LIMIT.",
            ],
            Intent::Sentiment => &[
                "Feedback lives in customer_feedback (Sentiment 0..1, Polarity positive/neutral/negative).",
                "For daily sentiment use AVG(Sentiment) grouped by DATE(Date) AS Date.",
                "Join stores on StoreID for locations or regions.",
            ],
            Intent::General => &[],
        }
    }
}

/// Whole-word match, allowing a plural `s`.
fn mentions(question: &str, words: &[&str]) -> bool {
    question
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| words.iter().any(|w| token == *w || token.strip_suffix('s') == Some(*w)))
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Intent::classify("Show revenue trend for the last 30 days"), Intent::Kpi);
        assert_eq!(Intent::classify("Top 5 products by units"), Intent::Kpi);
        assert_eq!(Intent::classify("What's the daily customer sentiment?"), Intent::Sentiment);
        assert_eq!(Intent::classify("Sales vs feedback per store"), Intent::Sentiment);
        assert_eq!(Intent::classify("How many stores are in the West?"), Intent::General);
        assert!(Intent::General.hints().is_empty());
    }

    #[test]
    fn test_whole_words_only() {
        assert_eq!(Intent::classify("Which laptop brands do we carry?"), Intent::General);
        assert_eq!(Intent::classify("List desktop products by category"), Intent::General);
        assert_eq!(Intent::classify("Latest reviews for STORE12"), Intent::Sentiment);
        assert_eq!(Intent::classify("Weekly revenue trends"), Intent::Kpi);
    }
}
