use super::markers::FINAL_REPORT_MARKER;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Quiz length assumed when the report omits the score sentence.
pub const DEFAULT_QUIZ_TOTAL: u32 = 4;

/// `총 N문제 중 M문제를 맞혔습니다` — total, then correct.
static QUIZ_SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"총\s*(\d+)\s*문제\s*중\s*(\d+)\s*문제를\s*맞혔습니다")
        .expect("QUIZ_SCORE_RE regex should compile")
});

/// `문장 완성 지도가 K회 제공되었습니다`.
static GUIDANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"문장\s*완성\s*지도가\s*(\d+)\s*회\s*제공되었습니다")
        .expect("GUIDANCE_RE regex should compile")
});

/// Summary sentences stripped from the tutor's closing remark.
static SUMMARY_SENTENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s*(?:총\s*\d+\s*문제\s*중\s*\d+\s*문제를\s*맞혔습니다|(?:자유\s*대화\s*중\s*)?문장\s*완성\s*지도가\s*\d+\s*회\s*제공되었습니다)\.?",
    )
    .expect("SUMMARY_SENTENCE_RE regex should compile")
});

/// Figures pulled out of the `## FINAL REPORT ##` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizReport {
    pub total_questions: u32,
    pub correct_answers: u32,
    pub guidance_count: u32,
    /// The report with the marker and summary sentences removed.
    pub remark: String,
}

impl QuizReport {
    /// Share of correct quiz answers, 0–100.
    pub fn accuracy_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        let ratio = f64::from(self.correct_answers) / f64::from(self.total_questions);
        (ratio * 100.0).clamp(0.0, 100.0)
    }
}

/// Extract report fields, falling back to `total = 4, correct = 0, guidance = 0`.
pub fn parse_report(text: &str) -> QuizReport {
    parse_report_with_default(text, DEFAULT_QUIZ_TOTAL)
}

/// Like [`parse_report`] with a caller-chosen fallback quiz length.
///
/// Never fails: a missing or unparsable field takes its fallback value.
pub fn parse_report_with_default(text: &str, default_total: u32) -> QuizReport {
    let (total_questions, correct_answers) = QUIZ_SCORE_RE
        .captures(text)
        .and_then(|caps| {
            let total = caps.get(1)?.as_str().parse::<u32>().ok()?;
            let correct = caps.get(2)?.as_str().parse::<u32>().ok()?;
            Some((total, correct))
        })
        .unwrap_or((default_total, 0));

    let guidance_count = GUIDANCE_RE
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse::<u32>().ok())
        .unwrap_or(0);

    QuizReport {
        total_questions,
        correct_answers,
        guidance_count,
        remark: extract_remark(text),
    }
}

fn extract_remark(text: &str) -> String {
    let without_marker = text.replace(FINAL_REPORT_MARKER, "");
    SUMMARY_SENTENCE_RE
        .replace_all(&without_marker, "")
        .trim()
        .to_string()
}
