//! HTML results page generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use studyquiz_core::scoring::{QuestionResult, QuizResult, ResultStatus};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Minutes and seconds, e.g. `3m 07s`.
fn format_duration(secs: u64) -> String {
    format!("{}m {:02}s", secs / 60, secs % 60)
}

/// Colour band of the score circle.
fn score_band(score: u32) -> &'static str {
    if score >= 90 {
        "high"
    } else if score >= 70 {
        "mid"
    } else {
        "low"
    }
}

/// Generate the results page for one quiz attempt.
pub fn generate_html(result: &QuizResult) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Quiz Results: {}</title>\n",
        html_escape(&result.quiz_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&result.quiz_title)));
    html.push_str(&format!(
        "<p class=\"meta\">Completed {} | Time spent {}</p>\n",
        result.completed_at.format("%Y-%m-%d %H:%M:%S UTC"),
        format_duration(result.time_spent)
    ));
    html.push_str("</header>\n");

    // Score summary
    html.push_str("<section class=\"score-summary\" id=\"scoreSummary\">\n");
    html.push_str(&format!(
        "<div class=\"score-circle {}\"><span id=\"scoreNumber\">{}%</span></div>\n",
        score_band(result.score),
        result.score
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Points</th><td>{}/{}</td></tr>\n",
        result.earned_points, result.total_points
    ));
    html.push_str(&format!(
        "<tr><th>Correct</th><td id=\"correctCount\">{}</td></tr>\n",
        result.correct_answers
    ));
    html.push_str(&format!(
        "<tr><th>Incorrect</th><td id=\"incorrectCount\">{}</td></tr>\n",
        result.incorrect_answers
    ));
    html.push_str(&format!(
        "<tr><th>Unanswered</th><td id=\"unansweredCount\">{}</td></tr>\n",
        result.unanswered
    ));
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    let tier = result.tier();
    html.push_str(&format!(
        "<div class=\"encouragement-message {}\"><p>{}</p></div>\n",
        tier.css_class(),
        html_escape(tier.message())
    ));

    // Answer review
    html.push_str("<section class=\"answer-review\" id=\"answerReview\">\n");
    html.push_str("<h2>Answer Review</h2>\n");
    for detail in &result.detailed_results {
        html.push_str(&review_question(detail));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(result)
            .unwrap_or_default()
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn review_question(detail: &QuestionResult) -> String {
    let (status_class, status_icon) = match detail.status {
        ResultStatus::Correct => ("correct", "&#x2705;"),
        ResultStatus::Incorrect => ("incorrect", "&#x274C;"),
        ResultStatus::Unanswered => ("unanswered", "&#x26A0;&#xFE0F;"),
    };

    let user_answer = match &detail.user_answer {
        Some(answer) => html_escape(&answer.display()),
        None => "<em>No answer provided</em>".to_string(),
    };

    let mut html = format!("<div class=\"review-question {status_class}\">\n");
    html.push_str(&format!(
        "<div class=\"review-header\"><span class=\"review-icon\">{}</span><h3>Question {}</h3><span class=\"review-points\">{}/{} points</span></div>\n",
        status_icon,
        html_escape(detail.question_id.as_str()),
        detail.points_earned,
        detail.total_points
    ));
    html.push_str(&format!(
        "<p class=\"review-question-text\">{}</p>\n",
        html_escape(&detail.question)
    ));
    html.push_str(&format!(
        "<div class=\"review-answer user-answer\"><strong>Your Answer:</strong><p>{user_answer}</p></div>\n"
    ));
    if detail.status != ResultStatus::Correct {
        html.push_str(&format!(
            "<div class=\"review-answer correct-answer\"><strong>Correct Answer:</strong><p>{}</p></div>\n",
            html_escape(&detail.correct_answer)
        ));
    }
    html.push_str("</div>\n");
    html
}

/// Write the results page to a file.
pub fn write_html_report(result: &QuizResult, path: &Path) -> Result<()> {
    let html = generate_html(result);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #f7fafc; --fg: #1a202c; --border: #e2e8f0; --correct: #c6f6d5; --incorrect: #fed7d7; --unanswered: #fefcbf; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #1a202c; --fg: #f7fafc; --border: #4a5568; --correct: #22543d; --incorrect: #742a2a; --unanswered: #744210; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
.meta { color: #718096; }
.score-summary { display: flex; align-items: center; gap: 2rem; }
.score-circle { width: 140px; height: 140px; border-radius: 50%; display: flex; align-items: center; justify-content: center; color: #fff; font-size: 2.2rem; font-weight: bold; }
.score-circle.high { background: linear-gradient(135deg, #38a169 0%, #2f855a 100%); }
.score-circle.mid { background: linear-gradient(135deg, #d69e2e 0%, #b7791f 100%); }
.score-circle.low { background: linear-gradient(135deg, #e53e3e 0%, #c53030 100%); }
table { border-collapse: collapse; }
th, td { border: 1px solid var(--border); padding: 0.4rem 1rem; text-align: left; }
.encouragement-message { border-radius: 15px; padding: 1.5rem; margin: 1rem 0; text-align: center; font-size: 1.1rem; font-weight: 500; box-shadow: 0 4px 20px rgba(0, 0, 0, 0.1); }
.encouragement-message.success { border-left: 6px solid #38a169; }
.encouragement-message.good { border-left: 6px solid #d69e2e; }
.encouragement-message.needs-work { border-left: 6px solid #e53e3e; }
.review-question { border: 1px solid var(--border); border-radius: 8px; padding: 1rem; margin: 1rem 0; }
.review-question.correct { background: var(--correct); }
.review-question.incorrect { background: var(--incorrect); }
.review-question.unanswered { background: var(--unanswered); }
.review-header { display: flex; align-items: center; gap: 0.75rem; }
.review-header h3 { margin: 0; flex: 1; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;
