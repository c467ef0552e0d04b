//! Judge reply parsing.
//!
//! Evaluator models are asked to answer `YES (0.95): ...` or `NO (0.2): ...`.
//! Real replies drift from that shape, so parsing is lenient:
//!
//! | Step | Rule |
//! |------|------|
//! | Reasoning | `<think>...</think>` blocks are ignored |
//! | Verdict | First standalone `yes`/`pass` or `no`/`fail` word; none means fail |
//! | Confidence | First standalone number in `0..=1` (`0`, `1`, `0.x`, `1.0`) |
//! | Default | `1.0` for pass, `0.0` for fail when no number is given |

use super::value_objects::{EvaluationResult, JudgmentMethod, Verdict};

/// Parse an evaluator reply into an [`EvaluationResult`].
pub fn parse_judgment(reply: &str) -> EvaluationResult {
    let visible = strip_reasoning(reply);

    let verdict = visible
        .split(|c: char| !c.is_alphanumeric())
        .find_map(|word| match word.to_lowercase().as_str() {
            "yes" | "pass" => Some(Verdict::Pass),
            "no" | "fail" => Some(Verdict::Fail),
            _ => None,
        })
        .unwrap_or(Verdict::Fail);

    let confidence = parse_confidence(&visible).unwrap_or(match verdict {
        Verdict::Pass => 1.0,
        Verdict::Fail => 0.0,
    });

    EvaluationResult::new(verdict, confidence, JudgmentMethod::JudgeModel)
        .with_feedback(visible.trim())
}

/// First standalone number of the form `0`, `1`, `0.xxx` or `1.xxx` that lies
/// within `0..=1`.
pub fn parse_confidence(text: &str) -> Option<f64> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|token| token.trim_end_matches('.'))
        .filter(|token| !token.is_empty())
        .find_map(|token| {
            let (int_part, frac_part) = match token.split_once('.') {
                Some((i, f)) => (i, Some(f)),
                None => (token, None),
            };
            if int_part != "0" && int_part != "1" {
                return None;
            }
            if let Some(frac) = frac_part
                && (frac.is_empty() || !frac.chars().all(|c| c.is_ascii_digit()))
            {
                return None;
            }
            token.parse::<f64>().ok().filter(|v| (0.0..=1.0).contains(v))
        })
}

/// Drop `<think>...</think>` sections emitted by reasoning models.
///
/// An unterminated block hides everything after its opening tag.
fn strip_reasoning(reply: &str) -> String {
    let mut out = String::with_capacity(reply.len());
    let mut rest = reply;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
