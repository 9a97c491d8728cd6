//! Fragment code derivation
//!
//! Each code is a pure function of the portfolio dataset, so the same data
//! always yields the same answers. Missing characters fall back to `X`.

use crate::portfolio::Portfolio;

use super::state::ExpectedCodes;

const FALLBACK: char = 'X';

/// ALPHA: initial of the most recent project's name, last alphanumeric of its
/// id, two-digit word count of its name
pub fn compute_alpha(portfolio: &Portfolio) -> String {
    let Some(project) = portfolio.most_recent_project() else {
        return format!("{FALLBACK}{FALLBACK}00");
    };
    let initial = project
        .name
        .chars()
        .find(|c| c.is_alphabetic())
        .map(upper)
        .unwrap_or(FALLBACK);
    let tail = project
        .id
        .chars()
        .rev()
        .find(|c| c.is_alphanumeric())
        .map(upper)
        .unwrap_or(FALLBACK);
    let words = project.name.split_whitespace().count();
    format!("{initial}{tail}{words:02}")
}

/// BETA: first three letters of the most used skill, two-digit usage count
///
/// Ties go to the lexicographically smallest skill name.
pub fn compute_beta(portfolio: &Portfolio) -> String {
    let Some((skill, count)) = portfolio.ranked_skills().into_iter().next() else {
        return format!("{FALLBACK}{FALLBACK}{FALLBACK}00");
    };
    let mut letters: String = skill
        .chars()
        .filter(|c| c.is_alphabetic())
        .map(upper)
        .take(3)
        .collect();
    while letters.chars().count() < 3 {
        letters.push(FALLBACK);
    }
    format!("{letters}{count:02}")
}

/// GAMMA: two-digit count of projects with a demo, two-digit count of
/// distinct keywords
pub fn compute_gamma(portfolio: &Portfolio) -> String {
    format!(
        "{:02}{:02}",
        portfolio.demo_count(),
        portfolio.distinct_keywords().len()
    )
}

/// All three codes at once
pub fn compute_expected(portfolio: &Portfolio) -> ExpectedCodes {
    ExpectedCodes {
        alpha: compute_alpha(portfolio),
        beta: compute_beta(portfolio),
        gamma: compute_gamma(portfolio),
    }
}

fn upper(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::fixtures::sample_portfolio;

    #[test]
    fn test_codes_for_sample() {
        let p = sample_portfolio();
        assert_eq!(compute_alpha(&p), "W202");
        assert_eq!(compute_beta(&p), "RUS02");
        assert_eq!(compute_gamma(&p), "0206");
    }

    #[test]
    fn test_codes_are_pure() {
        let p = sample_portfolio();
        assert_eq!(compute_expected(&p), compute_expected(&p));
    }

    #[test]
    fn test_codes_follow_dataset_changes() {
        let mut p = sample_portfolio();
        p.projects[1].demo = Some("https://example.com/weather".to_string());
        p.projects[1].keywords.push("charts".to_string());
        assert_eq!(compute_gamma(&p), "0307");

        p.projects[1].name = "  42 new things here".to_string();
        assert_eq!(compute_alpha(&p), "N204");
    }

    #[test]
    fn test_beta_tie_breaks_by_name() {
        let mut p = sample_portfolio();
        for project in &mut p.projects {
            project.skills = vec!["Zig".to_string(), "Go".to_string()];
        }
        assert_eq!(compute_beta(&p), "GOX03");
    }

    #[test]
    fn test_empty_dataset_fallbacks() {
        let p = Portfolio::default();
        assert_eq!(compute_alpha(&p), "XX00");
        assert_eq!(compute_beta(&p), "XXX00");
        assert_eq!(compute_gamma(&p), "0000");
    }
}
