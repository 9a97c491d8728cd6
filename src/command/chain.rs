//! Command chaining with `;` and `&&`
//!
//! `;` separates segments that always run. Inside a segment, `&&` joins steps
//! and the first failing step skips the rest of that segment only.

/// One `;`-separated segment: steps joined by `&&`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSegment {
    pub steps: Vec<String>,
}

/// Split a line into segments and steps
///
/// Empty steps (`a && && b`, trailing `;`) are dropped. Operators inside
/// quotes are not special-cased; the terminal has no quoting.
pub fn split_chain(line: &str) -> Vec<ChainSegment> {
    line.split(';')
        .filter_map(|segment| {
            let steps: Vec<String> = segment
                .split("&&")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            (!steps.is_empty()).then_some(ChainSegment { steps })
        })
        .collect()
}

/// Total number of commands in a split line
pub fn step_count(segments: &[ChainSegment]) -> usize {
    segments.iter().map(|s| s.steps.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_command() {
        let chain = split_chain("help");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].steps, vec!["help"]);
        assert_eq!(step_count(&chain), 1);
    }

    #[test]
    fn test_mixed_operators() {
        let chain = split_chain("joke ; scan && unlock alpha X ;  ; fortune;");
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].steps, vec!["joke"]);
        assert_eq!(chain[1].steps, vec!["scan", "unlock alpha X"]);
        assert_eq!(chain[2].steps, vec!["fortune"]);
        assert_eq!(step_count(&chain), 4);
    }

    #[test]
    fn test_blank_line() {
        assert!(split_chain("  ").is_empty());
    }
}
