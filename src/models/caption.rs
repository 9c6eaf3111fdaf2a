use serde::{Deserialize, Serialize};

/// One line of user text driving one panel. Positions are 1-based and
/// contiguous in caption order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    pub position: usize,
}

impl Caption {
    pub fn new(text: impl Into<String>, position: usize) -> Self {
        Self {
            text: text.into(),
            position,
        }
    }
}

/// Splits raw multi-line input into captions, trimming each line and
/// dropping blank ones. The surviving lines are numbered 1..=N.
pub fn parse_captions(raw: &str) -> Vec<Caption> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| Caption::new(line, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_captions_skips_blank_lines() {
        let raw = "A hero wakes up\n\n   \nThe hero finds a map\n  The hero sets sail  \n";
        let captions = parse_captions(raw);

        assert_eq!(captions.len(), 3);
        assert_eq!(captions[0], Caption::new("A hero wakes up", 1));
        assert_eq!(captions[1], Caption::new("The hero finds a map", 2));
        assert_eq!(captions[2], Caption::new("The hero sets sail", 3));
    }

    #[test]
    fn test_parse_captions_empty_input() {
        assert!(parse_captions("").is_empty());
        assert!(parse_captions("\n  \n\t\n").is_empty());
    }

    #[test]
    fn test_positions_are_contiguous() {
        let captions = parse_captions("a\n\nb\n\n\nc\nd");
        let positions: Vec<usize> = captions.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
    }
}
