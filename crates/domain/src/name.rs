use derive_more::{AsRef, Display};

/// Canonical form of an exercise name used for matching.
///
/// Two names that standardize to the same string are treated as the same
/// exercise unless their template ids explicitly disagree.
#[must_use]
pub fn standardize_name(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut pending_space = false;
    for c in input.trim().chars() {
        let c = match c {
            '-' | '_' => ' ',
            c => c,
        };
        if c.is_whitespace() {
            pending_space = !result.is_empty();
        } else if c.is_alphanumeric() {
            if pending_space {
                result.push(' ');
                pending_space = false;
            }
            result.extend(c.to_lowercase());
        }
    }
    result
}

#[derive(AsRef, Debug, Display, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StandardizedName(String);

impl StandardizedName {
    pub fn new(name: &str) -> Self {
        Self(standardize_name(name))
    }
}

impl From<&str> for StandardizedName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Bench Press", "bench press")]
    #[case("Bench-Press ", "bench press")]
    #[case("bench press", "bench press")]
    #[case("  Incline   Bench  ", "incline bench")]
    #[case("leg_press", "leg press")]
    #[case("Squat (High Bar)", "squat high bar")]
    #[case("21s!", "21s")]
    #[case("", "")]
    #[case("---", "")]
    fn test_standardize_name(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(standardize_name(input), expected);
    }

    #[rstest]
    #[case("Bench-Press ")]
    #[case("  Incline   Bench  ")]
    #[case("Squat (High Bar)")]
    fn test_standardize_name_idempotent(#[case] input: &str) {
        assert_eq!(
            standardize_name(&standardize_name(input)),
            standardize_name(input)
        );
    }

    #[test]
    fn test_standardized_name_equality() {
        assert_eq!(
            StandardizedName::new("Bench-Press "),
            StandardizedName::from("bench press")
        );
    }
}
