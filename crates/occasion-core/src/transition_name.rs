//! Decoding of coloured transition names.
//!
//! The model DSL names every follow-style transition
//! `{prefix}{input_state}{output_state}`, with single-character state
//! labels. The last two characters are therefore the input and output
//! states and anything before them is the prefix. Underscores are not
//! allowed anywhere: the simulator uses them to separate the colour
//! indices appended to column names.

use std::fmt;

/// Errors raised for a transition name that does not follow the
/// `{prefix}{input}{output}` convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("transition name '{0}' is too short: expected a prefix followed by two state characters")]
    TooShort(String),
    #[error("transition name '{name}' has invalid state character '{state}'")]
    InvalidState { name: String, state: char },
    #[error("transition name '{0}' has an underscore in its prefix")]
    UnderscoreInPrefix(String),
}

/// A decoded transition name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransitionName {
    pub prefix: String,
    pub input_state: char,
    pub output_state: char,
}

impl TransitionName {
    /// Split `name` into prefix, input state and output state.
    ///
    /// # Examples
    ///
    /// ```
    /// use occasion_core::transition_name::TransitionName;
    ///
    /// let name = TransitionName::decode("prefixab").unwrap();
    /// assert_eq!(name.prefix, "prefix");
    /// assert_eq!(name.input_state, 'a');
    /// assert_eq!(name.output_state, 'b');
    /// ```
    pub fn decode(name: &str) -> Result<Self, NameError> {
        let mut chars = name.chars().rev();
        let (Some(output_state), Some(input_state)) = (chars.next(), chars.next()) else {
            return Err(NameError::TooShort(name.to_string()));
        };

        for state in [input_state, output_state] {
            if !state.is_alphanumeric() {
                return Err(NameError::InvalidState {
                    name: name.to_string(),
                    state,
                });
            }
        }

        let prefix_len = name.len() - input_state.len_utf8() - output_state.len_utf8();
        let prefix = &name[..prefix_len];
        if prefix.contains('_') {
            return Err(NameError::UnderscoreInPrefix(name.to_string()));
        }

        Ok(Self {
            prefix: prefix.to_string(),
            input_state,
            output_state,
        })
    }

    /// Rebuild the encoded name.
    pub fn encode(&self) -> String {
        format!("{}{}{}", self.prefix, self.input_state, self.output_state)
    }

    pub fn input_label(&self) -> String {
        self.input_state.to_string()
    }

    pub fn output_label(&self) -> String {
        self.output_state.to_string()
    }
}

impl fmt::Display for TransitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, self.input_state, self.output_state)
    }
}

impl std::str::FromStr for TransitionName {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransitionName::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_splits_last_two_characters() {
        let name = TransitionName::decode("prefixab").unwrap();
        assert_eq!(
            name,
            TransitionName {
                prefix: "prefix".to_string(),
                input_state: 'a',
                output_state: 'b',
            }
        );
    }

    #[test]
    fn decode_allows_empty_prefix() {
        let name = TransitionName::decode("ab").unwrap();
        assert_eq!(name.prefix, "");
        assert_eq!(name.input_label(), "a");
        assert_eq!(name.output_label(), "b");
    }

    #[test]
    fn encode_round_trips() {
        for raw in ["f1ab", "ab", "follow2ba", "x9yz"] {
            assert_eq!(TransitionName::decode(raw).unwrap().encode(), raw);
        }
    }

    #[test]
    fn too_short_names_fail_and_name_the_string() {
        for raw in ["", "a"] {
            let err = TransitionName::decode(raw).unwrap_err();
            assert_eq!(err, NameError::TooShort(raw.to_string()));
            assert!(err.to_string().contains(&format!("'{raw}'")));
        }
    }

    #[test]
    fn punctuation_state_fails() {
        let err = TransitionName::decode("f1a-").unwrap_err();
        assert!(matches!(err, NameError::InvalidState { state: '-', .. }));
        assert!(err.to_string().contains("f1a-"));
    }

    #[test]
    fn underscore_state_fails() {
        let err = TransitionName::decode("f1_b").unwrap_err();
        assert!(matches!(err, NameError::InvalidState { state: '_', .. }));
    }

    #[test]
    fn underscore_in_prefix_fails() {
        let err = TransitionName::decode("with_underscoreab").unwrap_err();
        assert_eq!(
            err,
            NameError::UnderscoreInPrefix("with_underscoreab".to_string())
        );
    }

    #[test]
    fn parses_via_from_str() {
        let name: TransitionName = "f1ab".parse().unwrap();
        assert_eq!(name.to_string(), "f1ab");
    }
}
