//! Observation token parsing.
//!
//! BODC data rows fuse an optional quality flag letter onto the end of each
//! numeric value (`4.1790`, `-99.0000N`, `3.2100M`). This module splits a raw
//! token into its value and [`QualityFlag`].

use crate::error::{Result, TideError};
use crate::models::QualityFlag;

/// Parse one measurement token into `(value, flag)`.
///
/// A token ending in a digit is a plain value with [`QualityFlag::NoError`].
/// Otherwise the last character must be `M`, `N` or `T` and the remainder is
/// the value.
pub fn parse_observation(token: &str) -> Result<(f64, QualityFlag)> {
    let Some(last) = token.chars().last() else {
        return Err(TideError::MalformedValue {
            token: token.to_string(),
        });
    };

    if last.is_ascii_digit() {
        return Ok((parse_value(token, token)?, QualityFlag::NoError));
    }

    let flag = QualityFlag::from_letter(last).ok_or_else(|| TideError::UnrecognizedFlag {
        token: token.to_string(),
    })?;
    let value = parse_value(&token[..token.len() - last.len_utf8()], token)?;

    Ok((value, flag))
}

fn parse_value(number: &str, token: &str) -> Result<f64> {
    number
        .trim()
        .parse::<f64>()
        .map_err(|_| TideError::MalformedValue {
            token: token.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_value_has_no_error_flag() {
        assert_eq!(
            parse_observation("4.1790").unwrap(),
            (4.179, QualityFlag::NoError)
        );
        assert_eq!(
            parse_observation("-0.0830").unwrap(),
            (-0.083, QualityFlag::NoError)
        );
        assert_eq!(parse_observation("12").unwrap(), (12.0, QualityFlag::NoError));
    }

    #[test]
    fn test_flag_letters() {
        assert_eq!(
            parse_observation("3.2100M").unwrap(),
            (3.21, QualityFlag::Improbable)
        );
        assert_eq!(
            parse_observation("-99.0000N").unwrap(),
            (-99.0, QualityFlag::Null)
        );
        assert_eq!(
            parse_observation("1.5T").unwrap(),
            (1.5, QualityFlag::Interpolated)
        );
    }

    #[test]
    fn test_flag_ids_match_lookup_table() {
        let flags: Vec<i64> = ["1.0", "1.0M", "1.0N", "1.0T"]
            .iter()
            .map(|token| parse_observation(token).unwrap().1.id())
            .collect();
        assert_eq!(flags, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unrecognised_flag_is_an_error() {
        match parse_observation("1.23X") {
            Err(TideError::UnrecognizedFlag { token }) => assert_eq!(token, "1.23X"),
            other => panic!("Expected UnrecognizedFlag, got {:?}", other),
        }
        // Flags are case sensitive
        assert!(matches!(
            parse_observation("1.23m"),
            Err(TideError::UnrecognizedFlag { .. })
        ));
    }

    #[test]
    fn test_malformed_values() {
        for token in ["", "M", "abcM", "1.2.3", "--4"] {
            match parse_observation(token) {
                Err(TideError::MalformedValue { token: reported }) => assert_eq!(reported, token),
                other => panic!("Expected MalformedValue for '{}', got {:?}", token, other),
            }
        }
    }
}
