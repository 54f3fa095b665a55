//! Schöck model code parsing.
//!
//! A code such as `T-D-MM1-VV2-REI120-CV35-X80-H170-6.0` is a dash-delimited
//! list of segments; the eighth segment carries the height as `H<digits>`.
//! Leviat codes are never decomposed, they are only compared verbatim
//! against aggregated product type codes.

use std::str::FromStr;

use serde::Serialize;

use crate::error::EquivError;

/// Zero-based index of the height segment.
pub const HEIGHT_SEGMENT: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelCode {
    raw: String,
    segments: Vec<String>,
    height: u32,
}

impl ModelCode {
    pub fn parse(code: &str) -> Result<Self, EquivError> {
        let raw = code.trim();
        let segments: Vec<String> = raw.split('-').map(str::to_string).collect();

        let malformed = |reason: String| EquivError::CodeParse {
            code: raw.to_string(),
            reason,
        };

        let token = segments.get(HEIGHT_SEGMENT).ok_or_else(|| {
            malformed(format!(
                "expected at least {} dash-separated segments, found {}",
                HEIGHT_SEGMENT + 1,
                segments.len()
            ))
        })?;

        let digits = token
            .strip_prefix('H')
            .ok_or_else(|| malformed(format!("height segment '{token}' does not start with 'H'")))?;

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(format!("height segment '{token}' is not numeric")));
        }
        let height = digits
            .parse()
            .map_err(|_| malformed(format!("height segment '{token}' is out of range")))?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
            height,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Product series, e.g. `T` or `XT`.
    pub fn series(&self) -> &str {
        &self.segments[0]
    }

    /// Variant letter following the series, e.g. `D` or `A`.
    pub fn variant(&self) -> &str {
        &self.segments[1]
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl FromStr for ModelCode {
    type Err = EquivError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for ModelCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Height embedded in a Schöck model code.
pub fn parse_height(code: &str) -> Result<u32, EquivError> {
    ModelCode::parse(code).map(|c| c.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reference_code() {
        let code = ModelCode::parse("T-D-MM1-VV2-REI120-CV35-X80-H170-6.0").unwrap();
        assert_eq!(code.height(), 170);
        assert_eq!(code.series(), "T");
        assert_eq!(code.variant(), "D");
        assert_eq!(code.segments().len(), 9);
        assert_eq!(code.segments()[4], "REI120");
    }

    #[test]
    fn parse_trims_whitespace() {
        let code: ModelCode = "  XT-A-M1-V1-REI90-CV30-X120-H200-6.0 \n".parse().unwrap();
        assert_eq!(code.as_str(), "XT-A-M1-V1-REI90-CV30-X120-H200-6.0");
        assert_eq!(code.height(), 200);
    }

    #[test]
    fn exactly_eight_segments_is_enough() {
        assert_eq!(parse_height("T-D-MM1-VV2-REI120-CV35-X80-H160").unwrap(), 160);
    }

    #[test]
    fn too_few_segments_is_parse_error() {
        let err = parse_height("T-D-MM1-VV2-REI120-CV35-H170").unwrap_err();
        match &err {
            EquivError::CodeParse { code, reason } => {
                assert_eq!(code, "T-D-MM1-VV2-REI120-CV35-H170");
                assert!(reason.contains("at least 8"), "{reason}");
                assert!(reason.contains("found 7"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn leviat_code_is_parse_error() {
        assert!(parse_height("HIT-HP MVX-0708-27-100-45").is_err());
    }

    #[test]
    fn non_numeric_height_is_parse_error() {
        assert!(parse_height("T-D-MM1-VV2-REI120-CV35-X80-H17O-6.0").is_err());
        assert!(parse_height("T-D-MM1-VV2-REI120-CV35-X80-H-6.0").is_err());
        assert!(parse_height("T-D-MM1-VV2-REI120-CV35-X80-H+170-6.0").is_err());
    }

    #[test]
    fn height_segment_must_carry_prefix() {
        let err = parse_height("T-D-MM1-VV2-REI120-CV35-X80-170-6.0").unwrap_err();
        assert!(err.to_string().contains("does not start with 'H'"));
    }

    #[test]
    fn empty_segments_still_count() {
        // Eight segments, two of them empty.
        assert_eq!(parse_height("T--MM1-VV2--CV35-X80-H170").unwrap(), 170);
    }
}
