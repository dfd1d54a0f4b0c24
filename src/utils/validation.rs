use crate::utils::error::{AnalyzerError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_distinct_glyphs(field_name: &str, first: char, second: char) -> Result<()> {
    if first == second {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: first.to_string(),
            reason: "Capital and non-capital glyphs must differ".to_string(),
        });
    }
    if first.is_whitespace() || second.is_whitespace() {
        return Err(AnalyzerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{:?}/{:?}", first, second),
            reason: "Glyphs cannot be whitespace, the empty cell is blank".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output.directory", "data").is_ok());
        assert!(validate_path("output.directory", "").is_err());
        assert!(validate_path("output.directory", "da\0ta").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("raster.height", 20, 1).is_ok());
        assert!(validate_positive_number("raster.height", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("web_map.zoom", 6u8, 0, 22).is_ok());
        assert!(validate_range("web_map.center.lat", -95.0, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_distinct_glyphs() {
        assert!(validate_distinct_glyphs("raster", '●', '·').is_ok());
        assert!(validate_distinct_glyphs("raster", '*', '*').is_err());
        assert!(validate_distinct_glyphs("raster", ' ', '*').is_err());
    }
}
