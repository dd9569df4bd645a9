use anyhow::{Context, Result};

use crate::config::NestConfig;
use crate::io::ext_repr::ExtNestInput;

/// Serde representations of inputs and solutions
pub mod ext_repr;

/// Conversion of solutions into their external representation
pub mod export;

/// Validation and conversion of inputs into internal entities
pub mod import;

/// Parses a problem instance from JSON
pub fn parse_input(json: &str) -> Result<ExtNestInput> {
    serde_json::from_str(json).context("failed to parse nesting input")
}

/// Parses a [`NestConfig`] from JSON, missing fields take their default value
pub fn parse_config(json: &str) -> Result<NestConfig> {
    serde_json::from_str(json).context("failed to parse nesting configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ext_repr::ExtShape;

    #[test]
    fn parses_minimal_input() {
        let input = parse_input(
            r#"{
                "items": [
                    {"id": 7, "quantity": 2, "shape": {"type": "rectangle", "data": {"x_min": 0, "y_min": 0, "width": 2, "height": 1}}},
                    {"id": 8, "allowed_rotations": [0, 180], "shape": {"type": "simple_polygon", "data": [[0, 0], [1, 0], [0, 1]]}}
                ],
                "bins": [{"id": 1, "stock": 3, "shape": {"type": "rectangle", "data": {"x_min": 0, "y_min": 0, "width": 10, "height": 10}}}]
            }"#,
        )
        .unwrap();
        assert_eq!(input.items.len(), 2);
        assert_eq!(input.items[0].quantity, 2);
        assert_eq!(input.items[1].quantity, 1);
        assert_eq!(input.items[1].priority, 0);
        assert!(matches!(input.items[1].shape, ExtShape::SimplePolygon(_)));
        assert_eq!(input.bins[0].stock, Some(3));
    }

    #[test]
    fn malformed_input_has_context() {
        let err = parse_input("{\"items\": 3}").unwrap_err();
        assert!(err.to_string().contains("nesting input"));
    }
}
