//! Validation of raw text coming from the presentation layer.
//! Everything here runs before any storage access.

use crate::db::ItemId;
use crate::error::StockError;

/// Trimmed, non-empty item name.
pub fn require_name(raw: &str) -> Result<&str, StockError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(StockError::validation("item name", "required"));
    }
    Ok(name)
}

pub fn parse_quantity(raw: &str) -> Result<i64, StockError> {
    parse_integer("quantity", raw)
}

pub fn parse_item_id(raw: &str) -> Result<ItemId, StockError> {
    parse_integer("item id", raw)
}

fn parse_integer(field: &'static str, raw: &str) -> Result<i64, StockError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(StockError::validation(field, "required"));
    }
    s.parse::<i64>()
        .map_err(|_| StockError::validation(field, format!("'{s}' is not a whole number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_parses() {
        assert_eq!(parse_quantity(" 12 ").unwrap(), 12);
        assert_eq!(parse_quantity("-3").unwrap(), -3);
        assert_eq!(parse_item_id("7").unwrap(), 7);
        assert_eq!(require_name("  Widget ").unwrap(), "Widget");
    }

    #[test]
    fn rejects_empty_and_non_numeric() {
        assert!(parse_quantity("").unwrap_err().is_validation());
        assert!(parse_quantity("   ").unwrap_err().is_validation());
        assert!(parse_quantity("five").unwrap_err().is_validation());
        assert!(parse_item_id("1.5").unwrap_err().is_validation());
        assert!(require_name(" \t").unwrap_err().is_validation());
    }
}
