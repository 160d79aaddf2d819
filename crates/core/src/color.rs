//! Display colors for object classes.
//!
//! Colors are `#rrggbb` hex strings. Auto-registered classes get a uniformly
//! random color; two classes may end up with the same color, so a color is
//! never used to identify a class.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

use crate::error::CoreError;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid hex color regex"));

/// Color assigned when a class is created without one.
pub const DEFAULT_CLASS_COLOR: &str = "#ff0000";

/// Return `true` if `color` is a `#rrggbb` hex string.
pub fn is_hex_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Validate a `#rrggbb` hex color.
pub fn validate_hex_color(color: &str) -> Result<(), CoreError> {
    if is_hex_color(color) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "color must be a hex string like '#ff0000', got '{color}'"
        )))
    }
}

/// Generate a color with each RGB channel drawn uniformly from `0..=255`.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let r: u8 = rng.random();
    let g: u8 = rng.random();
    let b: u8 = rng.random();
    format!("#{r:02x}{g:02x}{b:02x}")
}
