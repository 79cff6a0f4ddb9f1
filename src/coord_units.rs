//! The coordinate system of gradient geometry.
//!
//! With `objectBoundingBox`, `x1`, `cx` and the other geometry attributes
//! are fractions of the painted item's bounding box; with
//! `userSpaceOnUse` they are plain user-space coordinates.  Mapping
//! either one to device space is up to the paint layer.

use cssparser::Parser;

use crate::error::*;
use crate::parse_identifiers;
use crate::parsers::Parse;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordUnits {
    UserSpaceOnUse,
    ObjectBoundingBox,
}

impl Parse for CoordUnits {
    fn parse<'i>(parser: &mut Parser<'i, '_>) -> Result<Self, ParseError<'i>> {
        Ok(parse_identifiers!(
            parser,
            "userSpaceOnUse" => CoordUnits::UserSpaceOnUse,
            "objectBoundingBox" => CoordUnits::ObjectBoundingBox,
        )?)
    }
}

/// Declares an attribute type holding `CoordUnits`, whose value when the
/// attribute is missing is `$default`.
#[doc(hidden)]
#[macro_export]
macro_rules! coord_units {
    ($name:ident, $default:expr) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub struct $name(pub $crate::coord_units::CoordUnits);

        impl Default for $name {
            fn default() -> Self {
                $name($default)
            }
        }

        impl From<$name> for $crate::coord_units::CoordUnits {
            fn from(u: $name) -> Self {
                u.0
            }
        }

        impl $crate::parsers::Parse for $name {
            fn parse<'i>(
                parser: &mut ::cssparser::Parser<'i, '_>,
            ) -> Result<Self, $crate::error::ParseError<'i>> {
                Ok($name($crate::coord_units::CoordUnits::parse(parser)?))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    coord_units!(MaskUnits, CoordUnits::UserSpaceOnUse);

    #[test]
    fn keywords_ignore_case() {
        assert_eq!(
            CoordUnits::parse_str("userSpaceOnUse").unwrap(),
            CoordUnits::UserSpaceOnUse
        );
        assert_eq!(
            CoordUnits::parse_str("objectboundingbox").unwrap(),
            CoordUnits::ObjectBoundingBox
        );
    }

    #[test]
    fn unknown_units_are_errors() {
        assert!(CoordUnits::parse_str("").is_err());
        assert!(CoordUnits::parse_str("strokeBox").is_err());
        assert!(CoordUnits::parse_str("userSpaceOnUse objectBoundingBox").is_err());
    }

    #[test]
    fn attribute_type_has_its_own_default() {
        assert_eq!(MaskUnits::default(), MaskUnits(CoordUnits::UserSpaceOnUse));
        assert_eq!(
            CoordUnits::from(MaskUnits::parse_str("objectBoundingBox").unwrap()),
            CoordUnits::ObjectBoundingBox
        );
    }
}
