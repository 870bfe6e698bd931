// crates/autobox-core/src/enums.rs
// ============================================================================
// Module: Keyword Enumerations
// Description: Host keywords for units, field types, geometry and workspaces.
// Purpose: Give filter and default payloads a closed, typed vocabulary.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Each enumeration maps one-to-one onto the keyword strings the host
//! application understands. Variants render through [`Display`] and parse
//! back through [`FromStr`] using the exact keyword.
//!
//! [`Display`]: std::fmt::Display
//! [`FromStr`]: std::str::FromStr

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

// ============================================================================
// SECTION: Keyword Macro
// ============================================================================

/// Declares a keyword enumeration with `as_str`, `ALL`, `Display` and `FromStr`.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $keyword:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Returns the host keyword for this variant.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str() == value)
                    .ok_or_else(|| format!("unknown {} keyword: {value}", stringify!($name)))
            }
        }
    };
}

// ============================================================================
// SECTION: Units
// ============================================================================

keyword_enum! {
    /// Areal units accepted by areal unit parameters and filters.
    ArealUnit {
        /// Unknown unit.
        Unknown => "Unknown",
        /// Square inches.
        SquareInches => "SquareInches",
        /// Square feet.
        SquareFeet => "SquareFeet",
        /// Square yards.
        SquareYards => "SquareYards",
        /// Acres.
        Acres => "Acres",
        /// Square miles.
        SquareMiles => "SquareMiles",
        /// Square millimeters.
        SquareMillimeters => "SquareMillimeters",
        /// Square centimeters.
        SquareCentimeters => "SquareCentimeters",
        /// Square decimeters.
        SquareDecimeters => "SquareDecimeters",
        /// Square meters.
        SquareMeters => "SquareMeters",
        /// Ares.
        Ares => "Ares",
        /// Hectares.
        Hectares => "Hectares",
        /// Square kilometers.
        SquareKilometers => "SquareKilometers",
        /// US survey square miles.
        SquareMilesUs => "SquareMilesUS",
        /// US survey acres.
        AcresUs => "AcresUS",
        /// US survey square yards.
        SquareYardsUs => "SquareYardsUS",
        /// US survey square feet.
        SquareFeetUs => "SquareFeetUS",
        /// US survey square inches.
        SquareInchesUs => "SquareInchesUS",
    }
}

keyword_enum! {
    /// Linear units accepted by linear unit parameters and filters.
    LinearUnit {
        /// Unknown unit.
        Unknown => "Unknown",
        /// Inches.
        Inches => "Inches",
        /// International inches.
        InchesInternational => "InchesInt",
        /// Points.
        Points => "Points",
        /// Feet.
        Feet => "Feet",
        /// International feet.
        FeetInternational => "FeetInt",
        /// Yards.
        Yards => "Yards",
        /// Miles.
        Miles => "Miles",
        /// Nautical miles.
        NauticalMiles => "NauticalMiles",
        /// International nautical miles.
        NauticalMilesInternational => "NauticalMilesInt",
        /// International miles.
        MilesInternational => "MilesInt",
        /// International yards.
        YardsInternational => "YardsInt",
        /// Millimeters.
        Millimeters => "Millimeters",
        /// Centimeters.
        Centimeters => "Centimeters",
        /// Meters.
        Meters => "Meters",
        /// Kilometers.
        Kilometers => "Kilometers",
        /// Decimal degrees.
        DecimalDegrees => "DecimalDegrees",
        /// Decimeters.
        Decimeters => "Decimeters",
    }
}

keyword_enum! {
    /// Time units accepted by time unit parameters and filters.
    TimeUnit {
        /// Unknown unit.
        Unknown => "Unknown",
        /// Milliseconds.
        Milliseconds => "Milliseconds",
        /// Seconds.
        Seconds => "Seconds",
        /// Minutes.
        Minutes => "Minutes",
        /// Hours.
        Hours => "Hours",
        /// Days.
        Days => "Days",
        /// Weeks.
        Weeks => "Weeks",
        /// Months.
        Months => "Months",
        /// Years.
        Years => "Years",
        /// Decades.
        Decades => "Decades",
        /// Centuries.
        Centuries => "Centuries",
    }
}

// ============================================================================
// SECTION: Data Types
// ============================================================================

keyword_enum! {
    /// Attribute field types.
    FieldType {
        /// Short integer.
        Short => "Short",
        /// Long integer.
        Long => "Long",
        /// Single precision float.
        Float => "Float",
        /// 64-bit integer.
        BigInteger => "BigInteger",
        /// Double precision float.
        Double => "Double",
        /// Text.
        Text => "Text",
        /// Date and time.
        Date => "Date",
        /// Object identifier.
        Oid => "OID",
        /// Time of day.
        TimeOnly => "TimeOnly",
        /// Calendar date.
        DateOnly => "DateOnly",
        /// Timestamp with offset.
        TimestampOffset => "TimestampOffset",
        /// Geometry.
        Geometry => "Geometry",
        /// Binary large object.
        Blob => "Blob",
        /// Raster.
        Raster => "Raster",
        /// GUID.
        Guid => "GUID",
        /// Global identifier.
        GlobalId => "GlobalID",
        /// XML document.
        Xml => "XML",
    }
}

impl FieldType {
    /// Floating point field types.
    pub const RATIONAL: &'static [Self] = &[Self::Double, Self::Float];
    /// Integer field types.
    pub const INTEGER: &'static [Self] = &[Self::Short, Self::Long, Self::BigInteger];
    /// Every numeric field type.
    pub const NUMERIC: &'static [Self] =
        &[Self::Double, Self::Float, Self::Short, Self::Long, Self::BigInteger];
    /// Text field types.
    pub const STRING: &'static [Self] = &[Self::Text];
    /// Identifier field types.
    pub const IDENTIFIER: &'static [Self] = &[Self::Oid, Self::Guid, Self::GlobalId];
}

keyword_enum! {
    /// Feature class geometry and feature types.
    GeometryType {
        /// Points.
        Point => "Point",
        /// Multipoints.
        Multipoint => "Multipoint",
        /// Polygons.
        Polygon => "Polygon",
        /// Polylines.
        Polyline => "Polyline",
        /// Multipatches.
        MultiPatch => "MultiPatch",
        /// Annotation features.
        Annotation => "Annotation",
        /// Dimension features.
        Dimension => "Dimension",
    }
}

impl GeometryType {
    /// Returns true for annotation and dimension, which are feature types rather than shapes.
    #[must_use]
    pub const fn is_feature_type(self) -> bool {
        matches!(self, Self::Annotation | Self::Dimension)
    }
}

keyword_enum! {
    /// Workspace categories.
    WorkspaceType {
        /// Folder based workspaces.
        FileSystem => "File System",
        /// File and personal geodatabases.
        LocalDatabase => "Local Database",
        /// Enterprise geodatabases.
        RemoteDatabase => "Remote Database",
    }
}

keyword_enum! {
    /// Spatial Analyst cell size choices.
    SACellSize {
        /// Largest input cell size.
        Maximum => "Maximum of Inputs",
        /// Smallest input cell size.
        Minimum => "Minimum of Inputs",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
