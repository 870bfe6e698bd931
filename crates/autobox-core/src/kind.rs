// crates/autobox-core/src/kind.rs
// ============================================================================
// Module: Parameter Kinds
// Description: Kind tags and their static capability table.
// Purpose: Replace per-kind parameter types with one record plus lookups.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Every parameter carries a [`Kind`]. The kind decides the data type
//! keyword written to `datatype`, whether the parameter may be an output,
//! which default payloads, filters and dependencies it accepts, whether it
//! emits an output schema and which file suffixes its path defaults need.
//!
//! An empty allowed-default list means the kind does not restrict its
//! default payload.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use crate::default::DefaultType;
use crate::filter::FilterKind;

// ============================================================================
// SECTION: Kind Table
// ============================================================================

/// Declares the kind enumeration with its keyword and input-only flag.
macro_rules! kind_table {
    ($($variant:ident => $keyword:literal, $input_only:literal;)+) => {
        /// Parameter kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Kind {
            $(
                #[doc = concat!("Host data type `", $keyword, "`.")]
                $variant
            ),+
        }

        impl Kind {
            /// Every kind in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Data type keyword written into `datatype`.
            #[must_use]
            pub const fn keyword(self) -> &'static str {
                match self {
                    $(Self::$variant => $keyword),+
                }
            }

            /// Variant name accepted by [`FromStr`] alongside the keyword.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant)),+
                }
            }

            /// Returns true when the kind can only be an input.
            #[must_use]
            pub const fn is_input_only(self) -> bool {
                match self {
                    $(Self::$variant => $input_only),+
                }
            }
        }
    };
}

kind_table! {
    AnalysisCellSize => "analysis_cell_size", true;
    ArealUnit => "GPArealUnit", true;
    Boolean => "GPBoolean", false;
    CadDrawingDataset => "DECadDrawingDataset", false;
    CalculatorExpression => "GPCalculatorExpression", true;
    CatalogLayer => "GPCatalogLayer", true;
    CellSizeXY => "GPCellSizeXY", true;
    CoordinateSystem => "GPCoordinateSystem", false;
    Coverage => "DECoverage", true;
    CoverageFeatureClass => "DECoverageFeatureClasses", true;
    DataElement => "DEType", false;
    DataFile => "GPDataFile", false;
    DatasetType => "DEDatasetType", false;
    Date => "GPDate", false;
    DbaseTable => "DEDbaseTable", false;
    DiagramLayer => "GPDiagramLayer", false;
    Double => "GPDouble", false;
    EncryptedString => "GPEncryptedString", true;
    Envelope => "GPEnvelope", true;
    Extent => "GPExtent", true;
    FeatureClass => "DEFeatureClass", false;
    FeatureDataset => "DEFeatureDataset", false;
    FeatureLayer => "GPFeatureLayer", false;
    FeatureRecordSetLayer => "GPFeatureRecordSetLayer", true;
    Field => "Field", true;
    FieldInfo => "GPFieldInfo", true;
    FieldMapping => "GPFieldMapping", true;
    File => "DEFile", false;
    Folder => "DEFolder", false;
    GALayer => "GPGALayer", false;
    GASearchNeighborhood => "GPGASearchNeighborhood", true;
    GAValueTable => "GPGAValueTable", true;
    GPLayer => "GPLayer", false;
    GeodatasetType => "DEGeodatasetType", true;
    GeometricNetwork => "DEGeometricNetwork", false;
    GroupLayer => "GPGroupLayer", false;
    KMLLayer => "GPKMLLayer", false;
    LasDataset => "DELasDataset", false;
    LasDatasetLayer => "GPLasDatasetLayer", false;
    LayerFile => "DELayer", false;
    LinearUnit => "GPLinearUnit", true;
    Long => "GPLong", false;
    MDomain => "GPMDomain", true;
    Map => "GPMap", false;
    MapDocument => "DEMapDocument", true;
    MosaicDataset => "DEMosaicDataset", false;
    MosaicLayer => "GPMosaicLayer", false;
    NAClassFieldMap => "NAClassFieldMap", true;
    NAHierarchySettings => "GPNAHierarchySettings", true;
    NALayer => "GPNALayer", false;
    NetworkDataSource => "GPNetworkDataSource", false;
    NetworkDataset => "DENetworkDataset", false;
    NetworkDatasetLayer => "GPNetworkDatasetLayer", false;
    NetworkTravelMode => "NetworkTravelMode", true;
    Point => "GPPoint", true;
    PrjFile => "DEPrjFile", false;
    RandomNumberGenerator => "GPRandomNumberGenerator", true;
    RasterBand => "DERasterBand", false;
    RasterBuilder => "GPRasterBuilder", true;
    RasterCalculatorExpression => "GPRasterCalculatorExpression", true;
    RasterDataLayer => "GPRasterDataLayer", false;
    RasterDataset => "DERasterDataset", false;
    RasterLayer => "GPRasterLayer", false;
    RecordSet => "GPRecordSet", true;
    RelationshipClass => "DERelationshipClass", false;
    SACellSize => "GPSACellSize", true;
    SAExtractValues => "GPSAExtractValues", true;
    SAFuzzyFunction => "GPSAFuzzyFunction", true;
    SAGDBEnvCompression => "GPSAGDBEnvCompression", true;
    SAGDBEnvPyramid => "GPSAGDBEnvPyramid", true;
    SAGDBEnvStatistics => "GPSAGDBEnvStatistics", true;
    SAGDBEnvTileSize => "GPSAGDBEnvTileSize", true;
    SAHorizontalFactor => "GPSAHorizontalFactor", true;
    SANeighborhood => "GPSANeighborhood", true;
    SARadius => "GPSARadius", true;
    SARemap => "GPSARemap", true;
    SASemiVariogram => "GPSASemiVariogram", true;
    SATimeConfiguration => "GPSATimeConfiguration", true;
    SATopoFeatures => "GPSATopoFeatures", true;
    SATransformationFunction => "GPSATransformationFunction", true;
    SAVerticalFactor => "GPSAVerticalFactor", true;
    SAWeightedOverlayTable => "GPSAWeightedOverlayTable", true;
    SAWeightedSum => "GPSAWeightedSum", true;
    SQLExpression => "GPSQLExpression", true;
    SchematicDataset => "DESchematicDataset", false;
    SchematicDiagram => "DESchematicDiagram", false;
    SchematicDiagramClass => "DESchematicDiagramClass", false;
    SchematicFolder => "DESchematicFolder", false;
    SchematicLayer => "GPSchematicLayer", false;
    ShapeFile => "DEShapeFile", false;
    SpatialReference => "GPSpatialReference", false;
    String => "GPString", false;
    StringHidden => "GPStringHidden", true;
    Table => "DETable", false;
    TableView => "GPTableView", false;
    TerrainLayer => "GPTerrainLayer", false;
    Textfile => "DETextfile", false;
    TimeUnit => "GPTimeUnit", true;
    Tin => "DETin", false;
    TinLayer => "GPTinLayer", false;
    Topology => "DETopology", false;
    TopologyLayer => "GPTopologyLayer", false;
    ValueTable => "GPValueTable", true;
    VectorLayer => "GPVectorLayer", false;
    Workspace => "DEWorkspace", false;
    XYDomain => "GPXYDomain", true;
    ZDomain => "GPZDomain", true;
}

// ============================================================================
// SECTION: Capability Groups
// ============================================================================

/// Kinds that hold feature or raster data and can feed field pickers.
const GEOGRAPHIC_AND_TABLE: &[Kind] = &[
    Kind::FeatureClass,
    Kind::FeatureLayer,
    Kind::FeatureRecordSetLayer,
    Kind::RasterDataset,
    Kind::RasterLayer,
    Kind::DatasetType,
    Kind::Table,
    Kind::TableView,
    Kind::RecordSet,
];

/// Kinds that describe a network a travel mode can read.
const NETWORK_SOURCES: &[Kind] =
    &[Kind::NetworkDataset, Kind::NetworkDatasetLayer, Kind::NetworkDataSource];

/// Feature class output schema keyword.
const GP_FEATURE_SCHEMA: &str = "GPFeatureSchema";

/// Table output schema keyword.
const GP_TABLE_SCHEMA: &str = "GPTableSchema";

// ============================================================================
// SECTION: Capabilities
// ============================================================================

impl Kind {
    /// Default payload types the kind accepts; empty means unrestricted.
    #[must_use]
    pub const fn default_types(self) -> &'static [DefaultType] {
        match self {
            Self::AnalysisCellSize => &[DefaultType::Path, DefaultType::Long, DefaultType::Double],
            Self::ArealUnit => &[DefaultType::ArealUnit],
            Self::Boolean => &[DefaultType::Bool],
            Self::CalculatorExpression
            | Self::CoordinateSystem
            | Self::SpatialReference
            | Self::SQLExpression
            | Self::String => &[DefaultType::Text],
            Self::CellSizeXY => &[DefaultType::CellSizeXY],
            Self::Date => &[DefaultType::Date],
            Self::DbaseTable
            | Self::File
            | Self::Folder
            | Self::MapDocument
            | Self::PrjFile
            | Self::ShapeFile
            | Self::Textfile => &[DefaultType::Path],
            Self::Double => &[DefaultType::Double, DefaultType::Long],
            Self::Envelope => &[DefaultType::Envelope],
            Self::Extent => &[DefaultType::Extent],
            Self::LinearUnit => &[DefaultType::LinearUnit],
            Self::Long => &[DefaultType::Long],
            Self::MDomain => &[DefaultType::MDomain],
            Self::Point => &[DefaultType::Point],
            Self::SACellSize => &[DefaultType::Path, DefaultType::SACellSize],
            Self::TimeUnit => &[DefaultType::TimeUnit],
            Self::XYDomain => &[DefaultType::XYDomain],
            Self::ZDomain => &[DefaultType::ZDomain],
            _ => &[],
        }
    }

    /// Filter kinds the kind accepts.
    #[must_use]
    pub const fn filter_kinds(self) -> &'static [FilterKind] {
        match self {
            Self::ArealUnit => &[FilterKind::ArealUnit],
            Self::Double => &[FilterKind::DoubleRange, FilterKind::DoubleValue],
            Self::FeatureClass | Self::FeatureLayer => &[FilterKind::FeatureClassType],
            Self::Field => &[FilterKind::FieldType],
            Self::File => &[FilterKind::FileType],
            Self::LinearUnit => &[FilterKind::LinearUnit],
            Self::Long => &[FilterKind::LongRange, FilterKind::LongValue],
            Self::String => &[FilterKind::StringValue],
            Self::TimeUnit => &[FilterKind::TimeUnit],
            Self::Workspace => &[FilterKind::WorkspaceType],
            _ => &[],
        }
    }

    /// Kinds this kind may depend on.
    #[must_use]
    pub const fn dependency_kinds(self) -> &'static [Kind] {
        match self {
            Self::ArealUnit
            | Self::CalculatorExpression
            | Self::Field
            | Self::FieldMapping
            | Self::LinearUnit
            | Self::SQLExpression => GEOGRAPHIC_AND_TABLE,
            Self::GAValueTable => &[Self::GALayer],
            Self::NAHierarchySettings => &[Self::NetworkDataset],
            Self::NetworkTravelMode => NETWORK_SOURCES,
            _ => &[],
        }
    }

    /// Output schema keyword for kinds that describe new datasets.
    #[must_use]
    pub const fn schema_type(self) -> Option<&'static str> {
        match self {
            Self::FeatureClass => Some(GP_FEATURE_SCHEMA),
            Self::Table => Some(GP_TABLE_SCHEMA),
            _ => None,
        }
    }

    /// Lower-case suffixes required of path defaults; empty means any suffix.
    #[must_use]
    pub const fn suffixes(self) -> &'static [&'static str] {
        match self {
            Self::DbaseTable => &[".dbf", ".shp"],
            Self::MapDocument => &[".mxd"],
            Self::PrjFile => &[".prj"],
            Self::ShapeFile => &[".shp"],
            Self::Textfile => &[".csv", ".txt", ".tab"],
            _ => &[],
        }
    }

    /// Returns true for secret kinds whose defaults are never stored.
    #[must_use]
    pub const fn is_not_stored(self) -> bool {
        matches!(self, Self::EncryptedString | Self::StringHidden)
    }

    /// Returns true when numeric defaults must be greater than zero.
    #[must_use]
    pub const fn requires_positive_default(self) -> bool {
        matches!(self, Self::AnalysisCellSize)
    }

    /// Returns true for the boolean kind, which is never optional.
    #[must_use]
    pub const fn is_boolean(self) -> bool {
        matches!(self, Self::Boolean)
    }

    /// Returns true when `default_type` is an acceptable default payload.
    #[must_use]
    pub fn accepts_default(self, default_type: DefaultType) -> bool {
        let allowed = self.default_types();
        allowed.is_empty() || allowed.contains(&default_type)
    }

    /// Returns true when `filter` may be attached.
    #[must_use]
    pub fn accepts_filter(self, filter: FilterKind) -> bool {
        self.filter_kinds().contains(&filter)
    }

    /// Returns true when a parameter of kind `other` may be a dependency.
    #[must_use]
    pub fn accepts_dependency(self, other: Self) -> bool {
        self.dependency_kinds().contains(&other)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Kind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.keyword() == value || kind.name() == value)
            .ok_or_else(|| format!("unknown parameter kind: {value}"))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
