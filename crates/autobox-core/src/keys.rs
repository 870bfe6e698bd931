// crates/autobox-core/src/keys.rs
// ============================================================================
// Module: Document Keys
// Description: Fixed key names and file names of the toolbox archive format.
// Purpose: Keep every wire-format literal in one place.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Literal keys, keywords and file names used in the content and resource
//! documents. Values are dictated by the host application and must not change.

// ============================================================================
// SECTION: Resource Indirection
// ============================================================================

/// Prefix marking a content value as a resource lookup.
pub const RC_PREFIX: &str = "$rc:";
/// Resource document wrapper key.
pub const MAP: &str = "map";
/// Resource key for display titles.
pub const TITLE: &str = "title";
/// Short description key used by the toolbox and parameters.
pub const DESCR: &str = "descr";
/// Long description key used by tools.
pub const DESCRIPTION: &str = "description";
/// Tool summary key.
pub const SUMMARY: &str = "summary";

// ============================================================================
// SECTION: Toolbox Content
// ============================================================================

/// Archive file extension.
pub const ARCHIVE_EXTENSION: &str = "atbx";
/// Toolbox content document.
pub const TOOLBOX_CONTENT: &str = "toolbox.content";
/// Toolbox resource document.
pub const TOOLBOX_CONTENT_RC: &str = "toolbox.content.rc";
/// Toolbox format version.
pub const TOOLBOX_VERSION: &str = "1.0";
/// Key for the format version.
pub const VERSION: &str = "version";
/// Key for the toolbox alias.
pub const ALIAS: &str = "alias";
/// Key for display-name indirections.
pub const DISPLAY_NAME: &str = "displayname";
/// Key for the toolset map.
pub const TOOLSETS: &str = "toolsets";
/// Key for tool name lists.
pub const TOOLS: &str = "tools";
/// Toolset map key for root-level tools.
pub const ROOT: &str = "<root>";
/// Prefix for indexed toolset resource keys.
pub const TOOLSET: &str = "toolset";
/// Suffix for indexed toolset resource keys.
pub const NAME: &str = "name";

// ============================================================================
// SECTION: Tool Content
// ============================================================================

/// Tool folder suffix.
pub const TOOL_SUFFIX: &str = "tool";
/// Tool content document.
pub const TOOL_CONTENT: &str = "tool.content";
/// Tool resource document.
pub const TOOL_CONTENT_RC: &str = "tool.content.rc";
/// Embedded execution script file.
pub const TOOL_SCRIPT_EXECUTE_PY: &str = "tool.script.execute.py";
/// Linked execution script file.
pub const TOOL_SCRIPT_EXECUTE_LINK: &str = "tool.script.execute.link";
/// Embedded validation script file.
pub const TOOL_SCRIPT_VALIDATE_PY: &str = "tool.script.validate.py";
/// Icon file stem.
pub const TOOL_ICON: &str = "tool.icon";
/// Illustration file stem.
pub const TOOL_ILLUSTRATION: &str = "tool.illustration";
/// Tool type marker.
pub const SCRIPT_TOOL: &str = "ScriptTool";
/// Host application version written into tool content.
pub const APP_VERSION: &str = "13.4";
/// Host product code written into tool content.
pub const PRODUCT: &str = "100";
/// Key for the tool type.
pub const TYPE: &str = "type";
/// Key for the application version.
pub const APP_VER: &str = "app_ver";
/// Key for the tool attribute list.
pub const ATTRIBUTES: &str = "attributes";
/// Key for the product code.
pub const PRODUCT_KEY: &str = "product";
/// Key for the last-updated timestamp.
pub const UPDATED: &str = "updated";
/// Key for the parameter map.
pub const PARAMS: &str = "params";
/// Attribute keyword: the tool modifies its input data.
pub const ATTR_INPUT_DATA_CHANGE: &str = "input_data_change";
/// Attribute keyword: outputs are not added to the map.
pub const ATTR_BLOCK_ADD_TO_MAP: &str = "block_add_to_map";
/// Attribute keyword: the tool supports undo in an edit session.
pub const ATTR_EDIT_SESSION: &str = "edit_session";
/// Attribute keyword: the tool consumes credits.
pub const ATTR_CREDITS: &str = "credits";

// ============================================================================
// SECTION: Parameter Content
// ============================================================================

/// Key for the requirement mode.
pub const PARAMETER_TYPE: &str = "type";
/// Key for the direction.
pub const DIRECTION: &str = "direction";
/// Key for the category indirection.
pub const CATEGORY: &str = "category";
/// Key for the data type descriptor.
pub const DATA_TYPE: &str = "datatype";
/// Key for filter domains.
pub const DOMAIN: &str = "domain";
/// Key for dependencies.
pub const DEPENDS: &str = "depends";
/// Key for the symbology layer file.
pub const SYMBOLOGY: &str = "symbology";
/// Key for the output schema.
pub const SCHEMA: &str = "schema";
/// Key for the default value.
pub const VALUE: &str = "value";
/// Output direction token.
pub const OUT: &str = "out";
/// Optional requirement token.
pub const OPTIONAL: &str = "optional";
/// Derived requirement token.
pub const DERIVED: &str = "derived";
/// Multi-value data type keyword.
pub const GP_MULTI_VALUE: &str = "GPMultiValue";
/// Schema key requesting a generated catalog path.
pub const GENERATE_OUTPUT_CATALOG_PATH: &str = "generateoutputcatalogpath";
/// Literal true token.
pub const TRUE: &str = "true";

// ============================================================================
// SECTION: Domain Content
// ============================================================================

/// Coded value domain keyword.
pub const GP_CODED_VALUE_DOMAIN: &str = "GPCodedValueDomain";
/// Range domain keyword.
pub const GP_RANGE_DOMAIN: &str = "GPRangeDomain";
/// Feature class domain keyword.
pub const GP_FEATURE_CLASS_DOMAIN: &str = "GPFeatureClassDomain";
/// Field domain keyword.
pub const GP_FIELD_DOMAIN: &str = "GPFieldDomain";
/// File domain keyword.
pub const GP_FILE_DOMAIN: &str = "GPFileDomain";
/// Workspace domain keyword.
pub const GP_WORKSPACE_DOMAIN: &str = "GPWorkspaceDomain";
/// Areal unit keyword.
pub const GP_AREAL_UNIT: &str = "GPArealUnit";
/// Linear unit keyword.
pub const GP_LINEAR_UNIT: &str = "GPLinearUnit";
/// Time unit keyword.
pub const GP_TIME_UNIT: &str = "GPTimeUnit";
/// Long keyword.
pub const GP_LONG: &str = "GPLong";
/// Double keyword.
pub const GP_DOUBLE: &str = "GPDouble";
/// Key for domain items.
pub const ITEMS: &str = "items";
/// Key for item values.
pub const ITEM_VALUE: &str = "value";
/// Key for item codes.
pub const ITEM_CODE: &str = "code";
/// Key for range minimums.
pub const MIN: &str = "min";
/// Key for range maximums.
pub const MAX: &str = "max";
/// Key for geometry types.
pub const GEOMETRY_TYPE: &str = "geometrytype";
/// Key for feature types.
pub const FEATURE_TYPE: &str = "featuretype";
/// Key for field types.
pub const FIELD_TYPE: &str = "fieldtype";
/// Key for file types.
pub const FILE_TYPES: &str = "filetypes";
/// Key for workspace types.
pub const WORKSPACE_TYPE: &str = "workspacetype";
