//! Reserved AEP field names and the wire field numbers assigned to them.

pub const FIELD_FILTER_NAME: &str = "filter";
pub const FIELD_FILTER_NUMBER: u32 = 10022;
pub const FIELD_FORCE_NAME: &str = "force";
pub const FIELD_FORCE_NUMBER: u32 = 10020;
pub const FIELD_PARENT_NAME: &str = "parent";
pub const FIELD_PARENT_NUMBER: u32 = 10013;
pub const FIELD_PATH_NAME: &str = "path";
pub const FIELD_PATH_NUMBER: u32 = 10018;
pub const FIELD_RESOURCE_NAME: &str = "resource";
pub const FIELD_RESOURCE_NUMBER: u32 = 10015;
pub const FIELD_RESOURCES_NAME: &str = "resources";
pub const FIELD_RESOURCES_NUMBER: u32 = 10016;
pub const FIELD_PAGE_TOKEN_NAME: &str = "page_token";
pub const FIELD_PAGE_TOKEN_NUMBER: u32 = 10010;
pub const FIELD_SKIP_NAME: &str = "skip";
pub const FIELD_SKIP_NUMBER: u32 = 10021;
pub const FIELD_UPDATE_MASK_NAME: &str = "update_mask";
pub const FIELD_UPDATE_MASK_NUMBER: u32 = 10012;
pub const FIELD_MAX_PAGE_SIZE_NAME: &str = "max_page_size";
pub const FIELD_MAX_PAGE_SIZE_NUMBER: u32 = 10017;
pub const FIELD_NEXT_PAGE_TOKEN_NAME: &str = "next_page_token";
pub const FIELD_NEXT_PAGE_TOKEN_NUMBER: u32 = 10011;
pub const FIELD_ID_NAME: &str = "id";
pub const FIELD_ID_NUMBER: u32 = 10014;
pub const FIELD_UNREACHABLE_NAME: &str = "unreachable";
pub const FIELD_UNREACHABLE_NUMBER: u32 = 10019;
pub const FIELD_RESULTS_NAME: &str = "results";
pub const FIELD_RESULTS_NUMBER: u32 = 10016;
// next number: 10023

/// Response key that signals an API-level failure.
pub const RESPONSE_ERROR_KEY: &str = "error";

/// Content type under which OpenAPI 3 documents nest request/response schemas.
pub const CONTENT_TYPE_JSON: &str = "application/json";
