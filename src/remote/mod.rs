//! Invokers for the externally hosted fraud capabilities.
//!
//! - `functions` - SQL-callable classify / extract / explain functions
//! - `search` - similarity search over the fraud-pattern index

mod functions;
mod search;

pub use functions::{
    build_query, map_explanation, unavailable, unpack_result, RemoteFunctions, SqlArg,
    CLASSIFY_FUNCTION, EXPLAIN_FUNCTION, EXTRACT_FUNCTION,
};
pub use search::{
    parse_search_response, truncate_chars, FraudPatternSearch, PatternMatch, SearchOutcome,
    SEARCH_COLUMNS, SEARCH_CONTENT_MAX_CHARS,
};
