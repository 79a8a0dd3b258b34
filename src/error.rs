use thiserror::Error;

/// Errors returned while rendering rows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("row has no attribute `{attr}` (resolving `{accessor}`)")]
    MissingAttribute {
        /// the full accessor path being resolved
        accessor: String,
        /// the path segment that could not be found
        attr: String,
    },
}
