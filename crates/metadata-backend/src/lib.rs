//! The backing-store contract consumed by the API service (spec §6), plus
//! its error type.

pub mod error;
pub mod store;

pub use error::BackendError;
pub use store::MetadataStore;

use tracing::debug;

/// Translates a store's sentinel "no records" error into an empty list,
/// per spec §7 "store 'no records' is caught in List paths and converted
/// to success-with-empty-list".
pub fn empty_on_no_records<T>(
    result: Result<Vec<T>, BackendError>,
) -> Result<Vec<T>, BackendError> {
    match result {
        Err(err) if err.is_no_records() => {
            debug!("store reported no records; returning empty list");
            Ok(Vec::new())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_records_becomes_empty_list() {
        let result: Result<Vec<i32>, BackendError> = Err(BackendError::NoRecords);
        assert_eq!(empty_on_no_records(result).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn other_errors_pass_through() {
        let result: Result<Vec<i32>, BackendError> =
            Err(BackendError::TypeNotFound { name: "x".into() });
        assert!(empty_on_no_records(result).is_err());
    }

    #[test]
    fn ok_passes_through() {
        let result: Result<Vec<i32>, BackendError> = Ok(vec![1, 2]);
        assert_eq!(empty_on_no_records(result).unwrap(), vec![1, 2]);
    }
}
