//! Mapping from backend condition codes to archive conditions.

use std::collections::HashMap;

use super::BackendError;

/// Backend call a condition code was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Head,
    Get,
    Put,
    Restore,
    Delete,
}

/// What a recognised condition code means to the lifecycle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Bucket or key absent.
    NotFound,
    /// Object state forbids a direct read.
    ObjectInGlacier,
    /// Object state forbids a restore.
    CannotRestore,
    /// Treat the call as successful.
    Ignore,
}

/// Per-operation lookup of condition codes.
///
/// Codes are matched exactly. Anything not in the table is an unclassified
/// fault and is surfaced to the caller unchanged.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    entries: HashMap<Operation, HashMap<String, Condition>>,
}

impl TranslationTable {
    /// An empty table; every code is unclassified.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codes reported by S3 and S3-compatible stores.
    pub fn s3() -> Self {
        Self::new()
            .with(Operation::Head, "NotFound", Condition::NotFound)
            .with(Operation::Head, "NoSuchBucket", Condition::NotFound)
            .with(Operation::Head, "NoSuchKey", Condition::NotFound)
            .with(Operation::Get, "NoSuchBucket", Condition::NotFound)
            .with(Operation::Get, "NoSuchKey", Condition::NotFound)
            .with(Operation::Get, "InvalidObjectState", Condition::ObjectInGlacier)
            .with(Operation::Put, "NoSuchBucket", Condition::NotFound)
            .with(Operation::Restore, "NoSuchBucket", Condition::NotFound)
            .with(Operation::Restore, "NoSuchKey", Condition::NotFound)
            .with(Operation::Restore, "InvalidObjectState", Condition::CannotRestore)
            .with(Operation::Delete, "NoSuchBucket", Condition::NotFound)
            // deleting an absent key is not an error
            .with(Operation::Delete, "NoSuchKey", Condition::Ignore)
    }

    pub fn with(mut self, operation: Operation, code: impl Into<String>, condition: Condition) -> Self {
        self.insert(operation, code, condition);
        self
    }

    pub fn insert(&mut self, operation: Operation, code: impl Into<String>, condition: Condition) {
        self.entries
            .entry(operation)
            .or_default()
            .insert(code.into(), condition);
    }

    /// Look up the condition for `err` raised by `operation`.
    pub fn classify(&self, operation: Operation, err: &BackendError) -> Option<Condition> {
        let code = err.code()?;
        self.entries.get(&operation)?.get(code).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s3_table_is_operation_specific() {
        let table = TranslationTable::s3();
        let invalid = BackendError::new("InvalidObjectState", "archived");

        assert_eq!(
            table.classify(Operation::Get, &invalid),
            Some(Condition::ObjectInGlacier)
        );
        assert_eq!(
            table.classify(Operation::Restore, &invalid),
            Some(Condition::CannotRestore)
        );
        assert_eq!(table.classify(Operation::Put, &invalid), None);
    }

    #[test]
    fn absent_key_on_delete_is_ignored_but_absent_bucket_is_not() {
        let table = TranslationTable::s3();
        assert_eq!(
            table.classify(Operation::Delete, &BackendError::new("NoSuchKey", "")),
            Some(Condition::Ignore)
        );
        assert_eq!(
            table.classify(Operation::Delete, &BackendError::new("NoSuchBucket", "")),
            Some(Condition::NotFound)
        );
    }

    #[test]
    fn put_does_not_treat_missing_key_as_not_found() {
        let table = TranslationTable::s3();
        assert_eq!(
            table.classify(Operation::Put, &BackendError::new("NoSuchKey", "")),
            None
        );
    }

    #[test]
    fn uncoded_errors_are_unclassified() {
        let table = TranslationTable::s3();
        let err = BackendError::unclassified("timeout");
        assert_eq!(table.classify(Operation::Head, &err), None);
    }

    #[test]
    fn custom_tables_replace_the_s3_codes() {
        let table = TranslationTable::new().with(Operation::Get, "Frozen", Condition::ObjectInGlacier);
        assert_eq!(
            table.classify(Operation::Get, &BackendError::new("Frozen", "")),
            Some(Condition::ObjectInGlacier)
        );
        assert_eq!(
            table.classify(Operation::Get, &BackendError::new("InvalidObjectState", "")),
            None
        );
    }
}
