//! Column naming for headerless part-files.

pub const BUCKET_COLUMN: &str = "Bucket";
pub const KEY_COLUMN: &str = "Key";
pub const SIZE_COLUMN: &str = "Size";
pub const LAST_MODIFIED_COLUMN: &str = "LastModifiedDate";
pub const STORAGE_CLASS_COLUMN: &str = "StorageClass";

/// Column order of an inventory export.
pub const EXPECTED_COLUMNS: [&str; 5] = [
    BUCKET_COLUMN,
    KEY_COLUMN,
    SIZE_COLUMN,
    LAST_MODIFIED_COLUMN,
    STORAGE_CLASS_COLUMN,
];

/// Names for `observed` columns given the `expected` layout.
///
/// - equal count: the expected names as-is
/// - more columns: expected names, then `Unnamed_<index>` for each extra
/// - fewer columns: the expected names truncated to `observed`
pub fn normalize_column_names(expected: &[&str], observed: usize) -> Vec<String> {
    (0..observed)
        .map(|index| match expected.get(index) {
            Some(name) => (*name).to_string(),
            None => format!("Unnamed_{index}"),
        })
        .collect()
}
