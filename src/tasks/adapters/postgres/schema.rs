//! Diesel schema for task persistence.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Server-assigned row id.
        id -> Int4,
        /// Task description.
        task -> Text,
        /// Completion flag, defaulting to false.
        completed -> Bool,
    }
}
