//! Diesel schema for task persistence.

diesel::table! {
    /// Ordered task list.
    task (id_task) {
        /// Store-assigned task identifier.
        id_task -> Int8,
        /// Public identifier generated at creation.
        uuid -> Uuid,
        /// Task type.
        #[sql_name = "type"]
        #[max_length = 20]
        kind -> Varchar,
        /// Task text.
        content -> Text,
        /// List position.
        sort_order -> Int8,
        /// Completion flag.
        done -> Bool,
        /// Creation timestamp.
        date_created -> Timestamptz,
    }
}
