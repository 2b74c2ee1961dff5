//! Diesel schema for lead lifecycle persistence.

diesel::table! {
    /// Lead records carrying the governed pipeline status.
    leads (id) {
        /// Lead identifier.
        id -> Uuid,
        /// Owning actor.
        owner_id -> Uuid,
        /// Owning organization, if any.
        org_id -> Nullable<Uuid>,
        /// Pipeline status.
        #[max_length = 50]
        status -> Varchar,
        /// Optimistic concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only transition audit trail.
    lead_transitions (id) {
        /// Record identifier.
        id -> Uuid,
        /// Insertion sequence preserving append order.
        seq -> Int8,
        /// Lead that changed.
        lead_id -> Uuid,
        /// Status before the change.
        #[max_length = 50]
        previous_status -> Varchar,
        /// Status after the change.
        #[max_length = 50]
        new_status -> Varchar,
        /// Actor that performed the change.
        actor_id -> Uuid,
        /// Policy decision reason.
        reason -> Jsonb,
        /// Caller metadata.
        metadata -> Jsonb,
        /// Commit timestamp.
        occurred_at -> Timestamptz,
    }
}
