/// Column-name constants for the period table.
/// Single source of truth - exported to Python via PyO3.

// ── Input columns ───────────────────────────────────────────────────────────
pub mod input {
    pub const PERIOD: &str = "period";
    /// Optional; when blank the period label is tried as a date instead.
    pub const DATE: &str = "date";
    pub const TYPE1_ATTENDANCES: &str = "type1_attendances";
    pub const TYPE3_ATTENDANCES: &str = "type3_attendances";
    pub const TYPE3_COMPLIANCE_PERCENT: &str = "type3_compliance_percent";
    pub const TYPE1_BREACHES: &str = "type1_breaches";
    pub const TYPE3_BREACHES: &str = "type3_breaches";

    pub const REQUIRED: [&str; 3] = [PERIOD, TYPE1_ATTENDANCES, TYPE3_ATTENDANCES];
}

// ── Headers used by the calculator shell ────────────────────────────────────
pub mod legacy {
    use super::input;

    /// (legacy header, canonical column)
    pub const ALIASES: [(&str, &str); 7] = [
        ("Date", input::PERIOD),
        ("Month", input::PERIOD),
        ("Type 1 Attendances", input::TYPE1_ATTENDANCES),
        ("Type 3 Attendances", input::TYPE3_ATTENDANCES),
        ("Type 3 % Not Breaching", input::TYPE3_COMPLIANCE_PERCENT),
        ("Type 1 Breaches", input::TYPE1_BREACHES),
        ("Type 3 Breaches", input::TYPE3_BREACHES),
    ];
}

// ── Output columns (export order) ───────────────────────────────────────────
pub mod output {
    pub const PERIOD: &str = "period";
    pub const DATE: &str = "date";
    pub const PHASE: &str = "phase";
    pub const TYPE1_ATTENDANCES: &str = "type1_attendances";
    pub const TYPE3_ATTENDANCES: &str = "type3_attendances";
    pub const TOTAL_ATTENDANCES: &str = "total_attendances";
    pub const TYPE1_TARGET_PERCENT: &str = "type1_target_percent";
    pub const TARGET_BREACHES_ALLOWED: &str = "target_breaches_allowed";
    pub const TYPE3_BREACHES: &str = "type3_breaches";
    /// Required breaches on planned and projected rows, observed breaches on
    /// historic rows; `PHASE` tells them apart.
    pub const TYPE1_BREACHES: &str = "type1_breaches";
    pub const TYPE1_PERFORMANCE_PERCENT: &str = "type1_performance_percent";
    pub const TYPE3_PERFORMANCE_PERCENT: &str = "type3_performance_percent";
    pub const OVERALL_PERFORMANCE_PERCENT: &str = "overall_performance_percent";
    pub const ADJUSTED_TYPE1_BREACHES: &str = "adjusted_type1_breaches";

    pub const ALL: [&str; 14] = [
        PERIOD,
        DATE,
        PHASE,
        TYPE1_ATTENDANCES,
        TYPE3_ATTENDANCES,
        TOTAL_ATTENDANCES,
        TYPE1_TARGET_PERCENT,
        TARGET_BREACHES_ALLOWED,
        TYPE3_BREACHES,
        TYPE1_BREACHES,
        TYPE1_PERFORMANCE_PERCENT,
        TYPE3_PERFORMANCE_PERCENT,
        OVERALL_PERFORMANCE_PERCENT,
        ADJUSTED_TYPE1_BREACHES,
    ];
}

// ── Phase values ────────────────────────────────────────────────────────────
pub mod phase {
    pub const PLANNED: &str = "planned";
    pub const HISTORIC: &str = "historic";
    pub const PROJECTED: &str = "projected";
}
