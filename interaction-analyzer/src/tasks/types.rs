/// Context keys shared by the interaction tasks
pub mod session_keys {
    pub const REQUEST: &str = "request";
    pub const NOTICES: &str = "notices";
    pub const DATABASE_RECORD: &str = "database_record";
    pub const REPORT: &str = "report";
    pub const STRUCTURE_VIEW: &str = "structure_view";
}
