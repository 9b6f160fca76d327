//! SQL statements for the action plan routines
//!
//! Row-returning routines are aggregated into a single JSON array server-side,
//! so callers read one `json` column instead of decoding each row's types.

/// Connectivity probe issued once at startup
pub const PING: &str = "SELECT 1";

pub const LIST_ACTION_PLANS: &str = r#"
    SELECT COALESCE(json_agg(r), '[]'::json)
    FROM sp_get_actionplans() AS r
"#;

pub const GET_ACTION_PLAN: &str = r#"
    SELECT COALESCE(json_agg(r), '[]'::json)
    FROM sp_get_actionplan_by_id($1::int4) AS r
"#;

/// One row whose `json_output` column is already a serialized document
pub const GET_ACTION_PLAN_DETAILS: &str = r#"
    SELECT json_output::text
    FROM get_action_plan_details($1::int4)
"#;

// Write routines take the plan as an untyped `$1`, so the server resolves it to
// whatever the procedure declares (text, varchar, json or jsonb).

pub const INSERT_ACTION_PLAN: &str = "CALL sp_insert_actionplan($1)";

pub const INSERT_ACTION_PLAN_WITH_DETAILS: &str = "CALL sp_insert_action_plan_withdetails($1)";

pub const UPDATE_ACTION_PLAN: &str = "CALL sp_update_actionplan($1)";

pub const DELETE_ACTION_PLAN: &str = r#"
    SELECT COALESCE(json_agg(r), '[]'::json)
    FROM sp_delete_actionplan($1::int4) AS r
"#;
