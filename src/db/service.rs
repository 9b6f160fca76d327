// Action plan service
//
// One stored routine call per operation, each on its own pooled connection.

use super::queries::{
    DELETE_ACTION_PLAN, GET_ACTION_PLAN, GET_ACTION_PLAN_DETAILS, INSERT_ACTION_PLAN,
    INSERT_ACTION_PLAN_WITH_DETAILS, LIST_ACTION_PLANS, UPDATE_ACTION_PLAN,
};
use crate::error::AppError;
use async_trait::async_trait;
use bytes::BytesMut;
use deadpool_postgres::Pool;
use serde_json::Value;
use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tracing::debug;

/// Operations the action plan routes need from the database
#[async_trait]
pub trait ActionPlanStore: Send + Sync {
    /// All action plans as a JSON array
    async fn list(&self) -> Result<Value, AppError>;

    /// Rows matching `id` as a JSON array (empty when nothing matches)
    async fn find(&self, id: i32) -> Result<Value, AppError>;

    /// The serialized detail document for `id`, relayed verbatim
    async fn details(&self, id: i32) -> Result<String, AppError>;

    async fn insert(&self, plan: &Value) -> Result<(), AppError>;

    async fn insert_with_detail(&self, plan: &Value) -> Result<(), AppError>;

    async fn update(&self, plan: &Value) -> Result<(), AppError>;

    /// Whatever rows the delete routine reports, as a JSON array
    async fn delete(&self, id: i32) -> Result<Value, AppError>;
}

/// A plan bound to a write routine's parameter: json/jsonb receive the
/// document, text-like types receive its serialized form.
#[derive(Debug)]
struct PlanParam<'a> {
    plan: &'a Value,
    text: String,
}

impl<'a> PlanParam<'a> {
    fn new(plan: &'a Value) -> Self {
        Self {
            plan,
            text: plan.to_string(),
        }
    }
}

impl ToSql for PlanParam<'_> {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        if <Value as ToSql>::accepts(ty) {
            ToSql::to_sql(self.plan, ty, out)
        } else {
            ToSql::to_sql(&self.text, ty, out)
        }
    }

    fn accepts(ty: &Type) -> bool {
        <Value as ToSql>::accepts(ty) || <String as ToSql>::accepts(ty)
    }

    to_sql_checked!();
}

// PostgreSQL-backed store
pub struct PgActionPlanService {
    pool: Pool,
}

impl PgActionPlanService {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    // Run a statement whose single row holds a json aggregate
    async fn query_json(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Value, AppError> {
        let client = self.pool.get().await?;
        let row = client.query_one(sql, params).await?;
        Ok(row.try_get(0)?)
    }

    // Run a write routine with the plan as its only argument
    async fn call_with_plan(&self, sql: &str, plan: &Value) -> Result<(), AppError> {
        let param = PlanParam::new(plan);
        let client = self.pool.get().await?;
        client.execute(sql, &[&param]).await?;
        Ok(())
    }
}

#[async_trait]
impl ActionPlanStore for PgActionPlanService {
    async fn list(&self) -> Result<Value, AppError> {
        debug!("Calling sp_get_actionplans");
        self.query_json(LIST_ACTION_PLANS, &[]).await
    }

    async fn find(&self, id: i32) -> Result<Value, AppError> {
        debug!("Calling sp_get_actionplan_by_id({})", id);
        self.query_json(GET_ACTION_PLAN, &[&id]).await
    }

    async fn details(&self, id: i32) -> Result<String, AppError> {
        debug!("Calling get_action_plan_details({})", id);
        let client = self.pool.get().await?;
        let rows = client.query(GET_ACTION_PLAN_DETAILS, &[&id]).await?;

        let row = rows.first().ok_or(AppError::MissingDetails(id))?;
        let json_output: Option<String> = row.try_get(0)?;
        json_output.ok_or_else(|| {
            AppError::Internal(format!(
                "get_action_plan_details returned a null json_output for id {}",
                id
            ))
        })
    }

    async fn insert(&self, plan: &Value) -> Result<(), AppError> {
        debug!("Calling sp_insert_actionplan");
        self.call_with_plan(INSERT_ACTION_PLAN, plan).await
    }

    async fn insert_with_detail(&self, plan: &Value) -> Result<(), AppError> {
        debug!("Calling sp_insert_action_plan_withdetails");
        self.call_with_plan(INSERT_ACTION_PLAN_WITH_DETAILS, plan).await
    }

    async fn update(&self, plan: &Value) -> Result<(), AppError> {
        debug!("Calling sp_update_actionplan");
        self.call_with_plan(UPDATE_ACTION_PLAN, plan).await
    }

    async fn delete(&self, id: i32) -> Result<Value, AppError> {
        debug!("Calling sp_delete_actionplan({})", id);
        self.query_json(DELETE_ACTION_PLAN, &[&id]).await
    }
}
