//! In-memory backend.
//!
//! Intended for tests, demos, and offline development. Views are plain lists of
//! JSON rows; procedures are closures registered by name that may rewrite views
//! (e.g. `set_active_company` swapping the `view_user_context` row).

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::Value;

use crate::query::{Direction, Filter, FilterOp, FilterValue};
use crate::{AuthUser, Backend, BackendError, BackendResult, ViewQuery};

/// Mutable view data handed to procedure handlers.
#[derive(Debug, Default, Clone)]
pub struct Views {
    rows: HashMap<String, Vec<Value>>,
}

impl Views {
    pub fn rows(&self, view: &str) -> &[Value] {
        self.rows.get(view).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn set(&mut self, view: &str, rows: Vec<Value>) {
        self.rows.insert(view.to_string(), rows);
    }

    pub fn push(&mut self, view: &str, row: Value) {
        self.rows.entry(view.to_string()).or_default().push(row);
    }

    pub fn rows_mut(&mut self, view: &str) -> &mut Vec<Value> {
        self.rows.entry(view.to_string()).or_default()
    }
}

pub type ProcedureHandler = Arc<dyn Fn(&mut Views, &Value) -> BackendResult<Value> + Send + Sync>;

/// A recorded procedure invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCall {
    pub procedure: String,
    pub params: Value,
}

/// Where an injected failure fires.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    SignIn,
    CurrentUser,
    SignOut,
    View(String),
    Procedure(String),
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, (String, AuthUser)>,
    current: Option<AuthUser>,
    views: Views,
    procedures: HashMap<String, ProcedureHandler>,
    calls: Vec<ProcedureCall>,
    queries: Vec<ViewQuery>,
    failures: HashMap<FailurePoint, BackendError>,
}

#[derive(Default)]
pub struct InMemoryBackend {
    state: RwLock<State>,
}

impl core::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InMemoryBackend").finish_non_exhaustive()
    }
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BackendResult<std::sync::RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| BackendError::transport("lock poisoned"))
    }

    fn write(&self) -> BackendResult<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| BackendError::transport("lock poisoned"))
    }

    /// Register an account that can sign in with `password`.
    pub fn add_account(&self, password: &str, user: AuthUser) {
        if let Ok(mut s) = self.write() {
            s.accounts
                .insert(user.email.clone(), (password.to_string(), user));
        }
    }

    /// Pretend a session already exists (e.g. restored from storage).
    pub fn set_current_user(&self, user: Option<AuthUser>) {
        if let Ok(mut s) = self.write() {
            s.current = user;
        }
    }

    pub fn set_rows(&self, view: &str, rows: Vec<Value>) {
        if let Ok(mut s) = self.write() {
            s.views.set(view, rows);
        }
    }

    pub fn push_row(&self, view: &str, row: Value) {
        if let Ok(mut s) = self.write() {
            s.views.push(view, row);
        }
    }

    /// Register a procedure.
    pub fn on_procedure<F>(&self, name: &str, handler: F)
    where
        F: Fn(&mut Views, &Value) -> BackendResult<Value> + Send + Sync + 'static,
    {
        if let Ok(mut s) = self.write() {
            s.procedures.insert(name.to_string(), Arc::new(handler));
        }
    }

    /// Make every call at `point` fail with `error` until cleared.
    pub fn fail(&self, point: FailurePoint, error: BackendError) {
        if let Ok(mut s) = self.write() {
            s.failures.insert(point, error);
        }
    }

    pub fn clear_failure(&self, point: &FailurePoint) {
        if let Ok(mut s) = self.write() {
            s.failures.remove(point);
        }
    }

    /// Procedures invoked so far, in order.
    pub fn procedure_calls(&self) -> Vec<ProcedureCall> {
        self.read().map(|s| s.calls.clone()).unwrap_or_default()
    }

    /// View reads (selects and counts) issued so far, in order.
    pub fn queries(&self) -> Vec<ViewQuery> {
        self.read().map(|s| s.queries.clone()).unwrap_or_default()
    }

    fn check(&self, point: &FailurePoint) -> BackendResult<()> {
        match self.read()?.failures.get(point) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn matching_rows(&self, query: &ViewQuery) -> BackendResult<Vec<Value>> {
        self.check(&FailurePoint::View(query.view.clone()))?;
        let mut s = self.write()?;
        s.queries.push(query.clone());

        let mut rows: Vec<Value> = s
            .views
            .rows(&query.view)
            .iter()
            .filter(|row| query.filters.iter().all(|f| matches(row, f)))
            .cloned()
            .collect();

        if !query.order.is_empty() {
            rows.sort_by(|a, b| {
                for o in &query.order {
                    let ord = compare_for_sort(a.get(&o.column), b.get(&o.column));
                    let ord = match o.direction {
                        Direction::Ascending => ord,
                        Direction::Descending => ord.reverse(),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        Ok(rows)
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<AuthUser> {
        self.check(&FailurePoint::SignIn)?;
        let mut s = self.write()?;
        let user = match s.accounts.get(email) {
            Some((expected, user)) if expected == password => user.clone(),
            _ => return Err(BackendError::rejected("Invalid login credentials")),
        };
        s.current = Some(user.clone());
        Ok(user)
    }

    async fn current_user(&self) -> BackendResult<Option<AuthUser>> {
        self.check(&FailurePoint::CurrentUser)?;
        Ok(self.read()?.current.clone())
    }

    async fn sign_out(&self) -> BackendResult<()> {
        self.check(&FailurePoint::SignOut)?;
        self.write()?.current = None;
        Ok(())
    }

    async fn select(&self, query: &ViewQuery) -> BackendResult<Vec<Value>> {
        let mut rows = self.matching_rows(query)?;
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        if !query.columns.is_empty() {
            rows = rows
                .into_iter()
                .map(|row| project(row, &query.columns))
                .collect();
        }
        Ok(rows)
    }

    async fn count(&self, query: &ViewQuery) -> BackendResult<u64> {
        Ok(self.matching_rows(query)?.len() as u64)
    }

    async fn rpc(&self, procedure: &str, params: Value) -> BackendResult<Value> {
        self.check(&FailurePoint::Procedure(procedure.to_string()))?;
        let mut s = self.write()?;
        s.calls.push(ProcedureCall {
            procedure: procedure.to_string(),
            params: params.clone(),
        });
        let handler = s
            .procedures
            .get(procedure)
            .cloned()
            .ok_or_else(|| {
                BackendError::rejected(format!("Could not find the function {procedure}"))
            })?;
        handler(&mut s.views, &params)
    }
}

fn project(row: Value, columns: &[String]) -> Value {
    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| columns.iter().any(|c| c == k))
                .collect(),
        ),
        other => other,
    }
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        FilterOp::Eq => equals(cell, &filter.value),
        op => match compare(cell, &filter.value) {
            Some(ord) => match op {
                FilterOp::Gt => ord == Ordering::Greater,
                FilterOp::Gte => ord != Ordering::Less,
                FilterOp::Lt => ord == Ordering::Less,
                FilterOp::Lte => ord != Ordering::Greater,
                FilterOp::Eq => ord == Ordering::Equal,
            },
            None => false,
        },
    }
}

fn equals(cell: &Value, value: &FilterValue) -> bool {
    match (cell, value) {
        (Value::Null, FilterValue::Null) => true,
        (Value::Bool(a), FilterValue::Bool(b)) => a == b,
        _ => compare(cell, value) == Some(Ordering::Equal),
    }
}

/// Strings compare lexicographically (ISO dates sort correctly), numbers numerically.
fn compare(cell: &Value, value: &FilterValue) -> Option<Ordering> {
    match (cell, value) {
        (Value::String(a), FilterValue::Text(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Number(a), FilterValue::Number(b)) => a.as_f64()?.partial_cmp(b),
        (Value::Number(a), FilterValue::Text(b)) => a.as_f64()?.partial_cmp(&b.parse::<f64>().ok()?),
        _ => None,
    }
}

/// Nulls sort last.
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
