use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use parallax_backend::{BackendClient, BackendError, FailurePoint, InMemoryBackend};
use parallax_core::{BranchId, ClientId, CompanyId, InviteId, ProfessionalId, RecordId, UserId};
use parallax_services::{
    ReportKind, ReportPeriod, anamnesis, appointments, audit, branches, companies, dashboard, finance,
    reports, settings, to_csv, users,
};

fn now() -> DateTime<Utc> {
    "2026-10-19T10:00:00Z".parse().unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

struct Fixture {
    backend: Arc<InMemoryBackend>,
    client: BackendClient,
    company: CompanyId,
    other: CompanyId,
    bruno: ProfessionalId,
    carla: ProfessionalId,
}

fn fixture() -> Fixture {
    let backend = Arc::new(InMemoryBackend::new());
    let client = BackendClient::new(backend.clone());
    let company = CompanyId::new();
    let other = CompanyId::new();
    let bruno = ProfessionalId::new();
    let carla = ProfessionalId::new();

    backend.set_rows(
        "view_clients",
        vec![
            json!({"id": ClientId::new(), "company_id": company, "full_name": "Ana", "created_at": "2026-09-01T12:00:00Z"}),
            json!({"id": ClientId::new(), "company_id": company, "full_name": "Beto", "created_at": "2026-10-13T12:00:00Z"}),
            json!({"id": ClientId::new(), "company_id": company, "full_name": "", "created_at": "2026-10-19T08:00:00Z"}),
            json!({"id": ClientId::new(), "company_id": other, "full_name": "Elsewhere", "created_at": "2026-10-19T08:00:00Z"}),
        ],
    );
    backend.set_rows(
        "view_professionals",
        vec![
            json!({"id": carla, "company_id": company, "full_name": "Carla"}),
            json!({"id": bruno, "company_id": company, "full_name": "Bruno"}),
        ],
    );
    backend.set_rows(
        "view_appointments",
        vec![
            json!({"id": "a1", "company_id": company, "professional_id": bruno, "client_name": "Ana",
                   "professional_name": "Bruno", "service_name": "Cut", "status": "completed",
                   "start_time": "2026-10-19T09:00:00Z"}),
            json!({"id": "a2", "company_id": company, "professional_id": bruno, "client_name": null,
                   "professional_name": "Bruno", "status": "scheduled",
                   "start_time": "2026-10-19T15:00:00Z"}),
            json!({"id": "a3", "company_id": company, "professional_id": carla, "client_name": "Beto",
                   "professional_name": "Carla", "service_name": "Color", "status": "scheduled",
                   "start_time": "2026-10-20T09:00:00Z"}),
            json!({"id": "a4", "company_id": company, "professional_id": null, "client_name": "Beto",
                   "status": "cancelled", "start_time": "2026-10-18T09:00:00Z"}),
            json!({"id": "a5", "company_id": other, "professional_id": carla, "status": "completed",
                   "start_time": "2026-10-19T11:00:00Z"}),
        ],
    );

    Fixture {
        backend,
        client,
        company,
        other,
        bruno,
        carla,
    }
}

#[tokio::test]
async fn dashboard_counts_are_tenant_scoped() {
    let f = fixture();
    let kpis = dashboard::fetch_dashboard_kpis_at(&f.client, f.company, now())
        .await
        .into_result()
        .unwrap();
    assert_eq!(kpis.total_clients, 3);
    assert_eq!(kpis.active_professionals, 2);
    assert_eq!(kpis.appointments_today, 2);

    let other = dashboard::fetch_dashboard_kpis_at(&f.client, f.other, now())
        .await
        .into_result()
        .unwrap();
    assert_eq!(other.total_clients, 1);
    assert_eq!(other.active_professionals, 0);
}

#[tokio::test]
async fn dashboard_reports_which_count_failed() {
    let f = fixture();
    f.backend.fail(
        FailurePoint::View("view_professionals".into()),
        BackendError::rejected("permission denied"),
    );
    let resp = dashboard::fetch_dashboard_kpis_at(&f.client, f.company, now()).await;
    assert_eq!(resp.data, None);
    assert_eq!(resp.error.as_deref(), Some(dashboard::PROFESSIONALS_FAILED));
}

#[tokio::test]
async fn upcoming_appointments_start_now_and_fill_placeholders() {
    let f = fixture();
    let upcoming = dashboard::fetch_upcoming_appointments_at(&f.client, f.company, now())
        .await
        .into_result()
        .unwrap();
    let ids: Vec<&str> = upcoming.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a2", "a3"]);
    assert_eq!(upcoming[0].client_name, "N/A");
    assert_eq!(upcoming[0].service_name, "N/A");
    assert_eq!(upcoming[1].service_name, "Color");
}

#[tokio::test]
async fn finance_defaults_when_no_rows_exist() {
    let f = fixture();
    let status = finance::fetch_cash_register_status(&f.client, f.company)
        .await
        .into_result()
        .unwrap();
    assert!(!status.is_open);
    assert_eq!(status.current_balance, 0.0);

    let summary = finance::fetch_financial_daily_summary_on(&f.client, f.company, today())
        .await
        .into_result()
        .unwrap();
    assert_eq!(summary, finance::FinancialDailySummary::default());
}

#[tokio::test]
async fn cash_movements_are_newest_first_and_normalized() {
    let f = fixture();
    f.backend.set_rows(
        "view_cash_movements",
        vec![
            json!({"id": "m1", "company_id": f.company, "date": "2026-10-17", "type": "income", "amount": 80.5, "origin": "Order #12"}),
            json!({"id": "m2", "company_id": f.company, "date": "2026-10-19", "type": "expense", "amount": null, "origin": ""}),
        ],
    );
    let movements = finance::fetch_recent_cash_movements(&f.client, f.company)
        .await
        .into_result()
        .unwrap();
    assert_eq!(movements[0].id, "m2");
    assert_eq!(movements[0].kind, finance::MovementKind::Expense);
    assert_eq!(movements[0].amount, 0.0);
    assert_eq!(movements[0].origin, "N/A");
    assert_eq!(movements[1].kind, finance::MovementKind::Income);
}

#[tokio::test]
async fn open_cash_register_passes_prefixed_params() {
    let f = fixture();
    let branch = BranchId::new();
    f.backend.on_procedure("open_cash_register", |_, params| {
        Ok(json!({
            "id": "reg-1",
            "branch_id": params["p_branch_id"],
            "status": "open",
            "balance": params["p_opening_balance"],
            "opening_balance": params["p_opening_balance"],
            "opened_at": "2026-10-19T08:00:00Z",
            "opened_by": "someone",
        }))
    });

    let register = finance::open_cash_register(&f.client, branch, 150.0)
        .await
        .into_result()
        .unwrap();
    assert_eq!(register.branch_id, branch);
    assert_eq!(register.status, finance::RegisterState::Open);
    assert_eq!(register.opening_balance, 150.0);

    let calls = f.backend.procedure_calls();
    assert_eq!(calls[0].params["p_branch_id"], json!(branch));
}

#[tokio::test]
async fn audit_logs_default_missing_actor_fields() {
    let f = fixture();
    f.backend.set_rows(
        "view_audit_logs",
        vec![
            json!({"id": "l1", "company_id": f.company, "action_type": "user.added", "actor_email": null,
                   "created_at": "2026-10-18T10:00:00Z", "metadata": {"role": "admin"}}),
            json!({"id": "l2", "company_id": f.company, "action_type": "invite.sent", "actor_email": "ana@example.com",
                   "actor_name": "Ana", "created_at": "2026-10-19T10:00:00Z"}),
        ],
    );
    let logs = audit::fetch_audit_logs(&f.client, f.company).await.into_result().unwrap();
    assert_eq!(logs[0].id, "l2");
    assert_eq!(logs[1].actor_email, "");
    assert_eq!(logs[1].actor_name, "");
    assert_eq!(logs[1].metadata, Some(json!({"role": "admin"})));
}

#[tokio::test]
async fn settings_plan_defaults_and_missing_details() {
    let f = fixture();
    f.backend.set_rows(
        "view_company_plan",
        vec![json!({"company_id": f.company, "plan_name": null, "max_users": 5})],
    );
    let plan = settings::fetch_company_plan(&f.client, f.company)
        .await
        .into_result()
        .unwrap();
    assert_eq!(plan.plan_name, "Free");
    assert_eq!(plan.max_users, 5);
    assert_eq!(plan.max_branches, 0);

    let details = settings::fetch_company_details(&f.client, f.company).await;
    assert_eq!(details.error.as_deref(), Some(settings::COMPANY_NOT_FOUND));
}

#[tokio::test]
async fn settings_lists_users_roles_and_permissions() {
    let f = fixture();
    let user = UserId::new();
    f.backend.set_rows(
        "view_company_users",
        vec![json!({"user_id": user, "company_id": f.company, "full_name": "Ana", "email": "ana@example.com", "role": "admin"})],
    );
    f.backend.set_rows(
        "view_roles",
        vec![
            json!({"id": "r2", "name": "professional"}),
            json!({"id": "r1", "name": "admin", "description": "Full access"}),
        ],
    );
    f.backend.set_rows(
        "view_permissions",
        vec![
            json!({"id": "p2", "name": "read", "resource": "reports"}),
            json!({"id": "p1", "name": "write", "resource": "finance"}),
        ],
    );

    let members = settings::fetch_company_users(&f.client, f.company).await.into_result().unwrap();
    assert_eq!(members[0].id, user);

    let roles = settings::fetch_roles(&f.client).await.into_result().unwrap();
    assert_eq!(roles[0].name, "admin");
    assert_eq!(roles[1].description, "");

    let permissions = settings::fetch_permissions(&f.client).await.into_result().unwrap();
    assert_eq!(permissions[0].resource, "finance");
}

#[tokio::test]
async fn report_aggregates_cover_the_period() {
    let f = fixture();
    f.backend.set_rows(
        "view_financial_daily_summary",
        vec![
            json!({"company_id": f.company, "date": "2026-10-11", "total_income": 999, "total_expenses": 1}),
            json!({"company_id": f.company, "date": "2026-10-12", "total_income": 100, "total_expenses": 40}),
            json!({"company_id": f.company, "date": "2026-10-19", "total_income": 50, "total_expenses": null}),
        ],
    );
    let period = ReportPeriod::Last7Days;

    let money = reports::fetch_financial_summary_on(&f.client, f.company, period, today())
        .await
        .into_result()
        .unwrap();
    assert_eq!(money.total_income, 150.0);
    assert_eq!(money.total_expenses, 40.0);
    assert_eq!(money.net_result, 110.0);

    let overview = reports::fetch_appointments_overview_at(&f.client, f.company, period, now())
        .await
        .into_result()
        .unwrap();
    assert_eq!(overview.total_appointments, 3);
    assert_eq!(overview.completed_appointments, 1);
    assert_eq!(overview.cancelled_appointments, 1);
    assert_eq!(overview.upcoming_appointments, 1);

    let growth = reports::fetch_clients_growth_on(&f.client, f.company, period, today())
        .await
        .into_result()
        .unwrap();
    assert_eq!(growth.total_clients, 3);
    assert_eq!(growth.new_clients, 2);

    let activity = reports::fetch_professionals_activity_on(&f.client, f.company, period, today())
        .await
        .into_result()
        .unwrap();
    assert_eq!(activity.total_professionals, 2);
    assert_eq!(activity.active_professionals, 1);
}

#[tokio::test]
async fn administrative_activity_counts_and_keeps_ten_recent() {
    let f = fixture();
    let rows = (0..12)
        .map(|i| {
            let action = if i % 3 == 0 { "invite.sent" } else { "role.changed" };
            let actor = if i == 11 { None } else { Some("Ana") };
            json!({
                "id": format!("l{i:02}"),
                "company_id": f.company,
                "action_type": action,
                "actor_name": actor,
                "created_at": format!("2026-10-{:02}T10:00:00Z", i + 1),
            })
        })
        .collect();
    f.backend.set_rows("view_audit_logs", rows);

    let activity = reports::fetch_administrative_activity(&f.client, f.company)
        .await
        .into_result()
        .unwrap();
    assert_eq!(activity.action_counts["invite.sent"], 4);
    assert_eq!(activity.action_counts["role.changed"], 8);
    assert_eq!(activity.recent_actions.len(), 10);
    assert_eq!(activity.recent_actions[0].id, "l11");
    assert_eq!(activity.recent_actions[0].actor_name, "Unknown");
}

#[tokio::test]
async fn professionals_detail_exports_per_professional_counts() {
    let f = fixture();
    let rows = reports::fetch_professionals_detail(&f.client, f.company, ReportPeriod::Last7Days, today())
        .await
        .into_result()
        .unwrap();
    let csv = to_csv(&rows, ReportKind::Professionals.headers()).unwrap();
    assert_eq!(
        csv,
        format!(
            "professional_id,full_name,total_appointments_in_period\n{},Bruno,2\n{},Carla,0",
            f.bruno, f.carla
        )
    );
}

#[tokio::test]
async fn clients_detail_lists_clients_created_in_period() {
    let f = fixture();
    let rows = reports::fetch_clients_detail(&f.client, f.company, ReportPeriod::Last7Days, today())
        .await
        .into_result()
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.full_name.as_str()).collect();
    assert_eq!(names, vec!["Beto", ""]);
}

#[tokio::test]
async fn anamnesis_records_and_answers() {
    let f = fixture();
    let client_id = ClientId::new();
    let record = RecordId::new();
    f.backend.set_rows(
        "view_anamnesis_records",
        vec![json!({"id": record, "company_id": f.company, "client_id": client_id,
                    "template_name": null, "created_at": "2026-10-01T10:00:00Z", "appointment_id": ""})],
    );
    f.backend.set_rows(
        "view_anamnesis_answers",
        vec![
            json!({"company_id": f.company, "record_id": record, "question_id": "q2", "question_order": 2,
                   "question_text": "Allergies?", "field_type": "boolean", "answer": true}),
            json!({"company_id": f.company, "record_id": record, "question_id": "q1", "question_order": 1,
                   "question_text": "Notes", "answer": "none"}),
        ],
    );

    let records = anamnesis::fetch_client_anamnesis_records(&f.client, f.company, client_id)
        .await
        .into_result()
        .unwrap();
    assert_eq!(records[0].template_name, "N/A");
    assert_eq!(records[0].professional_name, "N/A");
    assert_eq!(records[0].appointment_id, None);

    let answers = anamnesis::fetch_anamnesis_answers(&f.client, f.company, record)
        .await
        .into_result()
        .unwrap();
    assert_eq!(answers[0].question_id, "q1");
    assert_eq!(answers[0].field_type, "text");
    assert_eq!(answers[1].answer, json!(true));
}

#[tokio::test]
async fn branches_and_companies_are_sorted_by_name() {
    let f = fixture();
    f.backend.set_rows(
        "view_my_branches",
        vec![
            json!({"id": BranchId::new(), "company_id": f.company, "name": "Zona Sul"}),
            json!({"id": BranchId::new(), "company_id": f.company, "name": "Centro", "client_count": 4}),
        ],
    );
    f.backend.set_rows(
        "view_my_companies",
        vec![json!({"id": f.other, "name": "Beta"}), json!({"id": f.company, "name": "Alpha"})],
    );

    let list = branches::fetch_my_branches(&f.client, f.company).await.into_result().unwrap();
    assert_eq!(list[0].name, "Centro");
    assert_eq!(list[0].client_count, Some(4));

    let mine = companies::get_my_companies(&f.client).await.into_result().unwrap();
    assert_eq!(mine[0].id, f.company);
}

#[tokio::test]
async fn set_active_branch_sends_null_for_all_branches() {
    let f = fixture();
    f.backend.on_procedure("set_active_branch", |_, _| Ok(serde_json::Value::Null));
    assert!(branches::set_active_branch(&f.client, None).await.is_ok());
    assert_eq!(f.backend.procedure_calls()[0].params, json!({"branch_id": null}));
}

#[tokio::test]
async fn membership_procedures_surface_backend_messages_verbatim() {
    let f = fixture();
    f.backend.on_procedure("add_company_user", |_, _| Ok(serde_json::Value::Null));
    f.backend.on_procedure("accept_invite", |_, _| {
        Err(BackendError::rejected("invite expired"))
    });

    assert!(users::add_company_user(&f.client, "ana@example.com", "admin").await.is_ok());
    let resp = users::accept_invite(&f.client, "tok-123").await;
    assert_eq!(resp.error.as_deref(), Some("invite expired"));

    let calls = f.backend.procedure_calls();
    assert_eq!(calls[0].params, json!({"user_email": "ana@example.com", "role_key": "admin"}));
    assert_eq!(calls[1].params, json!({"token": "tok-123"}));
}

#[tokio::test]
async fn pending_invites_and_cancel() {
    let f = fixture();
    let invite = InviteId::new();
    f.backend.set_rows(
        "view_pending_invites",
        vec![json!({"id": invite, "company_id": f.company, "email": "new@example.com", "role": "professional", "created_at": "2026-10-18T09:00:00Z"})],
    );
    f.backend.on_procedure("cancel_invite", |views, params| {
        let id = params["invite_id"].clone();
        views.rows_mut("view_pending_invites").retain(|r| r["id"] != id);
        Ok(serde_json::Value::Null)
    });

    let pending = users::fetch_pending_invites(&f.client, f.company).await.into_result().unwrap();
    assert_eq!(pending[0].id, invite);

    assert!(users::cancel_invite(&f.client, invite).await.is_ok());
    let pending = users::fetch_pending_invites(&f.client, f.company).await.into_result().unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn create_appointment_returns_the_new_id() {
    let f = fixture();
    f.backend.on_procedure("create_appointment", |_, _| Ok(json!("appt-77")));
    let request = appointments::NewAppointment {
        company_id: f.company,
        branch_id: BranchId::new(),
        professional_id: f.bruno,
        client_id: ClientId::new(),
        start_time: now(),
        end_time: "2026-10-19T11:00:00Z".parse().unwrap(),
    };
    let resp = appointments::create_appointment(&f.client, &request).await;
    assert_eq!(resp.data.as_deref(), Some("appt-77"));
    assert_eq!(
        f.backend.procedure_calls()[0].params["start_time"],
        json!("2026-10-19T10:00:00Z")
    );
}

#[tokio::test]
async fn transport_failures_become_generic_messages() {
    let f = fixture();
    f.backend.fail(
        FailurePoint::View("view_audit_logs".into()),
        BackendError::transport("connection reset"),
    );
    let resp = audit::fetch_audit_logs(&f.client, f.company).await;
    assert_eq!(
        resp.error.as_deref(),
        Some("Unexpected error communicating with backend: connection reset")
    );
}

#[tokio::test]
async fn unconfigured_client_short_circuits_every_area() {
    let client = BackendClient::unconfigured();
    let company = CompanyId::new();
    let expected = Some("Backend not configured");

    assert_eq!(dashboard::fetch_dashboard_kpis(&client, company).await.error.as_deref(), expected);
    assert_eq!(dashboard::fetch_upcoming_appointments(&client, company).await.error.as_deref(), expected);
    assert_eq!(finance::fetch_cash_register_status(&client, company).await.error.as_deref(), expected);
    assert_eq!(companies::get_my_companies(&client).await.error.as_deref(), expected);
    assert_eq!(users::accept_invite(&client, "t").await.error.as_deref(), expected);
}
