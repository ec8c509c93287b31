use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use parallax_app::TenantContext;
use parallax_app::pages::{self, PageView};
use parallax_auth::{ACCESS_RESTRICTED_MESSAGE, Role};
use parallax_backend::{BackendClient, BackendError, FailurePoint, InMemoryBackend};
use parallax_core::{ClientId, CompanyId, RecordId};
use parallax_services::{ReportKind, ReportPeriod, dashboard, settings};

fn now() -> DateTime<Utc> {
    "2026-10-19T10:00:00Z".parse().unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn ctx(role: Option<Role>, company: Option<CompanyId>) -> TenantContext {
    TenantContext {
        role,
        company_id: company,
        loading: false,
        ..TenantContext::initial()
    }
}

fn seeded() -> (Arc<InMemoryBackend>, BackendClient, CompanyId) {
    let backend = Arc::new(InMemoryBackend::new());
    let company = CompanyId::new();
    backend.set_rows(
        "view_clients",
        vec![
            json!({"id": ClientId::new(), "company_id": company, "full_name": "Ana", "created_at": "2026-08-01T12:00:00Z"}),
            json!({"id": ClientId::new(), "company_id": company, "full_name": "Beto", "created_at": "2026-10-13T12:00:00Z"}),
        ],
    );
    backend.set_rows(
        "view_professionals",
        vec![json!({"id": "p1", "company_id": company, "full_name": "Carla"})],
    );
    backend.set_rows(
        "view_appointments",
        vec![
            json!({"id": "a1", "company_id": company, "client_name": "Ana", "professional_name": "Carla",
                   "service_name": "Cut", "status": "scheduled", "start_time": "2026-10-19T15:00:00Z"}),
        ],
    );
    backend.set_rows(
        "view_company_details",
        vec![json!({"id": company, "name": "Acme", "email": "hello@acme.test"})],
    );
    let client = BackendClient::new(backend.clone());
    (backend, client, company)
}

#[tokio::test]
async fn dashboard_renders_kpis_and_upcoming() {
    let (_, client, company) = seeded();
    let view = pages::dashboard::load_at(&client, &ctx(Some(Role::ADMIN), Some(company)), now()).await;

    let page = view.ready().expect("dashboard should render");
    assert_eq!(page.kpis.total_clients, 2);
    assert_eq!(page.kpis.active_professionals, 1);
    assert_eq!(page.kpis.appointments_today, 1);
    assert_eq!(page.upcoming.data.len(), 1);
    assert_eq!(page.upcoming.error, None);
}

#[tokio::test]
async fn dashboard_headline_failure_blocks_the_page() {
    let (backend, client, company) = seeded();
    backend.fail(
        FailurePoint::View("view_clients".into()),
        BackendError::rejected("permission denied"),
    );
    let view = pages::dashboard::load_at(&client, &ctx(Some(Role::ADMIN), Some(company)), now()).await;
    assert_eq!(view, PageView::Failed(dashboard::CLIENTS_FAILED.to_string()));
}

#[tokio::test]
async fn no_company_is_an_empty_state() {
    let (backend, client, _) = seeded();
    let view = pages::dashboard::load_at(&client, &ctx(None, None), now()).await;
    assert_eq!(view, PageView::NoCompany);
    assert!(backend.queries().is_empty());
}

#[tokio::test]
async fn finance_tolerates_secondary_failures() {
    let (backend, client, company) = seeded();
    backend.fail(
        FailurePoint::View("view_cash_movements".into()),
        BackendError::transport("timeout"),
    );
    let view = pages::finance::load_on(&client, &ctx(Some(Role::ADMIN), Some(company)), today()).await;

    let page = view.ready().expect("finance should render");
    assert!(!page.status.is_open);
    assert!(page.movements.data.is_empty());
    assert_eq!(
        page.movements.error.as_deref(),
        Some("Unexpected error communicating with backend: timeout")
    );
    assert_eq!(page.today.error, None);
}

#[tokio::test]
async fn finance_is_admin_only_and_fetches_nothing_otherwise() {
    let (backend, client, company) = seeded();
    let view = pages::finance::load_on(&client, &ctx(Some(Role::PROFESSIONAL), Some(company)), today()).await;
    assert_eq!(view, PageView::Restricted);
    assert!(backend.queries().is_empty());
}

#[tokio::test]
async fn opening_the_register_needs_a_branch() {
    let (_, client, company) = seeded();
    let response = pages::finance::open_register(&client, &ctx(Some(Role::ADMIN), Some(company)), 50.0).await;
    assert_eq!(response.error.as_deref(), Some(pages::finance::BRANCH_REQUIRED));
}

#[tokio::test]
async fn settings_renders_with_missing_plan() {
    let (backend, client, company) = seeded();
    backend.fail(
        FailurePoint::View("view_company_users".into()),
        BackendError::rejected("permission denied"),
    );
    let view = pages::settings::load(&client, &ctx(Some(Role::ADMIN), Some(company))).await;

    let page = view.ready().expect("settings should render");
    assert_eq!(page.company.name, "Acme");
    assert_eq!(page.users.error.as_deref(), Some("permission denied"));
    assert_eq!(page.plan.data, None);
    assert_eq!(page.plan.error.as_deref(), Some(settings::PLAN_NOT_FOUND));
    assert!(page.invites.data.is_empty());
}

#[tokio::test]
async fn settings_without_company_details_fails() {
    let (backend, client, company) = seeded();
    backend.set_rows("view_company_details", vec![]);
    let view = pages::settings::load(&client, &ctx(Some(Role::ADMIN), Some(company))).await;
    assert_eq!(view, PageView::Failed(settings::COMPANY_NOT_FOUND.to_string()));
}

#[tokio::test]
async fn reports_page_loads_for_the_period() {
    let (_, client, company) = seeded();
    let view = pages::reports::load_at(
        &client,
        &ctx(Some(Role::ADMIN), Some(company)),
        ReportPeriod::Last7Days,
        now(),
    )
    .await;

    let page = view.ready().expect("reports should render");
    assert_eq!(page.period, ReportPeriod::Last7Days);
    assert_eq!(page.financial.net_result, 0.0);
    assert_eq!(page.clients.data.new_clients, 1);
}

#[tokio::test]
async fn export_writes_the_clients_csv() {
    let (_, client, company) = seeded();
    let dir = tempfile::tempdir().unwrap();

    let path = pages::reports::export(
        &client,
        &ctx(Some(Role::ADMIN), Some(company)),
        ReportKind::Clients,
        ReportPeriod::Last30Days,
        today(),
        dir.path(),
    )
    .await
    .into_result()
    .unwrap();

    assert!(path.ends_with("parallax_clients_30d_2026-10-19.csv"));
    let csv = std::fs::read_to_string(path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("client_id,full_name,created_at"));
    let rows: Vec<&str> = lines.collect();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].contains("Beto"));
}

#[tokio::test]
async fn export_is_refused_to_professionals() {
    let (_, client, company) = seeded();
    let dir = tempfile::tempdir().unwrap();
    let response = pages::reports::export(
        &client,
        &ctx(Some(Role::PROFESSIONAL), Some(company)),
        ReportKind::Audit,
        ReportPeriod::Last30Days,
        today(),
        dir.path(),
    )
    .await;
    assert_eq!(response.error.as_deref(), Some(ACCESS_RESTRICTED_MESSAGE));
}

#[tokio::test]
async fn anamnesis_opens_the_newest_record() {
    let (backend, client, company) = seeded();
    let patient = ClientId::new();
    let older = RecordId::new();
    let newer = RecordId::new();
    backend.set_rows(
        "view_anamnesis_records",
        vec![
            json!({"id": older, "company_id": company, "client_id": patient, "template_name": "Intake",
                   "created_at": "2026-09-01T10:00:00Z"}),
            json!({"id": newer, "company_id": company, "client_id": patient, "template_name": "Follow-up",
                   "created_at": "2026-10-01T10:00:00Z"}),
        ],
    );
    backend.set_rows(
        "view_anamnesis_answers",
        vec![
            json!({"company_id": company, "record_id": newer, "question_id": "q2", "question_order": 2,
                   "question_text": "Allergies?", "answer": "None"}),
            json!({"company_id": company, "record_id": newer, "question_id": "q1", "question_order": 1,
                   "question_text": "Medication?", "answer": null}),
            json!({"company_id": company, "record_id": older, "question_id": "q9", "question_order": 1}),
        ],
    );
    let context = ctx(Some(Role::PROFESSIONAL), Some(company));

    let view = pages::anamnesis::load(&client, &context, patient).await;
    let mut page = match view {
        PageView::Ready(page) => page,
        other => panic!("unexpected view: {other:?}"),
    };
    assert_eq!(page.selected, Some(newer));
    let questions: Vec<&str> = page.answers.data.iter().map(|a| a.question_id.as_str()).collect();
    assert_eq!(questions, ["q1", "q2"]);

    pages::anamnesis::select(&client, &context, &mut page, older).await;
    assert_eq!(page.selected, Some(older));
    assert_eq!(page.answers.data.len(), 1);
    assert_eq!(page.answers.data[0].field_type, "text");
}

#[tokio::test]
async fn pages_wait_for_the_tenant_context() {
    let (backend, client, company) = seeded();
    backend.set_rows(
        "view_user_context",
        vec![json!({"user_id": parallax_core::UserId::new(), "company_id": company, "role": "admin"})],
    );
    backend.set_rows(
        "view_audit_logs",
        vec![json!({"id": "l1", "company_id": company, "action_type": "role_changed"})],
    );
    let store = parallax_app::TenantContextStore::new(client.clone());
    let mut handle = store.handle();

    let (_, view) = tokio::join!(store.load_user_context(), pages::audit::open(&client, &mut handle));

    let page = view.ready().expect("audit should render once the context lands");
    assert_eq!(page.logs.len(), 1);
    assert_eq!(page.logs[0].action_type, "role_changed");
}
