use std::sync::{Arc, Mutex};

use serde_json::{Value, json};

use parallax_app::pages::{self, Page, PageView};
use parallax_app::selectors::{CompanySelector, SwitchOutcome};
use parallax_app::shell::Sidebar;
use parallax_app::{RecordingNavigator, SessionStore, TenantContext, TenantContextStore};
use parallax_auth::{GateView, LOGIN_ROUTE, Role};
use parallax_backend::{AuthUser, BackendClient, BackendError, FailurePoint, InMemoryBackend};
use parallax_core::{CompanyId, UserId};

struct World {
    backend: Arc<InMemoryBackend>,
    client: BackendClient,
    user: AuthUser,
    acme: CompanyId,
    beta: CompanyId,
}

fn context_row(user: &AuthUser, company: CompanyId, name: &str, role: &str) -> Value {
    json!({
        "user_id": user.id,
        "full_name": user.full_name,
        "email": user.email,
        "company_id": company,
        "company_name": name,
        "branch_id": null,
        "role": role,
    })
}

/// Ana is admin of Acme and professional at Beta. Acme is active.
fn world() -> World {
    let backend = Arc::new(InMemoryBackend::new());
    let user = AuthUser {
        id: UserId::new(),
        email: "ana@example.com".to_string(),
        full_name: Some("Ana".to_string()),
    };
    let acme = CompanyId::new();
    let beta = CompanyId::new();

    backend.add_account("secret", user.clone());
    backend.set_rows(
        "user_active_company",
        vec![json!({"user_id": user.id, "company_id": acme, "branch_id": null})],
    );
    backend.set_rows("view_user_context", vec![context_row(&user, acme, "Acme", "admin")]);
    backend.set_rows(
        "view_my_companies",
        vec![json!({"id": acme, "name": "Acme"}), json!({"id": beta, "name": "Beta"})],
    );
    backend.set_rows(
        "view_audit_logs",
        vec![json!({"id": "l1", "company_id": acme, "action_type": "user_added", "created_at": "2026-10-18T12:00:00Z"})],
    );

    let memberships = vec![
        (acme, context_row(&user, acme, "Acme", "admin")),
        (beta, context_row(&user, beta, "Beta", "professional")),
    ];
    backend.on_procedure("set_active_company", move |views, params| {
        let wanted = params["company_id"].as_str().unwrap_or_default().to_string();
        let row = memberships
            .iter()
            .find(|(id, _)| id.to_string() == wanted)
            .map(|(_, row)| row.clone())
            .ok_or_else(|| BackendError::rejected("Not a member of that company"))?;
        views.set("view_user_context", vec![row]);
        Ok(Value::Null)
    });

    let client = BackendClient::new(backend.clone());
    World {
        backend,
        client,
        user,
        acme,
        beta,
    }
}

fn admin_only_visible(ctx: &TenantContext) -> bool {
    let sidebar = Sidebar::default();
    sidebar.can_reach(ctx, Page::Audit.route()) || sidebar.can_reach(ctx, Page::Finance.route())
}

#[tokio::test]
async fn switching_from_admin_to_professional_regates_everything() {
    let w = world();
    let session = SessionStore::new(w.client.clone(), Arc::new(RecordingNavigator::new()));
    assert!(session.sign_in("ana@example.com", "secret").await);
    assert_eq!(session.snapshot().gate_view(), GateView::Children);

    let store = TenantContextStore::new(w.client.clone());
    store.load_user_context().await;
    let before = store.snapshot();
    assert_eq!(before.role, Some(Role::ADMIN));
    assert!(admin_only_visible(&before));
    assert!(pages::audit::load(&w.client, &before).await.ready().is_some());

    // Capture what a reader sees while the switch procedure runs.
    let during: Arc<Mutex<Vec<TenantContext>>> = Arc::default();
    let observer = store.handle();
    let seen = during.clone();
    let observing = {
        let beta = w.beta;
        let acme = w.acme;
        let user = w.user.clone();
        move |views: &mut parallax_backend::Views, params: &Value| {
            if let Ok(mut seen) = seen.lock() {
                seen.push(observer.snapshot());
            }
            let wanted = params["company_id"].as_str().unwrap_or_default();
            let row = if wanted == beta.to_string() {
                context_row(&user, beta, "Beta", "professional")
            } else if wanted == acme.to_string() {
                context_row(&user, acme, "Acme", "admin")
            } else {
                return Err(BackendError::rejected("Not a member of that company"));
            };
            views.set("view_user_context", vec![row]);
            Ok(Value::Null)
        }
    };
    w.backend.on_procedure("set_active_company", observing);

    let mut selector = CompanySelector::new();
    selector.load(&w.client).await;
    assert_eq!(
        selector.select(&store, &before, w.beta).await,
        SwitchOutcome::Switched
    );

    // Mid-switch: still the old tenant, whole, and marked as loading.
    let during = during.lock().map(|s| s.clone()).unwrap_or_default();
    assert_eq!(during.len(), 1);
    assert!(during[0].loading);
    assert!(during[0].same_data(&before));

    let after = store.snapshot();
    assert!(!after.loading);
    assert_eq!(after.company_id, Some(w.beta));
    assert_eq!(after.company_name.as_deref(), Some("Beta"));
    assert_eq!(after.role, Some(Role::PROFESSIONAL));

    // Every gate now evaluates against the professional role.
    assert!(!admin_only_visible(&after));
    for page in Page::ALL {
        let expected = match page.allowed_roles() {
            None => true,
            Some(allowed) => Role::PROFESSIONAL.is_in(allowed),
        };
        assert_eq!(page.gate(&after) == GateView::Children, expected, "{page:?}");
    }
    assert_eq!(pages::audit::load(&w.client, &after).await, PageView::Restricted);

    // No state ever paired the new company with the old role.
    for ctx in during.iter().chain([&before, &after]) {
        assert!(!(ctx.company_id == Some(w.beta) && ctx.role == Some(Role::ADMIN)));
    }
}

#[tokio::test]
async fn rejected_switch_leaves_the_tenant_untouched() {
    let w = world();
    let store = TenantContextStore::new(w.client.clone());
    store.load_user_context().await;
    let before = store.snapshot();

    let stranger = CompanyId::new();
    assert!(!store.switch_company(stranger).await);

    let after = store.snapshot();
    assert!(after.same_data(&before));
    assert_eq!(after.error.as_deref(), Some("Not a member of that company"));
    assert!(admin_only_visible(&after));
}

#[tokio::test]
async fn reload_failure_after_switch_clears_the_context() {
    let w = world();
    let store = TenantContextStore::new(w.client.clone());
    store.load_user_context().await;

    w.backend.fail(
        FailurePoint::View("view_user_context".into()),
        BackendError::transport("connection reset"),
    );
    assert!(!store.switch_company(w.beta).await);

    let ctx = store.snapshot();
    assert_eq!(ctx.company_id, None);
    assert_eq!(ctx.role, None);
    assert!(!admin_only_visible(&ctx));
    assert_eq!(Page::Clients.gate(&ctx), GateView::AccessRestricted);
}

#[tokio::test]
async fn sign_out_returns_to_login() {
    let w = world();
    let navigator = Arc::new(RecordingNavigator::new());
    let session = SessionStore::new(w.client.clone(), navigator.clone());
    assert!(session.sign_in("ana@example.com", "secret").await);

    session.sign_out().await;

    assert_eq!(session.snapshot().gate_view(), GateView::Redirect(LOGIN_ROUTE));
    assert_eq!(navigator.routes(), [LOGIN_ROUTE]);
}
