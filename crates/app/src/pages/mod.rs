//! Page view-models.
//!
//! Every page waits for a settled tenant context, applies its role gate, and
//! only then fetches. Reads run concurrently; the headline read decides
//! whether the page renders, secondary reads degrade to empty sections.

use serde::Serialize;

use parallax_auth::{GateView, Role};
use parallax_core::CompanyId;

use crate::TenantContext;

pub mod anamnesis;
pub mod audit;
pub mod dashboard;
pub mod finance;
pub mod invite;
pub mod reports;
pub mod settings;

pub const NO_COMPANY_MESSAGE: &str = "No company selected";

const ADMIN: &[Role] = &[Role::ADMIN];
const STAFF: &[Role] = &[Role::ADMIN, Role::PROFESSIONAL];

/// Routed pages and who may open them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Dashboard,
    Schedule,
    Appointments,
    Services,
    Clients,
    Professionals,
    Finance,
    Reports,
    Settings,
    Users,
    Audit,
    Anamnesis,
}

impl Page {
    pub const ALL: [Page; 12] = [
        Page::Dashboard,
        Page::Schedule,
        Page::Appointments,
        Page::Services,
        Page::Clients,
        Page::Professionals,
        Page::Finance,
        Page::Reports,
        Page::Settings,
        Page::Users,
        Page::Audit,
        Page::Anamnesis,
    ];

    pub fn route(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Schedule => "/agenda",
            Page::Appointments => "/operacao/atendimentos",
            Page::Services => "/servicos",
            Page::Clients => "/pessoas/clientes",
            Page::Professionals => "/pessoas/profissionais",
            Page::Finance => "/financeiro",
            Page::Reports => "/sistema/relatorios",
            Page::Settings => "/sistema",
            Page::Users => "/sistema/usuarios",
            Page::Audit => "/sistema/auditoria",
            Page::Anamnesis => "/pessoas/clientes/anamnese",
        }
    }

    /// `None` when every signed-in role may open the page.
    pub fn allowed_roles(&self) -> Option<&'static [Role]> {
        match self {
            Page::Dashboard | Page::Schedule | Page::Services => None,
            Page::Clients | Page::Appointments | Page::Anamnesis => Some(STAFF),
            Page::Professionals
            | Page::Finance
            | Page::Reports
            | Page::Settings
            | Page::Users
            | Page::Audit => Some(ADMIN),
        }
    }

    pub fn gate(&self, ctx: &TenantContext) -> GateView {
        match self.allowed_roles() {
            None => GateView::Children,
            Some(allowed) => ctx.role_gate(allowed),
        }
    }
}

/// What a page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "snake_case")]
pub enum PageView<T> {
    /// The role gate said no.
    Restricted,
    /// Signed in, but the context has no company.
    NoCompany,
    /// The headline read failed.
    Failed(String),
    Ready(T),
}

impl<T> PageView<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            PageView::Ready(data) => Some(data),
            _ => None,
        }
    }
}

/// Gate and scope check shared by every page. `Ok` carries the company to read.
pub(crate) fn admit<T>(page: Page, ctx: &TenantContext) -> Result<CompanyId, PageView<T>> {
    if page.gate(ctx) != GateView::Children {
        return Err(PageView::Restricted);
    }
    ctx.company_id.ok_or(PageView::NoCompany)
}

/// A secondary section: data or an empty default, plus the error if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section<T> {
    pub data: T,
    pub error: Option<String>,
}

impl<T: Default> Section<T> {
    pub(crate) fn from_response(response: parallax_services::ServiceResponse<T>) -> Self {
        Self {
            data: response.data.unwrap_or_default(),
            error: response.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_auth::NavigationTaxonomy;

    fn loaded(role: Option<Role>, company: Option<CompanyId>) -> TenantContext {
        TenantContext {
            role,
            company_id: company,
            loading: false,
            ..TenantContext::initial()
        }
    }

    #[test]
    fn page_gates_agree_with_the_sidebar() {
        let taxonomy = NavigationTaxonomy::standard();
        for role in [Role::ADMIN, Role::PROFESSIONAL, Role::CLIENT] {
            let ctx = loaded(Some(role.clone()), Some(CompanyId::new()));
            for page in Page::ALL {
                let Some(item) = taxonomy.find_item(page.route()) else {
                    continue;
                };
                let in_sidebar = taxonomy
                    .visible(ctx.role_state())
                    .iter()
                    .flat_map(|g| g.items.iter())
                    .any(|i| i.path == item.path);
                assert_eq!(
                    in_sidebar,
                    page.gate(&ctx) == GateView::Children,
                    "{page:?} for {role:?}"
                );
            }
        }
    }

    #[test]
    fn admit_checks_gate_then_company() {
        let professional = loaded(Some(Role::PROFESSIONAL), Some(CompanyId::new()));
        assert_eq!(
            admit::<()>(Page::Finance, &professional),
            Err(PageView::Restricted)
        );
        assert!(admit::<()>(Page::Clients, &professional).is_ok());

        let no_company = loaded(None, None);
        assert_eq!(admit::<()>(Page::Dashboard, &no_company), Err(PageView::NoCompany));
        assert_eq!(admit::<()>(Page::Audit, &no_company), Err(PageView::Restricted));
    }
}
