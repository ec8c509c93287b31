use serde::{Deserialize, Serialize};

use parallax_core::{BranchId, CompanyId, UserId};

/// Identity of an authenticated user, as returned by the backend's auth endpoint.
///
/// Immutable from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
}

/// The authoritative (user, company, branch) triple for a signed-in user.
///
/// Set by the backend at login and changed only through the explicit
/// switch-company / switch-branch procedures; the client never edits it in place.
/// `branch_id = None` means "all branches".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCompanyBinding {
    pub user_id: UserId,
    pub company_id: CompanyId,
    #[serde(default)]
    pub branch_id: Option<BranchId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_reads_backend_row_with_null_branch() {
        let row = serde_json::json!({
            "user_id": "0190a1b2-0000-7000-8000-000000000001",
            "company_id": "0190a1b2-0000-7000-8000-000000000002",
            "branch_id": null,
        });
        let binding: ActiveCompanyBinding = serde_json::from_value(row).unwrap();
        assert!(binding.branch_id.is_none());
        assert_eq!(
            binding.company_id.to_string(),
            "0190a1b2-0000-7000-8000-000000000002"
        );
    }

    #[test]
    fn binding_tolerates_missing_branch_column() {
        let row = serde_json::json!({
            "user_id": "0190a1b2-0000-7000-8000-000000000001",
            "company_id": "0190a1b2-0000-7000-8000-000000000002",
        });
        let binding: ActiveCompanyBinding = serde_json::from_value(row).unwrap();
        assert_eq!(binding.branch_id, None);
    }
}
