//! Roles and permissions.
//!
//! Permissions are `<resource>:<action>` strings. Every role maps to a
//! fixed permission set; the admin role bypasses permission checks in the
//! middleware entirely.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Role names carried in the `role` claim.
pub mod role {
    pub const ADMIN: &str = "admin";
    /// Manufacturer-side staff, distinct from dealer-side roles
    pub const EVM_STAFF: &str = "evm_staff";
    pub const DEALER_MANAGER: &str = "dealer_manager";
    pub const DEALER_STAFF: &str = "dealer_staff";
    pub const CUSTOMER: &str = "customer";
}

/// Permission string constants for compile-time safety.
pub mod consts {
    // Vehicle catalog
    pub const VEHICLES_READ: &str = "vehicles:read";
    pub const VEHICLES_MANAGE: &str = "vehicles:manage";

    // Customers
    pub const CUSTOMERS_READ: &str = "customers:read";
    pub const CUSTOMERS_MANAGE: &str = "customers:manage";

    // Dealers
    pub const DEALERS_READ: &str = "dealers:read";
    pub const DEALERS_MANAGE: &str = "dealers:manage";

    // Quotations
    pub const QUOTATIONS_READ: &str = "quotations:read";
    pub const QUOTATIONS_CREATE: &str = "quotations:create";
    pub const QUOTATIONS_TRANSITION: &str = "quotations:transition";
    pub const QUOTATIONS_DELETE: &str = "quotations:delete";

    // Orders
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE: &str = "orders:update";
    pub const ORDERS_DELETE: &str = "orders:delete";

    // Dealer orders
    pub const DEALER_ORDERS_READ: &str = "dealer-orders:read";
    pub const DEALER_ORDERS_MANAGE: &str = "dealer-orders:manage";

    // Invoices
    pub const INVOICES_READ: &str = "invoices:read";
    pub const INVOICES_MANAGE: &str = "invoices:manage";

    // Installments
    pub const INSTALLMENTS_READ: &str = "installments:read";
    pub const INSTALLMENTS_MANAGE: &str = "installments:manage";

    // Payments
    pub const PAYMENTS_READ: &str = "payments:read";
    pub const PAYMENTS_MANAGE: &str = "payments:manage";

    // Appointments
    pub const APPOINTMENTS_READ: &str = "appointments:read";
    pub const APPOINTMENTS_MANAGE: &str = "appointments:manage";

    // Feedback
    pub const FEEDBACK_READ: &str = "feedback:read";
    pub const FEEDBACK_CREATE: &str = "feedback:create";

    // Uploads
    pub const UPLOADS_MANAGE: &str = "uploads:manage";
}

lazy_static! {
    /// Role → permission set. ADMIN is intentionally absent: the
    /// middleware grants it everything.
    pub static ref ROLE_PERMISSIONS: HashMap<&'static str, Vec<&'static str>> = {
        use consts::*;
        let mut map = HashMap::new();
        map.insert(
            role::EVM_STAFF,
            vec![
                VEHICLES_READ,
                VEHICLES_MANAGE,
                CUSTOMERS_READ,
                CUSTOMERS_MANAGE,
                DEALERS_READ,
                DEALERS_MANAGE,
                QUOTATIONS_READ,
                QUOTATIONS_CREATE,
                QUOTATIONS_TRANSITION,
                ORDERS_READ,
                ORDERS_CREATE,
                ORDERS_UPDATE,
                DEALER_ORDERS_READ,
                DEALER_ORDERS_MANAGE,
                INVOICES_READ,
                INVOICES_MANAGE,
                INSTALLMENTS_READ,
                INSTALLMENTS_MANAGE,
                PAYMENTS_READ,
                PAYMENTS_MANAGE,
                APPOINTMENTS_READ,
                APPOINTMENTS_MANAGE,
                FEEDBACK_READ,
                UPLOADS_MANAGE,
            ],
        );
        map.insert(
            role::DEALER_MANAGER,
            vec![
                VEHICLES_READ,
                CUSTOMERS_READ,
                CUSTOMERS_MANAGE,
                QUOTATIONS_READ,
                QUOTATIONS_CREATE,
                QUOTATIONS_TRANSITION,
                ORDERS_READ,
                ORDERS_CREATE,
                ORDERS_UPDATE,
                DEALER_ORDERS_READ,
                DEALER_ORDERS_MANAGE,
                INVOICES_READ,
                INSTALLMENTS_READ,
                INSTALLMENTS_MANAGE,
                PAYMENTS_READ,
                PAYMENTS_MANAGE,
                APPOINTMENTS_READ,
                APPOINTMENTS_MANAGE,
                FEEDBACK_READ,
            ],
        );
        map.insert(
            role::DEALER_STAFF,
            vec![
                VEHICLES_READ,
                CUSTOMERS_READ,
                QUOTATIONS_READ,
                QUOTATIONS_CREATE,
                ORDERS_READ,
                DEALER_ORDERS_READ,
                INVOICES_READ,
                INSTALLMENTS_READ,
                PAYMENTS_READ,
                APPOINTMENTS_READ,
                APPOINTMENTS_MANAGE,
                FEEDBACK_READ,
            ],
        );
        map.insert(
            role::CUSTOMER,
            vec![
                VEHICLES_READ,
                QUOTATIONS_READ,
                ORDERS_READ,
                APPOINTMENTS_READ,
                FEEDBACK_CREATE,
            ],
        );
        map
    };
}

/// Permissions granted to a role. Unknown roles get nothing.
pub fn permissions_for_role(role_name: &str) -> Vec<String> {
    ROLE_PERMISSIONS
        .get(role_name)
        .map(|perms| perms.iter().map(|p| p.to_string()).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dealer_staff_cannot_transition_quotations() {
        let perms = permissions_for_role(role::DEALER_STAFF);
        assert!(perms.contains(&consts::QUOTATIONS_CREATE.to_string()));
        assert!(!perms.contains(&consts::QUOTATIONS_TRANSITION.to_string()));
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        assert!(permissions_for_role("intern").is_empty());
    }

    #[test]
    fn evm_staff_manages_dealer_orders() {
        let perms = permissions_for_role(role::EVM_STAFF);
        assert!(perms.contains(&consts::DEALER_ORDERS_MANAGE.to_string()));
        assert!(perms.contains(&consts::INVOICES_MANAGE.to_string()));
    }
}
