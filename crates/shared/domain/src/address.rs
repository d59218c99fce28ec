//! Client address book.
//!
//! A client keeps any number of delivery addresses. At most one is the
//! default, and once a client has an address they always keep at least one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved client address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAddress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whether an address can be removed from a book holding `total` entries.
pub fn can_remove_address(total: u64) -> bool {
    total > 1
}

/// Pick the address that inherits the default flag when `removed` goes away.
///
/// The oldest remaining address wins; `None` when nothing is left.
pub fn next_default_address(addresses: &[UserAddress], removed: Uuid) -> Option<&UserAddress> {
    addresses
        .iter()
        .filter(|a| a.id != removed)
        .min_by_key(|a| (a.created_at, a.id))
}

/// Sort order used when listing: default first, then newest first.
pub fn sort_address_book(addresses: &mut [UserAddress]) {
    addresses.sort_by(|a, b| {
        b.is_default
            .cmp(&a.is_default)
            .then(b.created_at.cmp(&a.created_at))
    });
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserAddressResponse {
    pub id: Uuid,
    #[cfg_attr(feature = "openapi", schema(example = "Av. Insurgentes Sur 1234"))]
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    #[cfg_attr(feature = "openapi", schema(example = "03100"))]
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserAddress> for UserAddressResponse {
    fn from(a: UserAddress) -> Self {
        Self {
            id: a.id,
            address_line1: a.address_line1,
            address_line2: a.address_line2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
            is_default: a.is_default,
            created_at: a.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn address(is_default: bool, age_days: i64) -> UserAddress {
        let created_at = Utc::now() - Duration::days(age_days);
        UserAddress {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            address_line1: "Calle Reforma 10".into(),
            address_line2: None,
            city: "Querétaro".into(),
            state: "Querétaro".into(),
            postal_code: "76000".into(),
            country: "MX".into(),
            is_default,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_last_address_cannot_be_removed() {
        assert!(!can_remove_address(0));
        assert!(!can_remove_address(1));
        assert!(can_remove_address(2));
    }

    #[test]
    fn test_oldest_remaining_address_inherits_default() {
        let current = address(true, 30);
        let older = address(false, 20);
        let newer = address(false, 1);
        let book = vec![current.clone(), newer, older.clone()];

        let next = next_default_address(&book, current.id).unwrap();
        assert_eq!(next.id, older.id);
        assert!(next_default_address(&[current.clone()], current.id).is_none());
    }

    #[test]
    fn test_default_address_sorts_first() {
        let old_default = address(true, 10);
        let newest = address(false, 0);
        let middle = address(false, 5);
        let mut book = vec![middle.clone(), newest.clone(), old_default.clone()];

        sort_address_book(&mut book);

        let ids: Vec<Uuid> = book.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![old_default.id, newest.id, middle.id]);
    }
}
