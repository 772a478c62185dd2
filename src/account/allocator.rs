//! Account number allocation
//!
//! Random fixed-width numerals checked against the store. There is no
//! persistent counter; the store's unique constraint is the final arbiter
//! and callers retry when an insert loses a race.

use rand::Rng;

use crate::core_types::AccountNumber;
use crate::error::BankError;
use crate::store::AccountStore;

pub const DEFAULT_WIDTH: u32 = 12;
pub const MAX_WIDTH: u32 = 18;
pub const DEFAULT_COLLISION_CHECK_INTERVAL: u32 = 64;

#[derive(Debug, Clone)]
pub struct AccountNumberAllocator {
    width: u32,
    low: u64,
    high: u64,
    collision_check_interval: u32,
}

impl Default for AccountNumberAllocator {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            low: 10u64.pow(DEFAULT_WIDTH - 1),
            high: 10u64.pow(DEFAULT_WIDTH) - 1,
            collision_check_interval: DEFAULT_COLLISION_CHECK_INTERVAL,
        }
    }
}

impl AccountNumberAllocator {
    /// `width` digits, first digit never zero. After every
    /// `collision_check_interval` consecutive collisions the store is
    /// counted to detect a saturated space.
    pub fn new(width: u32, collision_check_interval: u32) -> Result<Self, BankError> {
        if width == 0 || width > MAX_WIDTH {
            return Err(BankError::ValidationError(format!(
                "account number width must be 1..={}, got {}",
                MAX_WIDTH, width
            )));
        }
        Ok(Self {
            width,
            low: 10u64.pow(width - 1),
            high: 10u64.pow(width) - 1,
            collision_check_interval: collision_check_interval.max(1),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    /// Size of the identifier space
    pub fn capacity(&self) -> u64 {
        self.high - self.low + 1
    }

    /// One random candidate, not checked against anything
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> AccountNumber {
        AccountNumber::new(rng.gen_range(self.low..=self.high).to_string())
    }

    /// Draw until a number unknown to the store comes up.
    ///
    /// Fails with `AllocationExhausted` only once the store holds at least
    /// `capacity()` accounts.
    pub async fn allocate<S>(&self, store: &S) -> Result<AccountNumber, BankError>
    where
        S: AccountStore + ?Sized,
    {
        let mut collisions: u64 = 0;
        loop {
            let candidate = self.draw(&mut rand::thread_rng());
            if !store.account_number_exists(&candidate).await? {
                if collisions > 0 {
                    tracing::debug!(collisions, "Account number allocated after collisions");
                }
                return Ok(candidate);
            }

            collisions += 1;
            if collisions % u64::from(self.collision_check_interval) == 0 {
                let population = store.count_accounts().await?;
                if population >= self.capacity() {
                    tracing::error!(
                        width = self.width,
                        population,
                        "Account number space exhausted"
                    );
                    return Err(BankError::AllocationExhausted);
                }
                tracing::warn!(
                    width = self.width,
                    population,
                    collisions,
                    "Repeated account number collisions"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::models::{AccountType, NewAccount};
    use crate::customer::models::NewCustomer;
    use crate::store::{AccountStore, CustomerStore, MemoryStore};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal::Decimal;

    async fn store_with_customer() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .create_customer(NewCustomer {
                name: "Ravi".into(),
                email: "ravi@example.com".into(),
                phone: None,
                password_hash: "h".into(),
            })
            .await
            .unwrap();
        store
    }

    async fn insert(store: &MemoryStore, no: AccountNumber) {
        store
            .create_account(NewAccount {
                account_number: no,
                customer_id: 1,
                ifsc: "IFSC001".into(),
                account_type: AccountType::Savings,
                initial_balance: Decimal::ZERO,
            })
            .await
            .unwrap();
    }

    #[test]
    fn test_width_validation() {
        assert!(AccountNumberAllocator::new(0, 8).is_err());
        assert!(AccountNumberAllocator::new(19, 8).is_err());
        assert!(AccountNumberAllocator::new(11, 8).is_ok());
        assert!(AccountNumberAllocator::new(18, 8).is_ok());
    }

    #[test]
    fn test_draw_is_fixed_width_without_leading_zero() {
        let alloc = AccountNumberAllocator::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let no = alloc.draw(&mut rng);
            assert_eq!(no.as_str().len(), 12);
            assert!(!no.as_str().starts_with('0'));
            assert!(no.as_str().bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_capacity() {
        assert_eq!(AccountNumberAllocator::new(1, 1).unwrap().capacity(), 9);
        assert_eq!(AccountNumberAllocator::new(2, 1).unwrap().capacity(), 90);
        assert_eq!(
            AccountNumberAllocator::default().capacity(),
            900_000_000_000
        );
    }

    #[tokio::test]
    async fn test_allocate_skips_taken_numbers() {
        let store = store_with_customer().await;
        let alloc = AccountNumberAllocator::new(1, 4).unwrap();
        for d in 1..=8u8 {
            insert(&store, AccountNumber::new(d.to_string())).await;
        }
        let no = alloc.allocate(&store).await.unwrap();
        assert_eq!(no.as_str(), "9");
    }

    #[tokio::test]
    async fn test_allocate_reports_exhaustion() {
        let store = store_with_customer().await;
        let alloc = AccountNumberAllocator::new(1, 4).unwrap();
        for d in 1..=9u8 {
            insert(&store, AccountNumber::new(d.to_string())).await;
        }
        let err = alloc.allocate(&store).await.unwrap_err();
        assert_eq!(err, BankError::AllocationExhausted);
    }

    #[tokio::test]
    async fn test_ten_thousand_allocations_are_unique() {
        let store = store_with_customer().await;
        let alloc = AccountNumberAllocator::default();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            insert(&store, alloc.draw(&mut rng)).await;
        }
        let existing = store.count_accounts().await.unwrap();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            let no = alloc.allocate(&store).await.unwrap();
            assert!(seen.insert(no.clone()), "duplicate {}", no);
            insert(&store, no).await;
        }
        assert_eq!(store.count_accounts().await.unwrap(), existing + 10_000);
    }
}
