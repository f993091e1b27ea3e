//! In-memory Discount Repository

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use jiff::Timestamp;
use rustc_hash::FxHashMap;

use crate::{
    discounts::Discount,
    repository::{DiscountRepository, RepositoryError},
};

#[derive(Debug, Default)]
struct State {
    discounts: FxHashMap<String, Discount>,

    /// code -> discount id
    codes: FxHashMap<String, String>,
}

impl State {
    fn insert(&mut self, discount: Discount) {
        if let Some(previous) = self.discounts.get(&discount.id)
            && let Some(code) = &previous.code
        {
            self.codes.remove(code);
        }

        if let Some(code) = &discount.code
            && let Some(owner) = self.codes.insert(code.clone(), discount.id.clone())
            && owner != discount.id
            && let Some(previous) = self.discounts.get_mut(&owner)
        {
            previous.code = None;
        }

        self.discounts.insert(discount.id.clone(), discount);
    }
}

/// Discount repository held in process memory.
///
/// All mutations take the write lock, so usage increments are atomic per discount.
#[derive(Debug, Default)]
pub struct InMemoryDiscountRepository {
    state: RwLock<State>,
}

impl InMemoryDiscountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository holding the given discounts.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Poisoned`] if the lock is poisoned.
    pub fn with_discounts(
        discounts: impl IntoIterator<Item = Discount>,
    ) -> Result<Self, RepositoryError> {
        let repository = Self::new();

        repository.seed(discounts)?;

        Ok(repository)
    }

    /// Insert discounts in bulk, replacing any existing discount with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Poisoned`] if the lock is poisoned.
    pub fn seed(
        &self,
        discounts: impl IntoIterator<Item = Discount>,
    ) -> Result<(), RepositoryError> {
        let mut state = self.write()?;

        for discount in discounts {
            state.insert(discount);
        }

        Ok(())
    }

    /// Remove every discount.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Poisoned`] if the lock is poisoned.
    pub fn clear(&self) -> Result<(), RepositoryError> {
        let mut state = self.write()?;

        state.discounts.clear();
        state.codes.clear();

        Ok(())
    }

    /// Number of stored discounts.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Poisoned`] if the lock is poisoned.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.discounts.len())
    }

    /// Whether the repository holds no discounts.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Poisoned`] if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.read()?.discounts.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, RepositoryError> {
        self.state.read().map_err(|_err| RepositoryError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, RepositoryError> {
        self.state.write().map_err(|_err| RepositoryError::Poisoned)
    }
}

impl DiscountRepository for InMemoryDiscountRepository {
    fn active_discounts(&self, now: Timestamp) -> Result<Vec<Discount>, RepositoryError> {
        let state = self.read()?;

        let mut active: Vec<Discount> = state
            .discounts
            .values()
            .filter(|discount| discount.is_valid_at(now))
            .cloned()
            .collect();

        active.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(active)
    }

    fn discount_by_code(&self, code: &str) -> Result<Discount, RepositoryError> {
        let state = self.read()?;

        state
            .codes
            .get(code)
            .and_then(|id| state.discounts.get(id))
            .cloned()
            .ok_or_else(|| RepositoryError::CodeNotFound(code.to_string()))
    }

    fn discount_by_id(&self, id: &str) -> Result<Discount, RepositoryError> {
        self.read()?
            .discounts
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    fn create_discount(&self, discount: Discount) -> Result<(), RepositoryError> {
        let mut state = self.write()?;

        if state.discounts.contains_key(&discount.id) {
            return Err(RepositoryError::AlreadyExists(discount.id));
        }

        if let Some(code) = &discount.code
            && state.codes.contains_key(code)
        {
            return Err(RepositoryError::CodeAlreadyExists(code.clone()));
        }

        state.insert(discount);

        Ok(())
    }

    fn update_discount(&self, discount: Discount) -> Result<(), RepositoryError> {
        let mut state = self.write()?;

        if !state.discounts.contains_key(&discount.id) {
            return Err(RepositoryError::NotFound(discount.id));
        }

        if let Some(code) = &discount.code
            && let Some(owner) = state.codes.get(code)
            && *owner != discount.id
        {
            return Err(RepositoryError::CodeAlreadyExists(code.clone()));
        }

        state.insert(discount);

        Ok(())
    }

    fn delete_discount(&self, id: &str) -> Result<(), RepositoryError> {
        let mut state = self.write()?;

        let removed = state
            .discounts
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        if let Some(code) = removed.code {
            state.codes.remove(&code);
        }

        Ok(())
    }

    fn increment_usage_count(&self, id: &str) -> Result<u32, RepositoryError> {
        let mut state = self.write()?;

        let discount = state
            .discounts
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        if !discount.has_usage_remaining() {
            return Err(RepositoryError::UsageLimitReached {
                id: id.to_string(),
                limit: discount.usage_limit,
            });
        }

        discount.used_count = discount.used_count.saturating_add(1);

        Ok(discount.used_count)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use jiff::SignedDuration;
    use rust_decimal::Decimal;
    use testresult::TestResult;

    use crate::discounts::{DiscountType, DiscountValue};

    use super::*;

    fn voucher(id: &str, code: &str) -> Discount {
        Discount::new(
            id,
            format!("{code} voucher"),
            DiscountType::Voucher,
            DiscountValue::Percentage(Decimal::from(15)),
        )
        .with_code(code)
    }

    #[test]
    fn create_then_lookup_by_id_and_code() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.create_discount(voucher("disc-006", "PREMIUM15"))?;

        assert_eq!(repository.discount_by_id("disc-006")?.id, "disc-006");
        assert_eq!(repository.discount_by_code("PREMIUM15")?.id, "disc-006");

        Ok(())
    }

    #[test]
    fn create_rejects_duplicate_id_and_code() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.create_discount(voucher("disc-006", "PREMIUM15"))?;

        assert_eq!(
            repository.create_discount(voucher("disc-006", "OTHER")),
            Err(RepositoryError::AlreadyExists("disc-006".to_string()))
        );
        assert_eq!(
            repository.create_discount(voucher("disc-007", "PREMIUM15")),
            Err(RepositoryError::CodeAlreadyExists("PREMIUM15".to_string()))
        );

        Ok(())
    }

    #[test]
    fn missing_lookups_are_not_found() {
        let repository = InMemoryDiscountRepository::new();

        assert_eq!(
            repository.discount_by_id("nope"),
            Err(RepositoryError::NotFound("nope".to_string()))
        );
        assert_eq!(
            repository.discount_by_code("INVALID123"),
            Err(RepositoryError::CodeNotFound("INVALID123".to_string()))
        );
        assert_eq!(
            repository.increment_usage_count("nope"),
            Err(RepositoryError::NotFound("nope".to_string()))
        );
        assert_eq!(
            repository.delete_discount("nope"),
            Err(RepositoryError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn update_reindexes_code() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.create_discount(voucher("disc-006", "PREMIUM15"))?;
        repository.update_discount(voucher("disc-006", "PREMIUM20"))?;

        assert_eq!(
            repository.discount_by_code("PREMIUM15"),
            Err(RepositoryError::CodeNotFound("PREMIUM15".to_string()))
        );
        assert_eq!(repository.discount_by_code("PREMIUM20")?.id, "disc-006");

        Ok(())
    }

    #[test]
    fn update_rejects_unknown_id_and_taken_code() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.create_discount(voucher("disc-004", "SUPER69"))?;
        repository.create_discount(voucher("disc-006", "PREMIUM15"))?;

        assert_eq!(
            repository.update_discount(voucher("disc-999", "NEW")),
            Err(RepositoryError::NotFound("disc-999".to_string()))
        );
        assert_eq!(
            repository.update_discount(voucher("disc-006", "SUPER69")),
            Err(RepositoryError::CodeAlreadyExists("SUPER69".to_string()))
        );

        Ok(())
    }

    #[test]
    fn delete_removes_code_index() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.create_discount(voucher("disc-006", "PREMIUM15"))?;
        repository.delete_discount("disc-006")?;

        assert!(repository.is_empty()?);
        assert!(repository.discount_by_code("PREMIUM15").is_err());

        Ok(())
    }

    #[test]
    fn active_discounts_filters_and_orders_by_id() -> TestResult {
        let now = Timestamp::now();
        let repository = InMemoryDiscountRepository::with_discounts([
            voucher("disc-b", "B"),
            voucher("disc-a", "A"),
            voucher("disc-c", "C").with_active(false),
            voucher("disc-d", "D").with_validity(
                now + SignedDuration::from_hours(1),
                now + SignedDuration::from_hours(2),
            ),
            voucher("disc-e", "E").with_usage(1, 1),
        ])?;

        let active = repository.active_discounts(now)?;
        let ids: Vec<&str> = active.iter().map(|d| d.id.as_str()).collect();

        assert_eq!(ids, ["disc-a", "disc-b"]);

        Ok(())
    }

    #[test]
    fn increment_stops_at_usage_limit() -> TestResult {
        let repository = InMemoryDiscountRepository::with_discounts([
            voucher("disc-004", "SUPER69").with_usage(2, 0),
        ])?;

        assert_eq!(repository.increment_usage_count("disc-004")?, 1);
        assert_eq!(repository.increment_usage_count("disc-004")?, 2);
        assert_eq!(
            repository.increment_usage_count("disc-004"),
            Err(RepositoryError::UsageLimitReached {
                id: "disc-004".to_string(),
                limit: 2,
            })
        );
        assert_eq!(repository.discount_by_id("disc-004")?.used_count, 2);

        Ok(())
    }

    #[test]
    fn concurrent_increments_respect_usage_limit() -> TestResult {
        let repository = Arc::new(InMemoryDiscountRepository::with_discounts([
            voucher("disc-004", "SUPER69").with_usage(10, 0),
        ])?);

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let repository = Arc::clone(&repository);
                thread::spawn(move || repository.increment_usage_count("disc-004").is_ok())
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.join().map_err(|_err| "thread panicked")? {
                successes += 1;
            }
        }

        assert_eq!(successes, 10);
        assert_eq!(repository.discount_by_id("disc-004")?.used_count, 10);

        Ok(())
    }

    #[test]
    fn seed_overwrites_and_clear_empties() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.seed([voucher("disc-006", "PREMIUM15")])?;
        repository.seed([voucher("disc-006", "PREMIUM20")])?;

        assert_eq!(repository.len()?, 1);
        assert!(repository.discount_by_code("PREMIUM15").is_err());

        repository.clear()?;

        assert!(repository.is_empty()?);

        Ok(())
    }

    #[test]
    fn seeding_a_taken_code_moves_it_to_the_new_discount() -> TestResult {
        let repository = InMemoryDiscountRepository::new();

        repository.seed([voucher("disc-006", "PREMIUM15")])?;
        repository.seed([voucher("disc-007", "PREMIUM15")])?;

        assert_eq!(repository.discount_by_id("disc-006")?.code, None);

        repository.delete_discount("disc-006")?;

        assert_eq!(repository.discount_by_code("PREMIUM15")?.id, "disc-007");

        Ok(())
    }
}
