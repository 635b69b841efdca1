//! Reservation Allocator
//!
//! 校验顺序固定，第一个失败即返回：
//! 1. 闭店日 → `ClosedDay`
//! 2. 人数 ∉ [1, max] → `InvalidPartySize`
//! 3. 日期早于今天（业务时区）→ `PastDate`
//! 4. 时段已满 → `SlotFull`
//! 5. 同名重复预订 → `DuplicateReservation`
//! 6. 创建
//!
//! 4–6 由存储层 `insert_if_available` 原子完成，避免并发超订。

use chrono::{Datelike, NaiveDate, NaiveTime};
use shared::models::{NewReservation, Reservation};

use super::error::ChatError;
use super::policy::ChatPolicy;
use crate::db::{ReservationStore, SlotOutcome};

/// One reservation attempt
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub user_id: i64,
    pub customer_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub party_size: i32,
}

pub struct ReservationAllocator<'a> {
    store: &'a dyn ReservationStore,
    policy: &'a ChatPolicy,
}

impl<'a> ReservationAllocator<'a> {
    pub fn new(store: &'a dyn ReservationStore, policy: &'a ChatPolicy) -> Self {
        Self { store, policy }
    }

    /// Steps 1–3 (no I/O)
    pub fn validate(&self, request: &SlotRequest, today: NaiveDate) -> Result<(), ChatError> {
        if request.date.weekday() == self.policy.closed_weekday {
            return Err(ChatError::ClosedDay(self.policy.closed_weekday));
        }
        if request.party_size < 1 || request.party_size > self.policy.max_party_size {
            return Err(ChatError::InvalidPartySize {
                size: request.party_size,
                max: self.policy.max_party_size,
            });
        }
        if request.date < today {
            return Err(ChatError::PastDate(request.date));
        }
        Ok(())
    }

    pub async fn allocate(
        &self,
        request: &SlotRequest,
        today: NaiveDate,
        now: i64,
    ) -> Result<Reservation, ChatError> {
        self.validate(request, today)?;

        let new = NewReservation {
            user_id: request.user_id,
            customer_name: request.customer_name.trim().to_string(),
            date: request.date,
            time: request.time,
            party_size: request.party_size,
            created_at: now,
        };
        match self
            .store
            .insert_if_available(&new, self.policy.table_capacity)
            .await?
        {
            SlotOutcome::Created(reservation) => {
                tracing::info!(
                    reservation_id = reservation.id,
                    date = %reservation.date,
                    time = %reservation.time,
                    party_size = reservation.party_size,
                    "Reservation created"
                );
                Ok(reservation)
            }
            SlotOutcome::SlotFull => Err(ChatError::SlotFull {
                date: request.date,
                time: request.time,
            }),
            SlotOutcome::Duplicate => Err(ChatError::DuplicateReservation {
                customer_name: new.customer_name,
                date: request.date,
                time: request.time,
            }),
        }
    }

    /// Tables still free at a slot
    pub async fn remaining(&self, date: NaiveDate, time: NaiveTime) -> Result<i64, ChatError> {
        let taken = self.store.count_at(date, time).await?;
        Ok((self.policy.table_capacity - taken).max(0))
    }
}
