//! Бюджет аллокаций декодера.
//!
//! Защита от «бомб»: вход малого размера, который заявляет о себе как о
//! гигантской структуре, должен быть отвергнут до того, как будет выделен
//! хоть один крупный буфер. Каждое декодируемое значение списывает из
//! бюджета свою стоимость *до* аллокации; исчерпание — терминальная ошибка
//! [`FormatError::AllocationDenied`].
//!
//! Бюджет — явный параметр декодирования, не глобальное состояние:
//! параллельные декодирования с разными уровнями доверия не пересекаются.

use crate::error::{CodecResult, FormatError};

/// Накладная стоимость одной карты (тяжелее списка, чтобы невыгодно было
/// вкладывать множество крошечных карт друг в друга).
pub const MAP_OVERHEAD: u64 = 64;

/// Накладная стоимость одного списка.
pub const LIST_OVERHEAD: u64 = 32;

/// Монотонно убывающий счётчик «логической памяти», которую декодеру
/// разрешено материализовать за один вызов.
#[derive(Debug, Clone)]
pub struct AllocBudget {
    remaining: u64,
}

impl AllocBudget {
    /// Бюджет в байтах для недоверенного входа.
    pub fn new(limit: u64) -> Self {
        Self { remaining: limit }
    }

    /// Безлимитная конфигурация — только для доверенного входа.
    pub fn unlimited() -> Self {
        Self {
            remaining: u64::MAX,
        }
    }

    /// Сколько байт ещё разрешено материализовать.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Списывает `n` байт. Вызывается строго до аллокации.
    pub fn charge(&mut self, n: u64) -> CodecResult<()> {
        if n > self.remaining {
            return Err(FormatError::AllocationDenied {
                requested: n,
                remaining: self.remaining,
            }
            .into());
        }
        self.remaining -= n;
        Ok(())
    }
}
