//! Self-healing policy engine.
//!
//! In hardened mode a console read that cannot be honored does not terminate
//! the program. Instead a deterministic healing action is applied and counted
//! here. Strict mode never heals.

use std::sync::atomic::{AtomicU64, Ordering};

/// Actions the runtime can take to heal a failed console read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealingAction {
    /// Return zero / 0.0 / empty string instead of the unreadable value.
    ReturnSafeDefault,
    /// Clamp an out-of-range integer to the nearest representable bound.
    SaturateValue { negative: bool },
    /// Truncate a string token and keep the NUL terminator inside the buffer.
    TruncateWithNull { requested: usize, truncated: usize },
    /// No healing needed.
    None,
}

impl HealingAction {
    /// Returns true if this action represents an actual healing (not None).
    #[must_use]
    pub const fn is_heal(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Stable snake_case name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReturnSafeDefault => "return_safe_default",
            Self::SaturateValue { .. } => "saturate_value",
            Self::TruncateWithNull { .. } => "truncate_with_null",
            Self::None => "none",
        }
    }
}

/// Process-wide healing counters.
pub struct HealingPolicy {
    /// Total heals applied.
    pub total_heals: AtomicU64,
    /// Safe defaults returned.
    pub safe_defaults: AtomicU64,
    /// Integers saturated to the i32 range.
    pub saturations: AtomicU64,
    /// String tokens truncated to fit a caller buffer.
    pub null_truncations: AtomicU64,
}

impl HealingPolicy {
    /// Create a new policy with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_heals: AtomicU64::new(0),
            safe_defaults: AtomicU64::new(0),
            saturations: AtomicU64::new(0),
            null_truncations: AtomicU64::new(0),
        }
    }

    /// Record a healing action.
    pub fn record(&self, action: &HealingAction) {
        if action.is_heal() {
            self.total_heals.fetch_add(1, Ordering::Relaxed);
        }

        match action {
            HealingAction::ReturnSafeDefault => {
                self.safe_defaults.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::SaturateValue { .. } => {
                self.saturations.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::TruncateWithNull { .. } => {
                self.null_truncations.fetch_add(1, Ordering::Relaxed);
            }
            HealingAction::None => {}
        }
    }

    /// Decide healing for staging a `token_len`-byte token into a buffer of
    /// `capacity` bytes (terminator included).
    #[must_use]
    pub fn heal_string_bounds(&self, token_len: usize, capacity: usize) -> HealingAction {
        if token_len >= capacity {
            HealingAction::TruncateWithNull {
                requested: token_len,
                truncated: capacity.saturating_sub(1),
            }
        } else {
            HealingAction::None
        }
    }

    /// Total heals recorded so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_heals.load(Ordering::Relaxed)
    }
}

impl Default for HealingPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Global healing policy instance.
static GLOBAL_POLICY: HealingPolicy = HealingPolicy::new();

/// Access the global healing policy.
#[must_use]
pub fn global_healing_policy() -> &'static HealingPolicy {
    &GLOBAL_POLICY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_string_when_exceeding_capacity() {
        let policy = HealingPolicy::new();
        assert_eq!(
            policy.heal_string_bounds(100, 50),
            HealingAction::TruncateWithNull {
                requested: 100,
                truncated: 49
            }
        );
    }

    #[test]
    fn token_filling_buffer_exactly_leaves_no_room_for_nul() {
        let policy = HealingPolicy::new();
        assert!(policy.heal_string_bounds(8, 8).is_heal());
        assert_eq!(policy.heal_string_bounds(7, 8), HealingAction::None);
    }

    #[test]
    fn zero_capacity_truncates_to_zero() {
        let policy = HealingPolicy::new();
        assert_eq!(
            policy.heal_string_bounds(3, 0),
            HealingAction::TruncateWithNull {
                requested: 3,
                truncated: 0
            }
        );
    }

    #[test]
    fn record_increments_counters() {
        let policy = HealingPolicy::new();
        policy.record(&HealingAction::ReturnSafeDefault);
        policy.record(&HealingAction::ReturnSafeDefault);
        policy.record(&HealingAction::SaturateValue { negative: true });
        policy.record(&HealingAction::None);

        assert_eq!(policy.total(), 3);
        assert_eq!(policy.safe_defaults.load(Ordering::Relaxed), 2);
        assert_eq!(policy.saturations.load(Ordering::Relaxed), 1);
        assert_eq!(policy.null_truncations.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn none_is_not_a_heal() {
        assert!(!HealingAction::None.is_heal());
        assert!(HealingAction::ReturnSafeDefault.is_heal());
        assert_eq!(HealingAction::None.name(), "none");
    }
}
