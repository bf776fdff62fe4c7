use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use lazy_static::lazy_static;
use serenity::model::id::UserId;
use tokio::sync::Mutex;

lazy_static! {
    static ref COMMAND_COOLDOWNS: Mutex<CooldownTracker> = Mutex::new(CooldownTracker::default());
}

/// Per-user, per-command cooldowns
///
/// Also remembers when a user was last told about a cooldown so that spamming
/// a command produces one warning per cooldown window, not one per message.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_used: HashMap<(u64, String), u64>,
    last_warned: HashMap<(u64, String), u64>,
}

impl CooldownTracker {
    /// `Ok(())` records the use. `Err((remaining, should_warn))` while cooling down.
    pub fn check(&mut self, user_id: u64, command: &str, now: u64, cooldown_secs: u64) -> Result<(), (u64, bool)> {
        self.prune(now, cooldown_secs);
        let key = (user_id, command.to_string());

        if let Some(&last_time) = self.last_used.get(&key) {
            let elapsed = now.saturating_sub(last_time);
            if elapsed < cooldown_secs {
                let should_warn = match self.last_warned.get(&key) {
                    Some(&last_warning) => last_warning < last_time,
                    None => true,
                };
                if should_warn {
                    self.last_warned.insert(key, now);
                }
                return Err((cooldown_secs - elapsed, should_warn));
            }
        }

        self.last_used.insert(key, now);
        Ok(())
    }

    /// Forget entries whose cooldown window has passed
    fn prune(&mut self, now: u64, cooldown_secs: u64) {
        self.last_used
            .retain(|_, &mut last_time| now.saturating_sub(last_time) < cooldown_secs);
        let last_used = &self.last_used;
        self.last_warned.retain(|key, _| last_used.contains_key(key));
    }
}

/// Check (and record) a command use against the shared cooldown table
pub async fn check_cooldown(user_id: UserId, command: &str, cooldown_secs: u64) -> Result<(), (u64, bool)> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let mut cooldowns = COMMAND_COOLDOWNS.lock().await;
    cooldowns.check(user_id.get(), command, now, cooldown_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_use_is_allowed() {
        let mut tracker = CooldownTracker::default();
        assert_eq!(tracker.check(1, "$chart", 100, 5), Ok(()));
        assert_eq!(tracker.check(2, "$chart", 100, 5), Ok(()));
        assert_eq!(tracker.check(1, "$help", 100, 5), Ok(()));
    }

    #[test]
    fn test_cooldown_warns_once_then_expires() {
        let mut tracker = CooldownTracker::default();
        tracker.check(1, "$chart", 100, 5).unwrap();

        assert_eq!(tracker.check(1, "$chart", 102, 5), Err((3, true)));
        assert_eq!(tracker.check(1, "$chart", 103, 5), Err((2, false)));
        assert_eq!(tracker.check(1, "$chart", 105, 5), Ok(()));
        assert_eq!(tracker.check(1, "$chart", 106, 5), Err((4, true)));
    }

    #[test]
    fn test_expired_entries_are_pruned() {
        let mut tracker = CooldownTracker::default();
        tracker.check(1, "$chart", 100, 5).unwrap();
        tracker.check(2, "$chart", 101, 5).unwrap();
        assert_eq!(tracker.check(1, "$chart", 102, 5), Err((3, true)));
        assert_eq!(tracker.last_used.len(), 2);

        tracker.check(3, "$chart", 200, 5).unwrap();
        assert_eq!(tracker.last_used.len(), 1);
        assert!(tracker.last_warned.is_empty());
    }

    #[tokio::test]
    async fn test_shared_table_blocks_repeat_use() {
        let user = UserId::new(987_654_321);
        assert!(check_cooldown(user, "$test_only", 60).await.is_ok());
        assert!(matches!(check_cooldown(user, "$test_only", 60).await, Err((_, true))));
    }
}
