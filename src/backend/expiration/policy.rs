/**
 * Expiration Policy
 *
 * Decides a post's effective lifetime when it is created. The requested
 * duration (or `default_duration` when the client sends none) is used as
 * is, unless `enforce_max_duration` is set and the request is longer than
 * the default, in which case the default wins.
 *
 * With the stock configuration (`24h`, enforced) every post lives exactly
 * 24 hours whatever the client asks for.
 */

use chrono::{DateTime, Utc};

use crate::backend::server::config::AppConfig;
use crate::shared::PostDuration;

/// Lifetime rules applied to new posts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    pub default_duration: PostDuration,
    pub enforce_max_duration: bool,
}

impl Default for ExpirationPolicy {
    fn default() -> Self {
        Self {
            default_duration: PostDuration::Day,
            enforce_max_duration: true,
        }
    }
}

fn rank(duration: PostDuration) -> u8 {
    match duration {
        PostDuration::Day => 0,
        PostDuration::Week => 1,
        PostDuration::Permanent => 2,
    }
}

impl ExpirationPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_duration: config.default_duration,
            enforce_max_duration: config.enforce_max_duration,
        }
    }

    /// Effective duration for a request
    pub fn resolve(&self, requested: Option<PostDuration>) -> PostDuration {
        let requested = requested.unwrap_or(self.default_duration);
        if self.enforce_max_duration && rank(requested) > rank(self.default_duration) {
            self.default_duration
        } else {
            requested
        }
    }

    /// Effective duration and expiry instant for a post created at `now`
    pub fn assign(
        &self,
        requested: Option<PostDuration>,
        now: DateTime<Utc>,
    ) -> (PostDuration, Option<DateTime<Utc>>) {
        let duration = self.resolve(requested);
        (duration, duration.window().map(|window| now + window))
    }

    /// Whether posts stored without an expiry should be given one at startup
    ///
    /// Only when the policy forces a fixed lifetime: otherwise a missing
    /// expiry legitimately means "permanent".
    pub fn backfill_duration(&self) -> Option<PostDuration> {
        match self.default_duration.window() {
            Some(_) if self.enforce_max_duration => Some(self.default_duration),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn policy(default_duration: PostDuration, enforce_max_duration: bool) -> ExpirationPolicy {
        ExpirationPolicy {
            default_duration,
            enforce_max_duration,
        }
    }

    #[test]
    fn test_enforced_default_forces_24h() {
        let p = policy(PostDuration::Day, true);
        assert_eq!(p.resolve(None), PostDuration::Day);
        assert_eq!(p.resolve(Some(PostDuration::Week)), PostDuration::Day);
        assert_eq!(p.resolve(Some(PostDuration::Permanent)), PostDuration::Day);
    }

    #[test]
    fn test_unenforced_honours_request() {
        let p = policy(PostDuration::Permanent, false);
        assert_eq!(p.resolve(None), PostDuration::Permanent);
        assert_eq!(p.resolve(Some(PostDuration::Week)), PostDuration::Week);
    }

    #[test]
    fn test_enforce_keeps_shorter_requests() {
        let p = policy(PostDuration::Week, true);
        assert_eq!(p.resolve(Some(PostDuration::Day)), PostDuration::Day);
        assert_eq!(p.resolve(Some(PostDuration::Permanent)), PostDuration::Week);
    }

    #[test]
    fn test_assign_expiry_instant() {
        let now = Utc::now();
        let (duration, expires_at) = policy(PostDuration::Week, false).assign(None, now);
        assert_eq!(duration, PostDuration::Week);
        assert_eq!(expires_at, Some(now + Duration::days(7)));

        let (duration, expires_at) =
            policy(PostDuration::Day, false).assign(Some(PostDuration::Permanent), now);
        assert_eq!(duration, PostDuration::Permanent);
        assert_eq!(expires_at, None);
    }

    #[test]
    fn test_backfill_only_when_enforced_fixed_window() {
        assert_eq!(
            policy(PostDuration::Day, true).backfill_duration(),
            Some(PostDuration::Day)
        );
        assert_eq!(policy(PostDuration::Day, false).backfill_duration(), None);
        assert_eq!(policy(PostDuration::Permanent, true).backfill_duration(), None);
    }
}
