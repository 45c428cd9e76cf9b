use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Length of one question budget window.
pub(crate) const WINDOW: Duration = Duration::from_secs(60);

/// Clients tracked before expired windows are swept.
const MAX_TRACKED_CLIENTS: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Allowed,
    Exhausted { retry_after: Duration },
}

#[derive(Debug, Clone, Copy)]
struct Budget {
    opened: Instant,
    asked: u32,
}

/// Per-client question budget over fixed one-minute windows.
///
/// A budget of zero disables limiting.
#[derive(Debug)]
pub(crate) struct QuestionLimiter {
    per_window: u32,
    clients: Mutex<HashMap<IpAddr, Budget>>,
}

impl QuestionLimiter {
    pub(crate) fn new(per_window: u32) -> Self {
        Self {
            per_window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Count one question from `client` at `now`.
    pub(crate) fn check(&self, client: IpAddr, now: Instant) -> Verdict {
        if self.per_window == 0 {
            return Verdict::Allowed;
        }
        // never held across an await
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);

        if clients.len() >= MAX_TRACKED_CLIENTS && !clients.contains_key(&client) {
            clients.retain(|_, budget| now.saturating_duration_since(budget.opened) < WINDOW);
        }

        let budget = clients.entry(client).or_insert(Budget {
            opened: now,
            asked: 0,
        });
        let age = now.saturating_duration_since(budget.opened);
        if age >= WINDOW {
            *budget = Budget {
                opened: now,
                asked: 0,
            };
        }

        if budget.asked >= self.per_window {
            return Verdict::Exhausted {
                retry_after: WINDOW.saturating_sub(age),
            };
        }
        budget.asked += 1;
        Verdict::Allowed
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
