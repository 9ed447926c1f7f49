use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How miners wait for the start signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPolicy {
    /// Busy-wait on an atomic flag so all miners leave the gate together.
    #[default]
    Spin,
    /// Park on a condition variable until the gate opens.
    Block,
}

impl FromStr for StartPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spin" => Ok(Self::Spin),
            "block" => Ok(Self::Block),
            other => Err(ConfigError::UnknownPolicy {
                kind: "start",
                value: other.to_string(),
            }),
        }
    }
}

/// One-shot gate raised by the coordinator once every miner exists.
#[derive(Debug)]
pub struct StartSignal {
    policy: StartPolicy,
    raised: AtomicBool,
    gate: Mutex<bool>,
    opened: Condvar,
}

impl StartSignal {
    pub fn new(policy: StartPolicy) -> Self {
        Self {
            policy,
            raised: AtomicBool::new(false),
            gate: Mutex::new(false),
            opened: Condvar::new(),
        }
    }

    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
        let mut open = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        *open = true;
        self.opened.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Return once the signal has been raised.
    pub fn wait(&self) {
        match self.policy {
            StartPolicy::Spin => {
                while !self.is_raised() {
                    std::hint::spin_loop();
                }
            }
            StartPolicy::Block => {
                let mut open = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
                while !*open {
                    open = self
                        .opened
                        .wait(open)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }
}
