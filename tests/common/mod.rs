#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use florister::{Identity, InitialStatus, SourceError, State, StateSource};

pub fn at(secs: u64) -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(secs)
}

pub fn state(secs: u64) -> State {
    State::new(at(secs), 100.0 + secs as f64, 99.0 + secs as f64)
}

pub fn identity() -> Identity {
    Identity::new("bitflyer", "BTC_JPY").unwrap()
}

pub fn secs_of(states: &[State]) -> Vec<u64> {
    states
        .iter()
        .map(|s| s.observed_at.duration_since(SystemTime::UNIX_EPOCH).unwrap().as_secs())
        .collect()
}

/// Replays a fixed script of fetch results, then repeats the last entry forever.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<State, SourceError>>>,
    last: Mutex<Option<Result<State, SourceError>>>,
    history: InitialStatus,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<State, SourceError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            history: InitialStatus::default(),
        }
    }

    pub fn with_history(mut self, history: InitialStatus) -> Self {
        self.history = history;
        self
    }
}

#[async_trait]
impl StateSource for ScriptedSource {
    async fn last_state(&self, _id: &Identity) -> Result<State, SourceError> {
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(res) => {
                *last = Some(res.clone());
                res
            }
            None => last.clone().unwrap_or_else(|| {
                Err(SourceError::Unavailable {
                    error: "empty script".into(),
                })
            }),
        }
    }

    async fn status(
        &self,
        _id: &Identity,
        _from: SystemTime,
        _to: SystemTime,
    ) -> Result<InitialStatus, SourceError> {
        Ok(self.history.clone())
    }
}

pub fn unavailable() -> SourceError {
    SourceError::Unavailable {
        error: "registry down".into(),
    }
}
