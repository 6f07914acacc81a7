//! In-process [`KvStore`] for tests and local development.
//!
//! Mirrors the Redis behaviour Murmur relies on: sorted-set ordering by
//! score then member, wrong-type errors, and atomic toggles (the whole map
//! sits behind one mutex).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Counter, KvStore, ScoreBound, StoreError, StoreResult, Toggle, resolve_range};

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Hash(HashMap<String, String>),
    Sorted(HashMap<String, f64>),
}

/// Map-backed store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        // A panic while holding the lock cannot leave a half-applied command.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn hash_mut<'a>(
    entries: &'a mut HashMap<String, Value>,
    key: &str,
) -> StoreResult<&'a mut HashMap<String, String>> {
    match entries
        .entry(key.to_string())
        .or_insert_with(|| Value::Hash(HashMap::new()))
    {
        Value::Hash(h) => Ok(h),
        _ => Err(StoreError::WrongType(key.to_string())),
    }
}

fn sorted_mut<'a>(
    entries: &'a mut HashMap<String, Value>,
    key: &str,
) -> StoreResult<&'a mut HashMap<String, f64>> {
    match entries
        .entry(key.to_string())
        .or_insert_with(|| Value::Sorted(HashMap::new()))
    {
        Value::Sorted(z) => Ok(z),
        _ => Err(StoreError::WrongType(key.to_string())),
    }
}

/// Members ordered by (score, member), ascending.
fn ordered(entries: &HashMap<String, Value>, key: &str) -> StoreResult<Vec<(String, f64)>> {
    let set = match entries.get(key) {
        None => return Ok(Vec::new()),
        Some(Value::Sorted(z)) => z,
        Some(_) => return Err(StoreError::WrongType(key.to_string())),
    };
    let mut members: Vec<(String, f64)> = set.iter().map(|(m, s)| (m.clone(), *s)).collect();
    members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(members)
}

fn slice(members: Vec<(String, f64)>, start: isize, stop: isize) -> Vec<String> {
    match resolve_range(members.len(), start, stop) {
        Some((from, to)) => members[from..=to].iter().map(|(m, _)| m.clone()).collect(),
        None => Vec::new(),
    }
}

/// Drop keys whose collection became empty, as Redis does.
fn prune(entries: &mut HashMap<String, Value>, key: &str) {
    let empty = match entries.get(key) {
        Some(Value::Hash(h)) => h.is_empty(),
        Some(Value::Sorted(z)) => z.is_empty(),
        _ => false,
    };
    if empty {
        entries.remove(key);
    }
}

fn bump_hash_field(
    entries: &mut HashMap<String, Value>,
    key: &str,
    field: &str,
    delta: i64,
) -> StoreResult<()> {
    let hash = hash_mut(entries, key)?;
    let current = match hash.get(field) {
        None => 0,
        Some(raw) => raw.parse::<i64>().map_err(|_| StoreError::Corrupt {
            key: key.to_string(),
            reason: format!("field '{field}' is not an integer"),
        })?,
    };
    hash.insert(field.to_string(), (current + delta).to_string());
    Ok(())
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        match self.lock().get(key) {
            None => Ok(None),
            Some(Value::Scalar(s)) => Ok(Some(s.clone())),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.lock()
            .insert(key.to_string(), Value::Scalar(value.to_string()));
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str) -> StoreResult<bool> {
        let mut entries = self.lock();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), Value::Scalar(value.to_string()));
        Ok(true)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.lock().contains_key(key))
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        self.lock().remove(key);
        Ok(())
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> StoreResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut entries = self.lock();
        let hash = hash_mut(&mut entries, key)?;
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }
        Ok(())
    }

    async fn hgetall(&self, key: &str) -> StoreResult<HashMap<String, String>> {
        match self.lock().get(key) {
            None => Ok(HashMap::new()),
            Some(Value::Hash(h)) => Ok(h.clone()),
            Some(_) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn zadd(&self, key: &str, member: &str, score: f64) -> StoreResult<bool> {
        let mut entries = self.lock();
        let set = sorted_mut(&mut entries, key)?;
        Ok(set.insert(member.to_string(), score).is_none())
    }

    async fn zrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let members = ordered(&self.lock(), key)?;
        Ok(slice(members, start, stop))
    }

    async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        let mut members = ordered(&self.lock(), key)?;
        members.reverse();
        Ok(slice(members, start, stop))
    }

    async fn zrevrange_by_score(
        &self,
        key: &str,
        min: ScoreBound,
        max: ScoreBound,
    ) -> StoreResult<Vec<String>> {
        let members = ordered(&self.lock(), key)?;
        Ok(members
            .into_iter()
            .rev()
            .filter(|(_, s)| min.admits_from_below(*s) && max.admits_from_above(*s))
            .map(|(m, _)| m)
            .collect())
    }

    async fn toggle_member(
        &self,
        key: &str,
        member: &str,
        score: f64,
        counters: &[Counter],
    ) -> StoreResult<Toggle> {
        let mut entries = self.lock();

        // Validate every touched key before mutating anything.
        for counter in counters {
            match counter {
                Counter::Ranking { key, .. } => {
                    if matches!(entries.get(key), Some(v) if !matches!(v, Value::Sorted(_))) {
                        return Err(StoreError::WrongType(key.clone()));
                    }
                }
                Counter::HashField { key, field } => match entries.get(key) {
                    Some(Value::Hash(h)) => {
                        if let Some(raw) = h.get(field)
                            && raw.parse::<i64>().is_err()
                        {
                            return Err(StoreError::Corrupt {
                                key: key.clone(),
                                reason: format!("field '{field}' is not an integer"),
                            });
                        }
                    }
                    Some(_) => return Err(StoreError::WrongType(key.clone())),
                    None => {}
                },
            }
        }

        let set = sorted_mut(&mut entries, key)?;
        let toggle = if set.remove(member).is_some() {
            Toggle::Removed
        } else {
            set.insert(member.to_string(), score);
            Toggle::Added
        };
        prune(&mut entries, key);

        let delta = toggle.delta();
        for counter in counters {
            match counter {
                Counter::Ranking { key, member } => {
                    if let Some(Value::Sorted(z)) = entries.get_mut(key)
                        && let Some(s) = z.get_mut(member)
                    {
                        *s += delta as f64;
                    }
                }
                Counter::HashField { key, field } => {
                    bump_hash_field(&mut entries, key, field, delta)?;
                }
            }
        }
        Ok(toggle)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
