//! In-memory stand-ins for both persistence seams. Clones share state, so a
//! test can keep a handle while the store owns the backend.

use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use super::remote::{Filter, Order, TableClient};
use super::{BackendError, KeyValueStore};

fn simulated(endpoint: &str) -> BackendError {
    BackendError::Api {
        endpoint: endpoint.into(),
        status: 503,
        body: "simulated failure".into(),
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryKv {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryKv {
    pub(crate) fn with_entry(key: &str, value: &str) -> Self {
        let kv = Self::default();
        kv.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        kv
    }

    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), BackendError> {
        if self.fail_writes.get() {
            return Err(simulated("kv set"));
        }
        self.writes.set(self.writes.get() + 1);
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        if self.fail_writes.get() {
            return Err(simulated("kv remove"));
        }
        self.writes.set(self.writes.get() + 1);
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryTable {
    rows: Rc<RefCell<Vec<Value>>>,
    fail: Rc<Cell<bool>>,
    requests: Rc<Cell<usize>>,
}

impl MemoryTable {
    pub(crate) fn rows(&self) -> Vec<Value> {
        self.rows.borrow().clone()
    }

    pub(crate) fn push_row(&self, row: Value) {
        self.rows.borrow_mut().push(row);
    }

    pub(crate) fn fail(&self, fail: bool) {
        self.fail.set(fail);
    }

    pub(crate) fn requests(&self) -> usize {
        self.requests.get()
    }

    fn begin(&self, endpoint: &str) -> Result<(), BackendError> {
        self.requests.set(self.requests.get() + 1);
        if self.fail.get() {
            return Err(simulated(endpoint));
        }
        Ok(())
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|f| row.get(f.column).and_then(Value::as_str) == Some(f.value.as_str()))
}

impl TableClient for MemoryTable {
    fn select(
        &self,
        _table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> Result<Vec<Value>, BackendError> {
        self.begin("select")?;
        let mut rows: Vec<Value> = self
            .rows
            .borrow()
            .iter()
            .filter(|row| matches(row, filters))
            .cloned()
            .collect();
        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let ka = a.get(order.column).and_then(Value::as_str).unwrap_or("");
                let kb = b.get(order.column).and_then(Value::as_str).unwrap_or("");
                if order.ascending {
                    ka.cmp(kb)
                } else {
                    kb.cmp(ka)
                }
            });
        }
        Ok(rows)
    }

    fn insert(&self, _table: &str, row: &Value) -> Result<(), BackendError> {
        self.begin("insert")?;
        self.rows.borrow_mut().push(row.clone());
        Ok(())
    }

    fn update(&self, _table: &str, values: &Value, filters: &[Filter]) -> Result<(), BackendError> {
        self.begin("update")?;
        for row in self.rows.borrow_mut().iter_mut() {
            if !matches(row, filters) {
                continue;
            }
            if let (Some(target), Some(changes)) = (row.as_object_mut(), values.as_object()) {
                for (column, value) in changes {
                    target.insert(column.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    fn delete(&self, _table: &str, filters: &[Filter]) -> Result<(), BackendError> {
        self.begin("delete")?;
        self.rows.borrow_mut().retain(|row| !matches(row, filters));
        Ok(())
    }
}
