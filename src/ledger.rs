use crate::dates::canonical_key;
use crate::models::{LedgerData, Routine};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

impl LedgerData {
    pub fn routine(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|routine| routine.id == id)
    }

    pub fn add_routine(&mut self, name: &str) -> Option<Routine> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let routine = Routine {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.routines.push(routine.clone());
        Some(routine)
    }

    pub fn rename_routine(&mut self, id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        match self.routines.iter_mut().find(|routine| routine.id == id) {
            Some(routine) => {
                routine.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Removes the routine and strips its id from every day record.
    pub fn delete_routine(&mut self, id: &str) -> bool {
        let before = self.routines.len();
        self.routines.retain(|routine| routine.id != id);
        if self.routines.len() == before {
            return false;
        }

        for record in self.records.values_mut() {
            record.remove(id);
        }
        true
    }

    pub fn set_completion(&mut self, date: NaiveDate, routine_id: &str, done: bool) {
        let record = self.records.entry(canonical_key(date)).or_default();
        record.insert(routine_id.to_string(), done);
    }

    pub fn get_completion(&self, date: NaiveDate, routine_id: &str) -> bool {
        self.records
            .get(&canonical_key(date))
            .and_then(|record| record.get(routine_id))
            .copied()
            .unwrap_or(false)
    }
}
