use crate::{Action, ModelUpdate, database::Database};
use anyhow::Context;
use log::{debug, error, warn};
use std::path::Path;

/// File name of the database inside the data directory.
pub const DATABASE_FILE: &str = "counter.db";

/// Counter state owned by [`crate::RmpModel`].
///
/// The in-memory count is authoritative. Every change is written through to
/// the database, but a failed write only gets logged.
#[derive(Debug)]
pub struct Model {
    count: i32,
    db: Database,
}

impl Model {
    /// Opens the model, restoring the last persisted count.
    pub fn open(data_dir: &Path, in_memory: bool) -> anyhow::Result<Self> {
        let db = if in_memory {
            Database::open_in_memory().context("failed to open database")?
        } else {
            std::fs::create_dir_all(data_dir).context("failed to create data directory")?;
            Database::open_file(&data_dir.join(DATABASE_FILE))
                .context("failed to open database")?
        };

        let count = db
            .load_count()
            .context("failed to load count")?
            .unwrap_or_default();
        debug!("model: opened with count {count}");

        Ok(Self { count, db })
    }

    pub fn count(&self) -> i32 {
        self.count
    }

    /// Applies an action and returns the update describing the new state.
    pub fn apply(&mut self, action: Action) -> ModelUpdate {
        let next = match action {
            Action::Increment => self.count.checked_add(1),
            Action::Decrement => self.count.checked_sub(1),
        };

        match next {
            Some(count) => {
                self.count = count;
                if let Err(e) = self.db.store_count(count) {
                    error!("model: failed to persist count {count}: {e:#}");
                }
            }
            None => warn!("model: {action:?} would overflow, count stays at {}", self.count),
        }

        ModelUpdate::CountChanged { count: self.count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_without_saved_state() {
        let model = Model::open(Path::new("unused"), true).unwrap();
        assert_eq!(model.count(), 0);
    }

    #[test]
    fn apply_reports_new_count() {
        let mut model = Model::open(Path::new("unused"), true).unwrap();

        assert_eq!(
            model.apply(Action::Increment),
            ModelUpdate::CountChanged { count: 1 }
        );
        assert_eq!(
            model.apply(Action::Decrement),
            ModelUpdate::CountChanged { count: 0 }
        );
        assert_eq!(
            model.apply(Action::Decrement),
            ModelUpdate::CountChanged { count: -1 }
        );
    }

    #[test]
    fn saturates_at_bounds() {
        let mut model = Model::open(Path::new("unused"), true).unwrap();
        model.count = i32::MAX;

        assert_eq!(
            model.apply(Action::Increment),
            ModelUpdate::CountChanged { count: i32::MAX }
        );

        model.count = i32::MIN;
        assert_eq!(
            model.apply(Action::Decrement),
            ModelUpdate::CountChanged { count: i32::MIN }
        );
    }

    #[test]
    fn restores_persisted_count() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut model = Model::open(dir.path(), false).unwrap();
            model.apply(Action::Increment);
            model.apply(Action::Increment);
        }

        let model = Model::open(dir.path(), false).unwrap();
        assert_eq!(model.count(), 2);
        assert!(dir.path().join(DATABASE_FILE).exists());
    }

    #[test]
    fn creates_missing_data_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        Model::open(&nested, false).unwrap();

        assert!(nested.is_dir());
    }
}
