//! Persisted cleaning statistics
//!
//! Additive counters for cleaned links and stripped parameters. All writes
//! go through the connection mutex, so concurrent increments cannot lose
//! updates and readers only ever see the totals grow (until reset).

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::database::Database;
use crate::Result;

/// Point-in-time totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_links: i64,
    pub total_params: i64,
}

pub struct StatsStore {
    db: Database,
}

impl StatsStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Add to both counters and return the new totals. Negative deltas are
    /// clamped to zero; a call where nothing is positive is a no-op.
    pub fn record(&self, links_delta: i64, params_delta: i64) -> Result<StatsSnapshot> {
        let links = links_delta.max(0);
        let params = params_delta.max(0);
        if links == 0 && params == 0 {
            return self.totals();
        }

        self.db.with_connection(|conn| {
            conn.execute(
                "UPDATE stats
                 SET total_links = total_links + ?1,
                     total_params = total_params + ?2,
                     updated_at = ?3
                 WHERE id = 1",
                rusqlite::params![links, params, Utc::now().to_rfc3339()],
            )?;
            Self::read_totals(conn)
        })
    }

    pub fn totals(&self) -> Result<StatsSnapshot> {
        self.db.with_connection(Self::read_totals)
    }

    pub fn reset(&self) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "UPDATE stats SET total_links = 0, total_params = 0, updated_at = ?1 WHERE id = 1",
                [Utc::now().to_rfc3339()],
            )?;
            Ok(())
        })?;
        tracing::info!("Cleaning statistics reset");
        Ok(())
    }

    fn read_totals(conn: &rusqlite::Connection) -> Result<StatsSnapshot> {
        let snapshot = conn.query_row(
            "SELECT total_links, total_params FROM stats WHERE id = 1",
            [],
            |row| {
                Ok(StatsSnapshot {
                    total_links: row.get(0)?,
                    total_params: row.get(1)?,
                })
            },
        )?;
        Ok(snapshot)
    }
}

impl Clone for StatsStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}
