/// Local catalog of submitted reports
///
/// The submission endpoint is simulated, so accepted reports are recorded in
/// a local SQLite catalog to back the "my reports" view. Nothing here talks
/// to a real backend.

use rusqlite::{Connection, Result as SqlResult};
use std::path::{Path, PathBuf};

use super::data::{ReportId, SubmittedReport};
use crate::state::draft::ReportDraft;

/// The ReportLog manages the SQLite catalog of submitted reports.
pub struct ReportLog {
    conn: Connection,
    db_path: PathBuf,
}

impl ReportLog {
    /// Create a new ReportLog instance and initialize the database.
    ///
    /// The database file is created in the user's data directory:
    /// - Linux: ~/.local/share/civic-reporter/reports.db
    /// - macOS: ~/Library/Application Support/civic-reporter/reports.db
    /// - Windows: %APPDATA%\civic-reporter\reports.db
    pub fn new() -> SqlResult<Self> {
        Self::open_at(Self::get_db_path())
    }

    /// Open (or create) the catalog at an explicit path
    pub fn open_at(db_path: PathBuf) -> SqlResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;

        println!("📁 Report log initialized at: {}", db_path.display());

        let mut log = ReportLog { conn, db_path };
        log.init_schema()?;

        Ok(log)
    }

    /// Get the path where the database should be stored
    fn get_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(|| dirs::home_dir())
            .expect("Could not determine user data directory");

        path.push("civic-reporter");
        path.push("reports.db");
        path
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&mut self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS reports (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                report_id       TEXT NOT NULL UNIQUE,
                label           TEXT NOT NULL,
                lat             REAL NOT NULL,
                lng             REAL NOT NULL,
                provenance      TEXT NOT NULL,
                description     TEXT NOT NULL,
                urgency         TEXT NOT NULL,
                status          TEXT NOT NULL DEFAULT 'submitted',
                submitted_at    INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_reports_submitted_at
             ON reports(submitted_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Record a report the endpoint accepted
    ///
    /// The draft must still hold the fields it was submitted with; the caller
    /// clears it only after logging.
    pub fn record(&self, report_id: &ReportId, draft: &ReportDraft) -> SqlResult<i64> {
        let location = draft
            .location
            .as_ref()
            .expect("a submitted draft always has a location");

        let label = draft
            .classification
            .as_ref()
            .map(|c| c.label.as_str())
            .unwrap_or("unclassified");

        self.conn.execute(
            "INSERT INTO reports
                (report_id, label, lat, lng, provenance, description, urgency, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                report_id.0,
                label,
                location.coordinate.lat,
                location.coordinate.lng,
                location.provenance.as_str(),
                draft.description,
                draft.urgency.as_str(),
                chrono::Utc::now().timestamp(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent reports first
    pub fn recent(&self, limit: usize) -> SqlResult<Vec<SubmittedReport>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, report_id, label, lat, lng, provenance,
                    description, urgency, status, submitted_at
             FROM reports
             ORDER BY submitted_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok(SubmittedReport {
                id: row.get(0)?,
                report_id: row.get(1)?,
                label: row.get(2)?,
                lat: row.get(3)?,
                lng: row.get(4)?,
                provenance: row.get(5)?,
                description: row.get(6)?,
                urgency: row.get(7)?,
                status: row.get(8)?,
                submitted_at: row.get(9)?,
            })
        })?;

        rows.collect()
    }

    /// Total number of reports in the catalog
    pub fn count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM reports", [], |row| row.get(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Coordinate, ImageResource, Provenance, ResolvedLocation};

    fn ready_draft() -> ReportDraft {
        let mut draft = ReportDraft::new();
        draft.set_image(ImageResource::new(
            vec![0xFF, 0xD8],
            image::ImageFormat::Jpeg,
            "t.jpg".into(),
        ));
        draft.set_location(ResolvedLocation {
            coordinate: Coordinate::new(26.4525, 87.2718),
            address: None,
            provenance: Provenance::Device,
        });
        draft.set_classification(None);
        draft.set_description("Blocked drain on main road".into());
        draft
    }

    fn temp_log() -> ReportLog {
        let mut path = std::env::temp_dir();
        path.push(format!("civic-reporter-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        ReportLog::open_at(path).expect("open temp report log")
    }

    #[test]
    fn record_and_list_reports() {
        let log = temp_log();
        assert_eq!(log.count().unwrap(), 0);

        let id = log.record(&ReportId("RPT-0001".into()), &ready_draft()).unwrap();
        assert!(id > 0);
        assert_eq!(log.count().unwrap(), 1);

        let recent = log.recent(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].report_id, "RPT-0001");
        assert_eq!(recent[0].label, "unclassified");
        assert_eq!(recent[0].status, "submitted");
        assert_eq!(recent[0].provenance, "device");

        let _ = std::fs::remove_file(log.path());
    }
}
