use anyhow::{anyhow, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use shared::{DatabaseStatus, Gender, Patient};
use sqlx::{migrate::MigrateDatabase, sqlite::SqliteRow, Row, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::domain::NewPatient;

/// DbConnection manages the patient record store
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?;
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema.
    ///
    /// The age bound matches the write-path validation exactly (1-150);
    /// the schema is not allowed to be looser than the service layer.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                age INTEGER NOT NULL CHECK (age BETWEEN 1 AND 150),
                gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female', 'Other')),
                village TEXT NOT NULL,
                health_issue TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Insert a validated patient, assigning its id and timestamps.
    /// Returns the record exactly as persisted.
    pub async fn insert_patient(&self, input: &NewPatient) -> Result<Patient> {
        // Truncate to millisecond precision so the returned record equals
        // what a later read of the stored text will produce
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let now = DateTime::parse_from_rfc3339(&stamp)?.with_timezone(&Utc);

        let patient = Patient {
            id: uuid::Uuid::new_v4().to_string(),
            name: input.name.clone(),
            age: input.age,
            gender: input.gender,
            village: input.village.clone(),
            health_issue: input.health_issue.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO patients (id, name, age, gender, village, health_issue, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&patient.id)
        .bind(&patient.name)
        .bind(patient.age)
        .bind(patient.gender.as_str())
        .bind(&patient.village)
        .bind(&patient.health_issue)
        .bind(&stamp)
        .bind(&stamp)
        .execute(&*self.pool)
        .await?;

        Ok(patient)
    }

    /// List every patient, newest first. The rowid tiebreak keeps the
    /// order strict even for records created in the same millisecond.
    pub async fn list_patients(&self) -> Result<Vec<Patient>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, age, gender, village, health_issue, created_at, updated_at
            FROM patients
            ORDER BY created_at DESC, rowid DESC
            "#,
        )
        .fetch_all(&*self.pool)
        .await?;

        rows.iter().map(Self::row_to_patient).collect()
    }

    /// Probe the store and report its reachability for the health check.
    pub async fn status(&self) -> DatabaseStatus {
        if self.pool.is_closed() {
            return DatabaseStatus::Disconnected;
        }
        match sqlx::query("SELECT 1").execute(&*self.pool).await {
            Ok(_) => DatabaseStatus::Connected,
            Err(_) => DatabaseStatus::Disconnected,
        }
    }

    /// Release the underlying pool, waiting for checked-out connections.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_patient(row: &SqliteRow) -> Result<Patient> {
        let gender: String = row.get("gender");
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(Patient {
            id: row.get("id"),
            name: row.get("name"),
            age: row.get("age"),
            gender: gender
                .parse::<Gender>()
                .map_err(|_| anyhow!("unrecognized gender value in store: {gender}"))?,
            village: row.get("village"),
            health_issue: row.get("health_issue"),
            created_at: DateTime::parse_from_rfc3339(&created_at)?.with_timezone(&Utc),
            updated_at: DateTime::parse_from_rfc3339(&updated_at)?.with_timezone(&Utc),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            age: 34,
            gender: Gender::Male,
            village: "Koli".to_string(),
            health_issue: "fever".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamps() {
        let db = DbConnection::init_test().await.expect("test database");

        let patient = db
            .insert_patient(&sample_patient("Ravi"))
            .await
            .expect("insert patient");

        assert!(!patient.id.is_empty());
        assert_eq!(patient.created_at, patient.updated_at);
        assert_eq!(patient.age, 34);
    }

    #[tokio::test]
    async fn list_returns_newest_first() {
        let db = DbConnection::init_test().await.expect("test database");

        let first = db
            .insert_patient(&sample_patient("First"))
            .await
            .expect("insert first");
        let second = db
            .insert_patient(&sample_patient("Second"))
            .await
            .expect("insert second");
        let third = db
            .insert_patient(&sample_patient("Third"))
            .await
            .expect("insert third");

        let patients = db.list_patients().await.expect("list patients");
        assert_eq!(patients.len(), 3);
        assert_eq!(patients[0].id, third.id);
        assert_eq!(patients[1].id, second.id);
        assert_eq!(patients[2].id, first.id);
    }

    #[tokio::test]
    async fn listed_record_equals_inserted_record() {
        let db = DbConnection::init_test().await.expect("test database");

        let inserted = db
            .insert_patient(&sample_patient("Ravi"))
            .await
            .expect("insert patient");

        let patients = db.list_patients().await.expect("list patients");
        assert_eq!(patients, vec![inserted]);
    }

    #[tokio::test]
    async fn schema_rejects_out_of_range_age() {
        let db = DbConnection::init_test().await.expect("test database");

        // The service layer never sends these, but the schema check is
        // the last line of defense and must agree with it
        let mut zero = sample_patient("Zero");
        zero.age = 0;
        assert!(db.insert_patient(&zero).await.is_err());

        let mut ancient = sample_patient("Ancient");
        ancient.age = 151;
        assert!(db.insert_patient(&ancient).await.is_err());
    }

    #[tokio::test]
    async fn status_reports_connected_store() {
        let db = DbConnection::init_test().await.expect("test database");
        assert_eq!(db.status().await, DatabaseStatus::Connected);
    }

    #[tokio::test]
    async fn status_reports_disconnected_after_close() {
        let db = DbConnection::init_test().await.expect("test database");
        db.close().await;
        assert_eq!(db.status().await, DatabaseStatus::Disconnected);
    }
}
