use anyhow::Result;
use chrono::{DateTime, Utc};
use libsql::{Connection, Row};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STATUS: &str = "applied";

fn default_status() -> String {
    DEFAULT_STATUS.to_string()
}

/// A stored job application.
///
/// `status` is usually one of `applied`, `interview`, `offer` or `rejected`
/// but any text is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// What `create` hands back: the stored record without its timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedApplication {
    pub id: i64,
    pub company: String,
    pub role: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplication {
    pub company: String,
    pub role: String,
    #[serde(default = "default_status")]
    pub status: String,
}

impl NewApplication {
    pub fn new(company: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            company: company.into(),
            role: role.into(),
            status: default_status(),
        }
    }
}

pub struct Tracker<'a> {
    conn: &'a Connection,
}

impl<'a> Tracker<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: NewApplication) -> Result<CreatedApplication> {
        let query = r#"
            INSERT INTO applications (company, role, status)
            VALUES (?, ?, ?)
            RETURNING id, company, role, status
        "#;

        let mut rows = self
            .conn
            .query(query, libsql::params![input.company, input.role, input.status])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(CreatedApplication {
                id: row.get(0)?,
                company: row.get(1)?,
                role: row.get(2)?,
                status: row.get(3)?,
            })
        } else {
            anyhow::bail!("Failed to create application")
        }
    }

    /// All applications, newest first. Rows sharing a timestamp come back in
    /// descending id order.
    pub async fn list(&self) -> Result<Vec<Application>> {
        let query = r#"
            SELECT id, company, role, status, created_at
            FROM applications
            ORDER BY created_at DESC, id DESC
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut applications = vec![];

        while let Some(row) = rows.next().await? {
            applications.push(Self::row_to_application(&row)?);
        }

        Ok(applications)
    }

    fn row_to_application(row: &Row) -> Result<Application> {
        let created_at: String = row.get(4)?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| anyhow::anyhow!("invalid created_at {created_at:?}: {e}"))?
            .with_timezone(&Utc);

        Ok(Application {
            id: row.get(0)?,
            company: row.get(1)?,
            role: row.get(2)?,
            status: row.get(3)?,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("app.db")).await.unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_default_status() {
        let (_dir, db) = open().await;
        let conn = db.connect().unwrap();
        let tracker = Tracker::new(&conn);

        let created = tracker.create(NewApplication::new("Acme", "Engineer")).await.unwrap();
        assert_eq!(
            created,
            CreatedApplication {
                id: 1,
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                status: "applied".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_create_is_not_idempotent() {
        let (_dir, db) = open().await;
        let conn = db.connect().unwrap();
        let tracker = Tracker::new(&conn);

        let a = tracker.create(NewApplication::new("Acme", "Engineer")).await.unwrap();
        let b = tracker.create(NewApplication::new("Acme", "Engineer")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(tracker.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_status_is_free_form() {
        let (_dir, db) = open().await;
        let conn = db.connect().unwrap();
        let tracker = Tracker::new(&conn);

        let input = NewApplication {
            status: "ghosted".to_string(),
            ..NewApplication::new("Initech", "Analyst")
        };
        let created = tracker.create(input).await.unwrap();
        assert_eq!(created.status, "ghosted");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let (_dir, db) = open().await;
        let conn = db.connect().unwrap();
        assert!(Tracker::new(&conn).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_dir, db) = open().await;

        for company in ["A", "B", "C"] {
            let conn = db.connect().unwrap();
            Tracker::new(&conn)
                .create(NewApplication::new(company, "Engineer"))
                .await
                .unwrap();
        }

        let conn = db.connect().unwrap();
        let listed = Tracker::new(&conn).list().await.unwrap();
        let companies: Vec<&str> = listed.iter().map(|a| a.company.as_str()).collect();
        assert_eq!(companies, vec!["C", "B", "A"]);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn test_new_application_status_defaults_on_deserialize() {
        let input: NewApplication = serde_json::from_str(r#"{"company":"Acme","role":"Engineer"}"#).unwrap();
        assert_eq!(input.status, DEFAULT_STATUS);

        let missing_role = serde_json::from_str::<NewApplication>(r#"{"company":"Acme"}"#);
        assert!(missing_role.is_err());
    }
}
