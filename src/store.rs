//! Local record store backed by the `records` table.
//!
//! The store owns the in-memory record collection. Every mutation runs in its
//! own transaction and only touches the collection once the write committed,
//! so a failed write leaves both sides as they were.

use std::{future::Future, time::Duration};

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    db::{self, DB},
    error::{Error, Result},
    models::{DATE_FMT, FitnessRecord, NewRecord, Payload, RecordRow},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct RecordStore {
    pool: DB,
    records: Vec<FitnessRecord>,
    timeout: Duration,
}

async fn guarded<T>(limit: Duration, op: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(Error::persistence(format!("{op} timed out after {limit:?}"))),
    }
}

/// Time-ordered, so ids created later on this device never collide.
fn new_id() -> String {
    Uuid::now_v7().to_string()
}

impl RecordStore {
    pub async fn open(pool: DB) -> Result<Self> {
        Self::open_with_timeout(pool, DEFAULT_TIMEOUT).await
    }

    /// Create the table if needed and load the current rows.
    pub async fn open_with_timeout(pool: DB, timeout: Duration) -> Result<Self> {
        guarded(timeout, "initialize", db::init_schema(&pool)).await?;

        let mut store = Self { pool, records: Vec::new(), timeout };
        store.list().await?;
        Ok(store)
    }

    /// Snapshot of the in-memory collection, in the order it was built up.
    pub fn records(&self) -> &[FitnessRecord] {
        &self.records
    }

    /// All records, newest date first. Refreshes the in-memory collection.
    pub async fn list(&mut self) -> Result<&[FitnessRecord]> {
        self.records = self.fetch(None, None).await?;
        Ok(&self.records)
    }

    /// Records with `from <= date <= to`, newest first. Either bound may be
    /// left open. Does not touch the in-memory collection.
    pub async fn list_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<FitnessRecord>> {
        self.fetch(from, to).await
    }

    async fn fetch(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Vec<FitnessRecord>> {
        let rows: Vec<RecordRow> = guarded(self.timeout, "list", async {
            Ok::<_, Error>(sqlx::query_as::<_, RecordRow>(
                r#"
                SELECT id, date, part, exercise, sets, reps, distance, minutes, seconds
                FROM records
                WHERE (?1 IS NULL OR date >= ?1)
                  AND (?2 IS NULL OR date <= ?2)
                ORDER BY date DESC, id DESC
                "#,
            )
            .bind(from.map(|d| d.format(DATE_FMT).to_string()))
            .bind(to.map(|d| d.format(DATE_FMT).to_string()))
            .fetch_all(&self.pool)
            .await?)
        })
        .await?;

        debug!(rows = rows.len(), ?from, ?to, "loaded records");
        rows.into_iter().map(FitnessRecord::try_from).collect()
    }

    /// Validate, assign an id and insert. The new record is appended to the
    /// in-memory collection; call `list` to get it back in date order.
    pub async fn create(&mut self, new: NewRecord) -> Result<FitnessRecord> {
        let record = new.validate()?.into_record(new_id());
        let (sets, reps, distance, minutes, seconds) = Payload::columns(record.payload.as_ref());

        guarded(self.timeout, "create", async {
            let mut tx = self.pool.begin().await?;
            sqlx::query(
                r#"
                INSERT INTO records
                  (id, date, part, exercise, sets, reps, distance, minutes, seconds)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&record.id)
            .bind(record.date.format(DATE_FMT).to_string())
            .bind(record.part.label())
            .bind(record.exercise.as_deref().unwrap_or_default())
            .bind(sets)
            .bind(reps)
            .bind(distance)
            .bind(minutes)
            .bind(seconds)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok::<_, Error>(())
        })
        .await?;

        info!(id = %record.id, date = %record.date, part = %record.part, "record created");
        self.records.push(record.clone());
        Ok(record)
    }

    /// Remove the record with `id`. Unknown ids are not an error; the return
    /// value only says whether a row went away.
    pub async fn delete(&mut self, id: &str) -> Result<bool> {
        let affected = guarded(self.timeout, "delete", async {
            let mut tx = self.pool.begin().await?;
            let res = sqlx::query("DELETE FROM records WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            Ok::<_, Error>(res.rows_affected())
        })
        .await?;

        self.records.retain(|r| r.id != id);
        if affected == 0 {
            debug!(id, "delete: no such record");
        } else {
            info!(id, "record deleted");
        }
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BodyPart;

    async fn setup() -> (DB, RecordStore) {
        let pool = db::open("sqlite::memory:").await.expect("in-memory db");
        let store = RecordStore::open(pool.clone()).await.expect("store");
        (pool, store)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FMT).unwrap()
    }

    fn bench(date: &str) -> NewRecord {
        NewRecord::new(day(date), BodyPart::Chest)
            .exercise("Bench")
            .payload(Payload::Sets { sets: 3, reps: 10 })
    }

    #[tokio::test]
    async fn create_then_list_returns_record_with_fresh_id() {
        let (_pool, mut store) = setup().await;
        assert!(store.list().await.unwrap().is_empty());

        let created = store.create(bench("2024-06-12")).await.unwrap();
        assert!(!created.id.is_empty());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], created);
        assert_eq!(listed[0].part, BodyPart::Chest);
        assert_eq!(listed[0].exercise.as_deref(), Some("Bench"));
        assert_eq!(listed[0].payload, Some(Payload::Sets { sets: 3, reps: 10 }));
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let (_pool, mut store) = setup().await;
        let a = store.create(bench("2024-06-12")).await.unwrap();
        let b = store.create(bench("2024-06-12")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn list_is_newest_first_but_create_only_appends() {
        let (_pool, mut store) = setup().await;
        store.create(bench("2024-06-01")).await.unwrap();
        store.create(bench("2024-07-01")).await.unwrap();
        store.create(bench("2024-06-15")).await.unwrap();

        let appended: Vec<_> = store.records().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(appended, ["2024-06-01", "2024-07-01", "2024-06-15"]);

        let listed: Vec<_> = store.list().await.unwrap().iter().map(|r| r.date.to_string()).collect();
        assert_eq!(listed, ["2024-07-01", "2024-06-15", "2024-06-01"]);
    }

    #[tokio::test]
    async fn delete_removes_and_missing_id_is_noop() {
        let (_pool, mut store) = setup().await;
        let keep = store.create(bench("2024-06-01")).await.unwrap();
        let gone = store.create(bench("2024-06-02")).await.unwrap();

        assert!(store.delete(&gone.id).await.unwrap());
        assert_eq!(store.records(), &[keep.clone()]);
        assert_eq!(store.list().await.unwrap(), &[keep.clone()]);

        assert!(!store.delete("does-not-exist").await.unwrap());
        assert!(!store.delete(&gone.id).await.unwrap());
        assert_eq!(store.list().await.unwrap(), &[keep]);
    }

    #[tokio::test]
    async fn invalid_record_is_rejected_before_insert() {
        let (pool, mut store) = setup().await;
        let err = store
            .create(NewRecord::new(day("2024-06-12"), BodyPart::Back))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.records().is_empty());

        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM records")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn failed_insert_leaves_collection_unchanged() {
        let (pool, mut store) = setup().await;
        let first = store.create(bench("2024-06-01")).await.unwrap();

        pool.close().await;
        let err = store.create(bench("2024-06-02")).await.unwrap_err();
        assert!(err.is_persistence());
        assert_eq!(store.records(), &[first]);
    }

    #[tokio::test]
    async fn list_range_applies_inclusive_bounds() {
        let (_pool, mut store) = setup().await;
        for d in ["2024-05-31", "2024-06-01", "2024-06-30", "2024-07-01"] {
            store.create(bench(d)).await.unwrap();
        }

        let june = store
            .list_range(Some(day("2024-06-01")), Some(day("2024-06-30")))
            .await
            .unwrap();
        let dates: Vec<_> = june.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2024-06-30", "2024-06-01"]);

        let since = store.list_range(Some(day("2024-06-30")), None).await.unwrap();
        assert_eq!(since.len(), 2);
        assert_eq!(store.records().len(), 4);
    }

    #[tokio::test]
    async fn reopen_loads_existing_rows() {
        let (pool, mut store) = setup().await;
        store.create(bench("2024-06-01")).await.unwrap();
        drop(store);

        let reopened = RecordStore::open(pool).await.unwrap();
        assert_eq!(reopened.records().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_row_surfaces_as_persistence_error() {
        let (pool, mut store) = setup().await;
        sqlx::query("INSERT INTO records (id, date, part, exercise) VALUES ('bad', 'yesterday', '胸', 'x')")
            .execute(&pool)
            .await
            .unwrap();
        assert!(store.list().await.unwrap_err().is_persistence());
    }

    #[tokio::test]
    async fn out_of_range_quantity_row_surfaces_as_persistence_error() {
        let (pool, mut store) = setup().await;
        sqlx::query(
            "INSERT INTO records (id, date, part, exercise, sets, reps) VALUES ('neg', '2024-06-12', '胸', 'Bench', -3, 10)",
        )
        .execute(&pool)
        .await
        .unwrap();
        let err = store.list().await.unwrap_err();
        assert!(err.is_persistence(), "{err:?}");
        assert!(err.to_string().contains("sets"), "{err}");
    }

    #[tokio::test]
    async fn create_times_out_while_connection_is_held() {
        let pool = db::open("sqlite::memory:").await.unwrap();
        let mut store = RecordStore::open_with_timeout(pool.clone(), Duration::from_millis(200))
            .await
            .unwrap();

        // The pool has a single connection; hold it so the insert cannot start.
        let conn = pool.acquire().await.unwrap();
        let err = store.create(bench("2024-06-12")).await.unwrap_err();
        assert!(err.is_persistence(), "{err:?}");
        assert!(err.to_string().contains("create timed out"), "{err}");
        assert!(store.records().is_empty());

        drop(conn);
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM records")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
