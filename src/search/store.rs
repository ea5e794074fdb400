//! Knowledge store using SQLite
//!
//! Documents keep their extracted formulations and metrics as JSON so the
//! index can be rebuilt without re-reading the papers.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::Result;
use crate::core::paper::{Document, DocumentMetadata, Section};

pub struct KnowledgeStore {
    conn: Connection,
}

/// A past analysis, as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: i64,
    pub formulation: String,
    pub created_at: String,
    pub result: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub document_count: usize,
    pub paper_count: usize,
    pub analysis_count: usize,
    pub last_indexed: Option<i64>,
}

impl KnowledgeStore {
    /// Open or create database at path
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                file_name TEXT NOT NULL,
                section TEXT NOT NULL,
                title TEXT NOT NULL,
                authors TEXT NOT NULL,       -- JSON array
                content TEXT NOT NULL,
                formulations TEXT NOT NULL,  -- JSON array
                metrics TEXT NOT NULL,       -- JSON object
                indexed_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS analyses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                formulation TEXT NOT NULL,
                result TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kb_meta (
                key TEXT PRIMARY KEY,
                value TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_documents_file ON documents(file_name);
            "#,
        )?;
        Ok(())
    }

    /// Store papers in one transaction, first removing the earlier
    /// documents of every paper in the batch.
    pub fn replace_papers(&mut self, documents: &[Document]) -> Result<()> {
        self.write_documents(documents, false)
    }

    /// Drop all stored documents and store `documents` in one transaction.
    /// Analysis history is kept.
    pub fn replace_all(&mut self, documents: &[Document]) -> Result<()> {
        self.write_documents(documents, true)
    }

    fn write_documents(&mut self, documents: &[Document], clear_all: bool) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let tx = self.conn.transaction()?;
        if clear_all {
            tx.execute("DELETE FROM documents", [])?;
        } else {
            let files: BTreeSet<&str> = documents
                .iter()
                .map(|d| d.metadata.file_name.as_str())
                .collect();
            for file in files {
                tx.execute("DELETE FROM documents WHERE file_name = ?1", params![file])?;
            }
        }
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO documents (id, file_name, section, title, authors, content, formulations, metrics, indexed_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for doc in documents {
                let meta = &doc.metadata;
                stmt.execute(params![
                    doc.id,
                    meta.file_name,
                    meta.section.as_str(),
                    meta.title,
                    serde_json::to_string(&meta.authors)?,
                    doc.content,
                    serde_json::to_string(&meta.formulations)?,
                    serde_json::to_string(&meta.metrics)?,
                    now,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// All documents in insertion order.
    pub fn list_documents(&self) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, file_name, section, title, authors, content, formulations, metrics \
             FROM documents ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, file_name, section, title, authors, content, formulations, metrics) = row?;
            documents.push(Document {
                id,
                content,
                metadata: DocumentMetadata {
                    file_name,
                    section: Section::from_label(&section),
                    title,
                    authors: serde_json::from_str(&authors)?,
                    formulations: serde_json::from_str(&formulations)?,
                    metrics: serde_json::from_str(&metrics)?,
                },
            });
        }
        Ok(documents)
    }

    /// Distinct paper file names, sorted.
    pub fn list_files(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT file_name FROM documents ORDER BY file_name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut files = Vec::new();
        for row in rows {
            files.push(row?);
        }
        Ok(files)
    }

    /// Remove all documents and analysis history.
    pub fn clear(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM documents; DELETE FROM analyses; DELETE FROM kb_meta;",
        )?;
        Ok(())
    }

    pub fn record_analysis<T: Serialize>(
        &self,
        formulation: &str,
        created_at: &str,
        result: &T,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO analyses (formulation, result, created_at) VALUES (?1, ?2, ?3)",
            params![formulation, serde_json::to_string(result)?, created_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent analyses first.
    pub fn recent_analyses(&self, limit: usize) -> Result<Vec<AnalysisRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, formulation, created_at, result FROM analyses ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, formulation, created_at, result) = row?;
            records.push(AnalysisRecord {
                id,
                formulation,
                created_at,
                result: serde_json::from_str(&result)?,
            });
        }
        Ok(records)
    }

    pub fn get_stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        let last_indexed: Option<i64> = self
            .conn
            .query_row("SELECT MAX(indexed_at) FROM documents", [], |row| row.get(0))
            .optional()?
            .flatten();

        Ok(StoreStats {
            document_count: count("SELECT COUNT(*) FROM documents")?,
            paper_count: count("SELECT COUNT(DISTINCT file_name) FROM documents")?,
            analysis_count: count("SELECT COUNT(*) FROM analyses")?,
            last_indexed,
        })
    }

    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kb_meta (key, value) VALUES (?1, ?2) ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM kb_meta WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?
            .flatten())
    }
}
