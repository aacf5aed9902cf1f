//! Image metadata queries

use chrono::Utc;

use super::{Database, DbResult, Image, NewImage};

impl Database {
    /// Insert an image row. The unique constraint on `storage_key` is the
    /// concurrency control for racing confirmations: a duplicate insert
    /// fails with `DbError::UniqueViolation` and the caller resolves it
    /// against the existing row.
    pub async fn insert_image(&self, new: &NewImage) -> DbResult<Image> {
        let result = sqlx::query(
            "INSERT INTO images (user_id, filename, storage_key, content_type, size_bytes, public_url, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.user_id)
        .bind(&new.filename)
        .bind(&new.storage_key)
        .bind(&new.content_type)
        .bind(new.size_bytes)
        .bind(&new.public_url)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        self.get_image_required(result.last_insert_rowid()).await
    }

    /// Get an image by id regardless of owner
    pub async fn get_image_required(&self, id: i64) -> DbResult<Image> {
        sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or(super::DbError::NotFound)
    }

    /// Get an image by its storage key
    pub async fn get_image_by_storage_key(&self, storage_key: &str) -> DbResult<Option<Image>> {
        let image = sqlx::query_as::<_, Image>("SELECT * FROM images WHERE storage_key = ?")
            .bind(storage_key)
            .fetch_optional(self.pool())
            .await?;

        Ok(image)
    }

    /// Get an image by id, scoped to its owner. Absent and not-owned are
    /// indistinguishable to the caller.
    pub async fn get_image_owned(&self, id: i64, user_id: i64) -> DbResult<Option<Image>> {
        let image = sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(image)
    }

    /// List a page of a user's images, newest first
    pub async fn list_images(&self, user_id: i64, limit: i64, offset: i64) -> DbResult<Vec<Image>> {
        let images = sqlx::query_as::<_, Image>(
            "SELECT * FROM images WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        Ok(images)
    }

    /// Count all images owned by a user
    pub async fn count_images(&self, user_id: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM images WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool())
            .await?;

        Ok(total)
    }

    /// Delete an image row. Returns whether a row was removed.
    pub async fn delete_image_row(&self, id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
