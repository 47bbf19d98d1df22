//! Knowledge-graph repository: entities, relations, and their evidence.

use sqlx::PgPool;

use mercantia_core::{EntityId, RelationId, UserId};

use super::RepositoryError;
use crate::models::graph::{
    Entity, EntityDetail, Proof, Relation, RelationDetail, Verification, Witness,
};

const ENTITY_COLUMNS: &str =
    "id, entity_type, properties, trust_score, created_by, created_at, updated_at";
const RELATION_COLUMNS: &str = "id, relation_type, agent_id, object_id, location_id, \
                                start_time, end_time, context, trust_score, created_at";

/// Fields accepted when creating an entity.
#[derive(Debug, Clone)]
pub struct EntityInput {
    pub entity_type: String,
    pub properties: serde_json::Value,
    pub trust_score: Option<i32>,
}

/// Fields accepted when creating a relation.
#[derive(Debug, Clone)]
pub struct RelationInput {
    pub relation_type: String,
    pub agent_id: EntityId,
    pub object_id: EntityId,
    pub location_id: Option<EntityId>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub context: Option<serde_json::Value>,
    pub trust_score: Option<i32>,
}

/// Repository for knowledge-graph database operations.
pub struct GraphRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GraphRepository<'a> {
    /// Create a new graph repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List entities, optionally filtered by Schema.org type.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_entities(
        &self,
        entity_type: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Entity>, RepositoryError> {
        let entities = sqlx::query_as::<_, Entity>(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities \
             WHERE ($1::text IS NULL OR entity_type = $1) \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(entity_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(entities)
    }

    /// Get an entity with its incident relations and verifications.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn get_entity_detail(
        &self,
        id: EntityId,
    ) -> Result<Option<EntityDetail>, RepositoryError> {
        let entity = sqlx::query_as::<_, Entity>(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(entity) = entity else {
            return Ok(None);
        };

        let relations_as_agent = sqlx::query_as::<_, Relation>(&format!(
            "SELECT {RELATION_COLUMNS} FROM relations \
             WHERE agent_id = $1 ORDER BY created_at DESC"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let relations_as_object = sqlx::query_as::<_, Relation>(&format!(
            "SELECT {RELATION_COLUMNS} FROM relations \
             WHERE object_id = $1 ORDER BY created_at DESC"
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let verifications = sqlx::query_as::<_, Verification>(
            "SELECT id, entity_id, method, verified_by, verified_at, expires_at, proof \
             FROM verifications WHERE entity_id = $1 ORDER BY verified_at DESC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(EntityDetail {
            entity,
            relations_as_agent,
            relations_as_object,
            verifications,
        }))
    }

    /// Create an entity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_entity(
        &self,
        input: &EntityInput,
        created_by: Option<UserId>,
    ) -> Result<Entity, RepositoryError> {
        let entity = sqlx::query_as::<_, Entity>(&format!(
            "INSERT INTO entities (entity_type, properties, trust_score, created_by) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ENTITY_COLUMNS}"
        ))
        .bind(&input.entity_type)
        .bind(&input.properties)
        .bind(input.trust_score)
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        Ok(entity)
    }

    /// Replace an entity's properties and trust score.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entity doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_entity(
        &self,
        id: EntityId,
        input: &EntityInput,
    ) -> Result<Entity, RepositoryError> {
        let entity = sqlx::query_as::<_, Entity>(&format!(
            "UPDATE entities \
             SET entity_type = $2, properties = $3, trust_score = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {ENTITY_COLUMNS}"
        ))
        .bind(id)
        .bind(&input.entity_type)
        .bind(&input.properties)
        .bind(input.trust_score)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(entity)
    }

    /// Delete an entity. Incident relations cascade in the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_entity(&self, id: EntityId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM entities WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List relations, optionally filtered by type or incident entity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_relations(
        &self,
        relation_type: Option<&str>,
        entity_id: Option<EntityId>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Relation>, RepositoryError> {
        let relations = sqlx::query_as::<_, Relation>(&format!(
            "SELECT {RELATION_COLUMNS} FROM relations \
             WHERE ($1::text IS NULL OR relation_type = $1) \
               AND ($2::uuid IS NULL OR agent_id = $2 OR object_id = $2) \
             ORDER BY created_at DESC \
             LIMIT $3 OFFSET $4"
        ))
        .bind(relation_type)
        .bind(entity_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(relations)
    }

    /// Get a relation with its proofs and witnesses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn get_relation_detail(
        &self,
        id: RelationId,
    ) -> Result<Option<RelationDetail>, RepositoryError> {
        let relation = sqlx::query_as::<_, Relation>(&format!(
            "SELECT {RELATION_COLUMNS} FROM relations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(relation) = relation else {
            return Ok(None);
        };

        let proofs = sqlx::query_as::<_, Proof>(
            "SELECT id, relation_id, proof_type, url, hash, verified_by, metadata, created_at \
             FROM proofs WHERE relation_id = $1 ORDER BY created_at ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let witnesses = sqlx::query_as::<_, Witness>(
            "SELECT id, relation_id, entity_id, witnessed_at \
             FROM witnesses WHERE relation_id = $1 ORDER BY witnessed_at ASC",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(RelationDetail {
            relation,
            proofs,
            witnesses,
        }))
    }

    /// Create a relation between two existing entities.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced entity is missing,
    /// surfaced as a foreign-key violation.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_relation(&self, input: &RelationInput) -> Result<Relation, RepositoryError> {
        let relation = sqlx::query_as::<_, Relation>(&format!(
            "INSERT INTO relations \
                 (relation_type, agent_id, object_id, location_id, start_time, \
                  end_time, context, trust_score) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {RELATION_COLUMNS}"
        ))
        .bind(&input.relation_type)
        .bind(input.agent_id)
        .bind(input.object_id)
        .bind(input.location_id)
        .bind(input.start_time)
        .bind(input.end_time)
        .bind(&input.context)
        .bind(input.trust_score)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_fk(e, "referenced entity does not exist"))?;

        Ok(relation)
    }

    /// Delete a relation. Its proofs and witnesses cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_relation(&self, id: RelationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM relations WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Attach evidence to a relation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_proof(
        &self,
        relation_id: RelationId,
        proof_type: &str,
        url: Option<&str>,
        hash: Option<&str>,
        metadata: Option<&serde_json::Value>,
    ) -> Result<Proof, RepositoryError> {
        let proof = sqlx::query_as::<_, Proof>(
            "INSERT INTO proofs (relation_id, proof_type, url, hash, metadata) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, relation_id, proof_type, url, hash, verified_by, \
                       metadata, created_at",
        )
        .bind(relation_id)
        .bind(proof_type)
        .bind(url)
        .bind(hash)
        .bind(metadata)
        .fetch_one(self.pool)
        .await?;

        Ok(proof)
    }

    /// Record an entity witnessing a relation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the witnessing entity does not
    /// exist. Returns `RepositoryError::Database` for other database errors.
    pub async fn add_witness(
        &self,
        relation_id: RelationId,
        entity_id: EntityId,
    ) -> Result<Witness, RepositoryError> {
        let witness = sqlx::query_as::<_, Witness>(
            "INSERT INTO witnesses (relation_id, entity_id) \
             VALUES ($1, $2) \
             RETURNING id, relation_id, entity_id, witnessed_at",
        )
        .bind(relation_id)
        .bind(entity_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_fk(e, "witness entity does not exist"))?;

        Ok(witness)
    }
}
