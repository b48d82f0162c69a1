// Recommender: the catalog, its feature index, and the per-request flow.
//
// Built once at startup and shared read-only (behind an Arc in the web
// server). Every request reads the store once before computing and writes
// at most once after; nothing derived is cached between requests.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::catalog::{Catalog, Item, ItemId};
use crate::db::models::{Score, UserRecord};
use crate::db::RatingStore;
use crate::error::{EngineError, EngineResult};
use crate::features::FeatureIndex;
use crate::scoring::{
    analyze_similarity, recommend, AffinityParams, AffinityReport, FeedbackSummary,
    Recommendations,
};

pub struct Recommender {
    catalog: Catalog,
    index: FeatureIndex,
    affinity: AffinityParams,
}

impl Recommender {
    /// Build the feature index for `catalog`. O(N²) in catalog size.
    pub fn new(catalog: Catalog) -> Self {
        let index = FeatureIndex::build(&catalog);
        Self {
            catalog,
            index,
            affinity: AffinityParams::default(),
        }
    }

    pub fn with_affinity_params(mut self, params: AffinityParams) -> Self {
        self.affinity = params;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    pub fn affinity_params(&self) -> &AffinityParams {
        &self.affinity
    }

    /// Titles containing `query`, case-insensitive, in catalog order.
    pub fn search(&self, query: &str) -> Vec<&Item> {
        self.catalog.search(query)
    }

    /// Rank unseen items for a user from their stored ratings and feedback.
    ///
    /// With `record`, the returned ids are appended to the user's served
    /// history so feedback can later be scored against them.
    pub async fn recommend_for(
        &self,
        store: &dyn RatingStore,
        user_id: &str,
        top_n: usize,
        record: bool,
    ) -> EngineResult<Recommendations> {
        let user_id = validate_user_id(user_id)?;
        let Some(user) = store.load_user(user_id).await? else {
            return Err(EngineError::InvalidRequest(format!(
                "user {user_id} has no ratings to recommend from"
            )));
        };

        let result = recommend(
            user_id,
            &user.ratings,
            &user.feedback_ids(),
            self.index.similarity(),
            &self.catalog,
            top_n,
        )?;

        if record && !result.items.is_empty() {
            store.append_recommended(user_id, &result.ids()).await?;
        }

        info!(
            user_id,
            rated = user.ratings.len(),
            returned = result.items.len(),
            recorded = record,
            "Served recommendations"
        );
        Ok(result)
    }

    /// Rank other users by genre-taste similarity to `user_id`.
    pub async fn similar_users(
        &self,
        store: &dyn RatingStore,
        user_id: &str,
    ) -> EngineResult<AffinityReport> {
        let user_id = validate_user_id(user_id)?;
        let all: BTreeMap<String, BTreeMap<ItemId, Score>> = store
            .load_all()
            .await?
            .into_iter()
            .map(|(id, record)| (id, record.ratings))
            .collect();

        let report = analyze_similarity(user_id, &all, &self.catalog, &self.affinity)?;
        info!(
            user_id,
            users = all.len(),
            matches = report.matches.len(),
            "Computed similar users"
        );
        Ok(report)
    }

    /// Store a 1-5 rating, overwriting any earlier rating of the same item.
    pub async fn record_rating(
        &self,
        store: &dyn RatingStore,
        user_id: &str,
        item_id: ItemId,
        score: i64,
    ) -> EngineResult<()> {
        let user_id = validate_user_id(user_id)?;
        let score = Score::new(score)?;
        self.require_item(item_id)?;

        store.upsert_rating(user_id, item_id, score).await?;
        debug!(user_id, item_id, score = score.value(), "Recorded rating");
        Ok(())
    }

    /// Store a like or dislike, overwriting any earlier one for the item.
    pub async fn record_feedback(
        &self,
        store: &dyn RatingStore,
        user_id: &str,
        item_id: ItemId,
        liked: bool,
    ) -> EngineResult<()> {
        let user_id = validate_user_id(user_id)?;
        self.require_item(item_id)?;

        store.upsert_feedback(user_id, item_id, liked).await?;
        debug!(user_id, item_id, liked, "Recorded feedback");
        Ok(())
    }

    /// Like/dislike counts and hit rate for a known user.
    pub async fn feedback_summary(
        &self,
        store: &dyn RatingStore,
        user_id: &str,
    ) -> EngineResult<FeedbackSummary> {
        let user = self.require_user(store, user_id).await?;
        Ok(FeedbackSummary::from_record(&user))
    }

    async fn require_user(&self, store: &dyn RatingStore, user_id: &str) -> EngineResult<UserRecord> {
        let user_id = validate_user_id(user_id)?;
        store
            .load_user(user_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user {user_id}")))
    }

    fn require_item(&self, item_id: ItemId) -> EngineResult<()> {
        if self.catalog.contains(item_id) {
            Ok(())
        } else {
            Err(EngineError::NotFound(format!("movie {item_id}")))
        }
    }
}

fn validate_user_id(user_id: &str) -> EngineResult<&str> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidRequest("user id is required".into()));
    }
    Ok(trimmed)
}
