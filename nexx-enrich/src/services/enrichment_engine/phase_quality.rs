//! Pass 4: DATA-QUALITY
//!
//! Fills missing brand, then missing category, from keyword rules on the
//! device name. Devices whose name matches no rule are left untouched.

use super::{EnrichmentEngine, RunContext};
use crate::db::DeviceField;
use crate::error::Result;
use crate::inference::{infer_brand, infer_category};
use crate::models::{ChangeAction, EnrichmentChange};
use tracing::info;

pub const QUALITY_SOURCE: &str = "name-inference";

impl EnrichmentEngine {
    pub(super) async fn phase_quality(&self, ctx: &mut RunContext) -> Result<()> {
        let before = ctx.changes().len();

        self.infer_field(ctx, DeviceField::Brand, infer_brand).await?;
        self.infer_field(ctx, DeviceField::Category, infer_category)
            .await?;

        info!(
            proposals = ctx.changes().len() - before,
            remaining = ctx.remaining_budget(),
            "Data-quality pass finished"
        );
        Ok(())
    }

    async fn infer_field(
        &self,
        ctx: &mut RunContext,
        field: DeviceField,
        infer: fn(&str) -> Option<&'static str>,
    ) -> Result<()> {
        if ctx.reached_limit() {
            return Ok(());
        }

        let devices = self
            .store
            .devices_missing(field, self.options.quality_sample)
            .await?;

        for (name, current) in devices {
            let Some(value) = infer(&name) else {
                continue;
            };
            if ctx.reached_limit() {
                break;
            }

            if !self.options.dry_run {
                self.store
                    .update_device_field(&name, field, Some(value))
                    .await?;
            }

            ctx.record(EnrichmentChange::new(
                ChangeAction::Enrich,
                &name,
                field.column(),
                current,
                value,
                QUALITY_SOURCE,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::EngineOptions;
    use super::*;

    async fn brand_and_category(pool: &sqlx::SqlitePool, name: &str) -> (Option<String>, Option<String>) {
        sqlx::query_as("SELECT brand, category FROM devices WHERE name = ?")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_samsung_galaxy_s23() {
        let pool = memory_pool().await;
        insert_device(&pool, "Samsung Galaxy S23", None, None, None).await;

        let engine = engine(&pool, apply_options(25));
        let mut ctx = RunContext::new(25);
        engine.phase_quality(&mut ctx).await.unwrap();

        let fields: Vec<(&str, &str)> = ctx
            .changes()
            .iter()
            .map(|c| (c.field.as_str(), c.new_value.as_str()))
            .collect();
        assert_eq!(fields, vec![("brand", "Samsung"), ("category", "smartphone")]);
        assert!(ctx.changes().iter().all(|c| c.source == QUALITY_SOURCE));

        let (brand, category) = brand_and_category(&pool, "Samsung Galaxy S23").await;
        assert_eq!(brand.as_deref(), Some("Samsung"));
        assert_eq!(category.as_deref(), Some("smartphone"));
    }

    #[tokio::test]
    async fn test_empty_string_counts_as_missing() {
        let pool = memory_pool().await;
        insert_device(&pool, "iPad Air", None, None, None).await;
        sqlx::query("UPDATE devices SET brand = '', category = 'tablet' WHERE name = 'iPad Air'")
            .execute(&pool)
            .await
            .unwrap();

        let engine = engine(&pool, EngineOptions::default());
        let mut ctx = RunContext::new(25);
        engine.phase_quality(&mut ctx).await.unwrap();

        assert_eq!(ctx.changes().len(), 1);
        assert_eq!(ctx.changes()[0].field, "brand");
        assert_eq!(ctx.changes()[0].old_value.as_deref(), Some(""));
        // Dry run leaves the row alone
        let (brand, _) = brand_and_category(&pool, "iPad Air").await;
        assert_eq!(brand.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_unrecognised_name_is_skipped() {
        let pool = memory_pool().await;
        insert_device(&pool, "Fairphone 5", None, None, None).await;

        let engine = engine(&pool, apply_options(25));
        let mut ctx = RunContext::new(25);
        engine.phase_quality(&mut ctx).await.unwrap();

        assert!(ctx.changes().is_empty());
        assert_eq!(brand_and_category(&pool, "Fairphone 5").await, (None, None));
    }

    #[tokio::test]
    async fn test_budget_spent_on_brands_skips_categories() {
        let pool = memory_pool().await;
        insert_device(&pool, "iPhone 13", None, None, None).await;
        insert_device(&pool, "Galaxy S22", None, None, None).await;

        let engine = engine(&pool, apply_options(2));
        let mut ctx = RunContext::new(2);
        engine.phase_quality(&mut ctx).await.unwrap();

        assert_eq!(ctx.changes().len(), 2);
        assert!(ctx.changes().iter().all(|c| c.field == "brand"));
        assert_eq!(brand_and_category(&pool, "iPhone 13").await.1, None);
    }
}
