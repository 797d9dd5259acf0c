//! Chain Service
//!
//! Fetches block height and Ark protocol info and feeds them to the
//! block-height estimator.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::Result;
use crate::estimator::BlockHeightEstimator;
use crate::flight::SingleFlight;
use crate::models::{ArkInfo, Resource};
use crate::source::DataSource;
use crate::tasks::PersistenceHandle;

// == Chain Service ==
pub struct ChainService {
    source: Arc<dyn DataSource>,
    persistence: PersistenceHandle,
    height_flight: SingleFlight<u64>,
    ark_info_flight: SingleFlight<ArkInfo>,
    estimator: Arc<RwLock<BlockHeightEstimator>>,
}

impl ChainService {
    /// # Arguments
    /// * `height_ttl` - Freshness window of a fetched block height
    /// * `ark_info_ttl` - Freshness window of fetched protocol info
    pub fn new(
        source: Arc<dyn DataSource>,
        persistence: PersistenceHandle,
        height_ttl: Duration,
        ark_info_ttl: Duration,
    ) -> Self {
        Self {
            source,
            persistence,
            height_flight: SingleFlight::new(),
            ark_info_flight: SingleFlight::new(),
            estimator: Arc::new(RwLock::new(BlockHeightEstimator::new(
                height_ttl,
                ark_info_ttl,
            ))),
        }
    }

    // == Fetches ==
    /// Fetches the block height and records it as the new baseline.
    ///
    /// Recording and persistence happen once per fetch, inside the shared
    /// operation, and still happen if every caller stops waiting.
    pub async fn fetch_block_height(&self) -> Result<u64> {
        let source = Arc::clone(&self.source);
        let estimator = Arc::clone(&self.estimator);
        let persistence = self.persistence.clone();
        self.height_flight
            .execute(Resource::BlockHeight.key(), move || async move {
                let height = source.fetch_block_height().await?;
                estimator.write().await.record_height(height);
                persistence.submit(Resource::BlockHeight, &height);
                Ok(height)
            })
            .await
    }

    /// Fetches Ark protocol info and caches it, once per fetch.
    pub async fn fetch_ark_info(&self) -> Result<ArkInfo> {
        let source = Arc::clone(&self.source);
        let estimator = Arc::clone(&self.estimator);
        let persistence = self.persistence.clone();
        self.ark_info_flight
            .execute(Resource::ArkInfo.key(), move || async move {
                let info = source.fetch_ark_info().await?;
                estimator.write().await.record_ark_info(info.clone());
                persistence.submit(Resource::ArkInfo, &info);
                Ok(info)
            })
            .await
    }

    // == Get Or Fetch ==
    /// The fresh cached block height, or a new fetch when stale or missing.
    pub async fn block_height(&self) -> Result<u64> {
        if let Some(height) = self.estimator.read().await.fresh_height() {
            debug!("Block height cache hit: {}", height);
            return Ok(height);
        }
        self.fetch_block_height().await
    }

    /// The fresh cached Ark info, or a new fetch when stale or missing.
    pub async fn ark_info(&self) -> Result<ArkInfo> {
        if let Some(info) = self.estimator.read().await.fresh_ark_info() {
            return Ok(info);
        }
        self.fetch_ark_info().await
    }

    // == Refresh ==
    /// Fetches both values concurrently. Returns the first failure, after
    /// recording whichever value did arrive.
    pub async fn refresh(&self) -> Result<()> {
        let (height, info) = tokio::join!(self.fetch_block_height(), self.fetch_ark_info());
        height?;
        info?;
        Ok(())
    }

    // == Estimate ==
    /// Extrapolated height from cached values only. None until a height was
    /// ever fetched.
    pub async fn estimate(&self) -> Option<u64> {
        self.estimator.read().await.estimate()
    }

    /// Like [`ChainService::estimate`], but primes the caches with a fetch
    /// when nothing is cached yet. Fetch failures are logged and yield None.
    pub async fn estimated_block_height(&self) -> Option<u64> {
        if let Some(estimate) = self.estimate().await {
            return Some(estimate);
        }
        if let Err(err) = self.refresh().await {
            warn!("Block height estimate unavailable: {}", err);
        }
        self.estimate().await
    }

    pub fn cancel_all(&self) -> usize {
        self.height_flight.cancel_all() + self.ark_info_flight.cancel_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::WalletError;
    use crate::source::{MockDataSource, MockResponses};
    use crate::store::MemoryStore;
    use crate::tasks::spawn_persistence_task;

    fn build(source: Arc<MockDataSource>) -> ChainService {
        build_with_store(source).0
    }

    fn build_with_store(source: Arc<MockDataSource>) -> (ChainService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let (persistence, _worker) = spawn_persistence_task(store.clone(), 16);
        let chain = ChainService::new(
            source,
            persistence,
            Duration::from_secs(60),
            Duration::from_secs(300),
        );
        (chain, store)
    }

    fn source_at(height: u64) -> Arc<MockDataSource> {
        Arc::new(MockDataSource::new(MockResponses {
            block_height: Ok(height),
            ..MockResponses::default()
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_height_is_cached_within_ttl() {
        let source = source_at(1000);
        let chain = build(source.clone());

        assert_eq!(chain.block_height().await, Ok(1000));
        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(chain.block_height().await, Ok(1000));

        assert_eq!(source.calls(Resource::BlockHeight), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_block_height_refetched_after_ttl() {
        let source = source_at(1000);
        let chain = build(source.clone());
        chain.block_height().await.unwrap();

        tokio::time::advance(Duration::from_secs(61)).await;
        source.update(|r| r.block_height = Ok(1003)).await;

        assert_eq!(chain.block_height().await, Ok(1003));
        assert_eq!(source.calls(Resource::BlockHeight), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimate_without_fetch_is_none() {
        let chain = build(source_at(1000));
        assert_eq!(chain.estimate().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimated_block_height_primes_and_extrapolates() {
        let source = source_at(1000);
        let chain = build(source.clone());

        assert_eq!(chain.estimated_block_height().await, Some(1000));

        // Default mock round interval is 30s
        tokio::time::advance(Duration::from_secs(65)).await;
        assert_eq!(chain.estimated_block_height().await, Some(1002));
        assert_eq!(source.calls(Resource::BlockHeight), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimated_block_height_when_fetch_fails() {
        let source = Arc::new(MockDataSource::new(MockResponses {
            block_height: Err(WalletError::fetch(Resource::BlockHeight, "offline")),
            ..MockResponses::default()
        }));
        let chain = build(source);

        assert_eq!(chain.estimated_block_height().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_height() {
        let source = source_at(1000);
        let chain = build(source.clone());
        chain.refresh().await.unwrap();

        let failure = WalletError::fetch(Resource::BlockHeight, "offline");
        source.update(|r| r.block_height = Err(failure.clone())).await;

        assert_eq!(chain.refresh().await, Err(failure));
        assert_eq!(chain.estimate().await, Some(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_joined_fetches_record_and_persist_once() {
        let source = Arc::new(
            MockDataSource::new(MockResponses {
                block_height: Ok(1000),
                ..MockResponses::default()
            })
            .with_latency(Duration::from_millis(200)),
        );
        let (chain, store) = build_with_store(source.clone());

        let fetches = (0..10).map(|_| chain.fetch_block_height());
        let heights = futures::future::join_all(fetches).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(heights.iter().all(|h| h == &Ok(1000)));
        assert_eq!(source.calls(Resource::BlockHeight), 1);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_records_height_after_caller_gives_up() {
        let source = Arc::new(
            MockDataSource::new(MockResponses {
                block_height: Ok(1000),
                ..MockResponses::default()
            })
            .with_latency(Duration::from_secs(5)),
        );
        let chain = build(source);

        let gave_up =
            tokio::time::timeout(Duration::from_secs(1), chain.fetch_block_height()).await;
        assert!(gave_up.is_err());

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(chain.estimate().await, Some(1000));
    }
}
