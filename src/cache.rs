// src/cache.rs
use alloy::primitives::{Address, U256};
use moka::future::Cache;
use std::{future::Future, sync::Arc, time::Duration};

use crate::models::{ChartSeries, TimeRange, TokenTransfer};

const MAX_ADDRESSES: u64 = 1_000;

/// Time-boxed memo of upstream reads and assembled series.
/// Entries only ever expire; nothing invalidates them early.
#[derive(Clone)]
pub struct UpstreamCache {
    balances: Cache<Address, U256>,
    transfers: Cache<Address, Arc<Vec<TokenTransfer>>>,
    price: Cache<(), f64>,
    series: Cache<(Address, TimeRange), ChartSeries>,
}

impl UpstreamCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            balances: Cache::builder().max_capacity(MAX_ADDRESSES).time_to_live(ttl).build(),
            transfers: Cache::builder().max_capacity(MAX_ADDRESSES).time_to_live(ttl).build(),
            price: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            series: Cache::builder()
                .max_capacity(MAX_ADDRESSES * TimeRange::ALL_RANGES.len() as u64)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn balance(&self, address: Address, load: impl Future<Output = U256>) -> U256 {
        self.balances.get_with(address, load).await
    }

    pub async fn transfers(
        &self,
        address: Address,
        load: impl Future<Output = Vec<TokenTransfer>>,
    ) -> Arc<Vec<TokenTransfer>> {
        self.transfers.get_with(address, async { Arc::new(load.await) }).await
    }

    pub async fn price(&self, load: impl Future<Output = f64>) -> f64 {
        self.price.get_with((), load).await
    }

    pub async fn series(
        &self,
        address: Address,
        range: TimeRange,
        load: impl Future<Output = ChartSeries>,
    ) -> ChartSeries {
        self.series.get_with((address, range), load).await
    }
}
