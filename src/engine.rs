use crate::analysis::{
    aggregate_by, aggregate_by_category, sort_by_year, top_n, top_records, CategoryBreakdown,
    Dimension, Measure,
};
use crate::cache::{FreshnessCache, MemoryStore, RocksStore};
use crate::categorizer::Categorizer;
use crate::config::AppConfig;
use crate::error::{Error, FetchError};
use crate::model::{AggregateGroup, BreachRecord};
use crate::presentation::{ChartSink, ChartSlot, ChartView, SlotRegistry};
use crate::source::fetch_records;
use ahash::AHashMap;
use rayon::prelude::*;
use serde::Serialize;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Records of one configured source after load.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub id: String,
    pub slots: Vec<ChartSlot>,
    pub records: Vec<BreachRecord>,
}

/// Everything handed to the rendering boundary for one page load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardData {
    pub entities: Vec<BreachRecord>,
    pub year_trend: Vec<AggregateGroup>,
    pub categories: CategoryBreakdown,
    pub countries: Vec<AggregateGroup>,
    pub defense_mechanisms: Vec<AggregateGroup>,
}

impl DashboardData {
    pub fn view(&self, slot: ChartSlot) -> ChartView<'_> {
        match slot {
            ChartSlot::Entities => ChartView::Records(&self.entities),
            ChartSlot::YearTrend => ChartView::Groups(&self.year_trend),
            ChartSlot::Categories => ChartView::Breakdown(&self.categories),
            ChartSlot::Countries => ChartView::Groups(&self.countries),
            ChartSlot::DefenseMechanisms => ChartView::Groups(&self.defense_mechanisms),
        }
    }
}

#[derive(Debug)]
pub struct RunResult {
    pub data: DashboardData,
    pub fetch_duration: Duration,
    pub aggregate_duration: Duration,
    pub records_loaded: usize,
    pub rendered: Vec<ChartSlot>,
}

pub struct DashboardEngine {
    config: AppConfig,
    cache: FreshnessCache,
    categorizer: Categorizer,
    slots: SlotRegistry,
}

impl DashboardEngine {
    /// Engine with the cache store named by the configuration.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let cache = match config.cache.persistent_path() {
            Some(path) => FreshnessCache::new(RocksStore::open(path)?),
            None => FreshnessCache::new(MemoryStore::new()),
        };
        Ok(Self::with_cache(config, cache))
    }

    pub fn with_cache(config: AppConfig, cache: FreshnessCache) -> Self {
        let categorizer = Categorizer::new(config.unmatched_method_default);
        Self {
            config,
            cache,
            categorizer,
            slots: SlotRegistry::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn cache(&self) -> &FreshnessCache {
        &self.cache
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Run the full pipeline once:
    /// 1. Fetch every source concurrently through the cache, wait for all
    /// 2. Categorize, aggregate and rank per chart slot
    /// 3. Hand each slot to the sink after the hand-off delay
    ///
    /// A failed load reports to the sink and renders nothing.
    pub fn run(&self, sink: &dyn ChartSink) -> Result<RunResult, Error> {
        info!("Loading {} sources...", self.config.sources.len());
        let fetch_start = Instant::now();
        let sources = match self.load() {
            Ok(sources) => sources,
            Err(e) => {
                error!("Failed to load breach data: {}", e);
                sink.on_load_failed(&e.to_string());
                return Err(e.into());
            }
        };
        let fetch_duration = fetch_start.elapsed();
        let records_loaded: usize = sources.iter().map(|s| s.records.len()).sum();
        debug!(
            "Load completed in {:.2}s, {} records from {} sources",
            fetch_duration.as_secs_f64(),
            records_loaded,
            sources.len()
        );

        info!("Aggregating...");
        let aggregate_start = Instant::now();
        let data = self.build(&sources);
        let aggregate_duration = aggregate_start.elapsed();

        let delay = self.config.handoff_delay();
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let rendered: Vec<ChartSlot> = active_slots(&sources)
            .into_iter()
            .filter(|slot| self.render_slot(*slot, &data, sink))
            .collect();

        Ok(RunResult {
            data,
            fetch_duration,
            aggregate_duration,
            records_loaded,
            rendered,
        })
    }

    /// Fan out one cached fetch per source and fan back in. Any failure fails the load.
    pub fn load(&self) -> Result<Vec<LoadedSource>, FetchError> {
        let ttl = self.config.cache.ttl();
        self.config
            .sources
            .par_iter()
            .map(|source| {
                let origin = source.origin();
                let records = self.cache.get_or_fetch_from(
                    &source.id,
                    Some(origin.as_str()),
                    || fetch_records(source),
                    ttl,
                )?;
                Ok::<_, FetchError>(LoadedSource {
                    id: source.id.clone(),
                    slots: source.slots(),
                    records,
                })
            })
            .collect()
    }

    /// Build every chart shape from already-loaded records. Pure; safe to repeat.
    pub fn build(&self, sources: &[LoadedSource]) -> DashboardData {
        let mut by_slot: AHashMap<ChartSlot, Vec<BreachRecord>> = AHashMap::new();
        for source in sources {
            for slot in &source.slots {
                by_slot
                    .entry(*slot)
                    .or_default()
                    .extend(source.records.iter().cloned());
            }
        }
        let records_for = |slot: ChartSlot| by_slot.get(&slot).map(Vec::as_slice).unwrap_or(&[]);
        let n = self.config.top_n;

        let mut categories =
            aggregate_by_category(records_for(ChartSlot::Categories), &self.categorizer);
        categories.by_category = top_n(
            &categories.by_category,
            Measure::IncidentCount,
            categories.by_category.len(),
        );

        let countries = aggregate_by(
            records_for(ChartSlot::Countries),
            &[Dimension::Country],
            &self.categorizer,
        );

        DashboardData {
            entities: top_records(records_for(ChartSlot::Entities), n),
            year_trend: sort_by_year(&aggregate_by(
                records_for(ChartSlot::YearTrend),
                &[Dimension::Year],
                &self.categorizer,
            )),
            categories,
            countries: top_n(&countries, Measure::TotalRecords, countries.len()),
            defense_mechanisms: top_n(
                &aggregate_by(
                    records_for(ChartSlot::DefenseMechanisms),
                    &[Dimension::DefenseMechanism],
                    &self.categorizer,
                ),
                Measure::IncidentCount,
                n,
            ),
        }
    }

    /// Hand `slot` to the sink unless it was already created.
    pub fn render_slot(&self, slot: ChartSlot, data: &DashboardData, sink: &dyn ChartSink) -> bool {
        if !self.slots.claim(slot) {
            debug!("Chart slot '{}' already created, ignoring trigger", slot);
            return false;
        }
        sink.render(slot, data.view(slot));
        true
    }
}

/// Slots fed by at least one source, in dashboard order.
fn active_slots(sources: &[LoadedSource]) -> Vec<ChartSlot> {
    ChartSlot::ALL
        .into_iter()
        .filter(|slot| sources.iter().any(|source| source.slots.contains(slot)))
        .collect()
}
