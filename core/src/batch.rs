//! Batch driver: lazily builds `count` records of one entity type.
//!
//! RULES:
//!   - The request is validated before anything is generated.
//!   - A seeded batch owns a stream derived from (seed, entity slot) and
//!     computes identifiers from (entity tag, seed, index); an unseeded
//!     batch draws both from OS entropy.
//!   - Records are produced in index order, one per `next()`.

use crate::{
    clock::ReferenceClock,
    error::{GenError, GenResult},
    identity::IdSource,
    provider::{FakeProvider, ProfileProvider},
    record::TabularRecord,
    rng::{RngBank, SampleRng, StreamSlot},
    types::{Locale, RecordIndex, Seed},
};
use uuid::Uuid;

/// Builds one complete record of a single entity type.
pub trait RecordBuilder {
    type Record: TabularRecord;

    /// Stable entity tag, used in seeded identifiers and file names.
    const ENTITY: &'static str;

    /// Random stream slot for seeded runs.
    const STREAM: StreamSlot;

    fn build<P: ProfileProvider>(
        &self,
        id: Uuid,
        provider: &P,
        rng: &mut SampleRng,
        clock: &ReferenceClock,
    ) -> Self::Record;
}

/// What to generate. `count` is signed so callers can pass user input
/// through unchanged; a negative count is rejected.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub count: i64,
    pub seed: Option<Seed>,
    pub locale: Locale,
    pub clock: ReferenceClock,
}

impl GenerateOptions {
    pub fn new(count: i64) -> Self {
        Self {
            count,
            seed: None,
            locale: Locale::default(),
            clock: ReferenceClock::system(),
        }
    }

    pub fn with_seed(mut self, seed: Seed) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_clock(mut self, clock: ReferenceClock) -> Self {
        self.clock = clock;
        self
    }

    /// The record count, or InvalidArgument if negative.
    pub fn validated_count(&self) -> GenResult<u64> {
        u64::try_from(self.count).map_err(|_| {
            GenError::invalid(format!("count must be >= 0, got {}", self.count))
        })
    }
}

/// A finite, non-restartable sequence of records.
pub struct RecordBatch<B: RecordBuilder, P: ProfileProvider = FakeProvider> {
    builder: B,
    provider: P,
    rng: SampleRng,
    ids: IdSource,
    clock: ReferenceClock,
    next_index: RecordIndex,
    count: u64,
}

impl<B: RecordBuilder> RecordBatch<B, FakeProvider> {
    pub fn new(builder: B, options: &GenerateOptions) -> GenResult<Self> {
        Self::with_provider(builder, FakeProvider::new(options.locale), options)
    }
}

impl<B: RecordBuilder, P: ProfileProvider> RecordBatch<B, P> {
    pub fn with_provider(builder: B, provider: P, options: &GenerateOptions) -> GenResult<Self> {
        let count = options.validated_count()?;
        let rng = match options.seed {
            Some(seed) => RngBank::new(seed).for_stream(B::STREAM),
            None => SampleRng::from_entropy(),
        };
        log::debug!(
            "{} batch: count={count} seed={:?} locale={} rng={}",
            B::ENTITY,
            options.seed,
            options.locale,
            rng.name
        );
        Ok(Self {
            builder,
            provider,
            rng,
            ids: IdSource::for_run(B::ENTITY, options.seed),
            clock: options.clock,
            next_index: 0,
            count,
        })
    }

    pub fn entity(&self) -> &'static str {
        B::ENTITY
    }
}

impl<B: RecordBuilder, P: ProfileProvider> Iterator for RecordBatch<B, P> {
    type Item = B::Record;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_index >= self.count {
            return None;
        }
        let id = self.ids.id_for(self.next_index);
        let record = self
            .builder
            .build(id, &self.provider, &mut self.rng, &self.clock);
        self.next_index += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.next_index) as usize;
        (remaining, Some(remaining))
    }
}

impl<B: RecordBuilder, P: ProfileProvider> ExactSizeIterator for RecordBatch<B, P> {}

impl<B: RecordBuilder, P: ProfileProvider> std::iter::FusedIterator for RecordBatch<B, P> {}
