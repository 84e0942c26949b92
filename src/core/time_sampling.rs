//! Time sampling types and sample bracketing.
//!
//! Archive properties are sampled over time. [`TimeSampling`] describes when
//! each sample was recorded; [`SampleTimeline`] pairs it with a sample count
//! and answers the one question the sampler asks: which two samples bracket a
//! query time, and how far between them it lies.

use crate::core::SampleInterp;
use crate::util::Chrono;

/// Query times closer than this to the floor sample use it unblended.
pub const COINCIDENT_EPSILON: Chrono = 1e-4;

/// Slack for uniform sample-index arithmetic landing just below an integer.
const CHRONO_EPSILON: Chrono = 1e-9;

/// Type of time sampling.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TimeSamplingType {
    /// Single static sample at time 0 (identity sampling).
    #[default]
    Identity,

    /// Uniform sampling: samples at regular intervals.
    /// start_time + index * time_per_cycle
    Uniform {
        time_per_cycle: Chrono,
        start_time: Chrono,
    },

    /// Cyclic sampling: repeating pattern of sample times.
    Cyclic {
        time_per_cycle: Chrono,
        times: Vec<Chrono>,
    },

    /// Acyclic sampling: explicit time for each sample.
    Acyclic {
        times: Vec<Chrono>,
    },
}

/// Time sampling information for a node schema.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeSampling {
    /// The type of sampling.
    pub sampling_type: TimeSamplingType,
}

impl TimeSampling {
    /// Identity time sampling (single sample at time 0).
    pub const IDENTITY: Self = Self {
        sampling_type: TimeSamplingType::Identity,
    };

    /// Create uniform time sampling.
    pub fn uniform(time_per_cycle: Chrono, start_time: Chrono) -> Self {
        Self {
            sampling_type: TimeSamplingType::Uniform {
                time_per_cycle,
                start_time,
            },
        }
    }

    /// Create acyclic time sampling from explicit times.
    pub fn acyclic(times: Vec<Chrono>) -> Self {
        Self {
            sampling_type: TimeSamplingType::Acyclic { times },
        }
    }

    /// Create cyclic time sampling.
    pub fn cyclic(time_per_cycle: Chrono, times: Vec<Chrono>) -> Self {
        Self {
            sampling_type: TimeSamplingType::Cyclic {
                time_per_cycle,
                times,
            },
        }
    }

    /// Get the time for a specific sample index.
    pub fn sample_time(&self, index: usize) -> Chrono {
        match &self.sampling_type {
            TimeSamplingType::Identity => 0.0,
            TimeSamplingType::Uniform { time_per_cycle, start_time } => {
                *start_time + (index as Chrono) * *time_per_cycle
            }
            TimeSamplingType::Cyclic { time_per_cycle, times } => {
                if times.is_empty() {
                    return 0.0;
                }
                let cycle = index / times.len();
                let local_idx = index % times.len();
                times[local_idx] + (cycle as Chrono) * *time_per_cycle
            }
            TimeSamplingType::Acyclic { times } => {
                // Past the stored times the last one repeats.
                times.get(index).or(times.last()).copied().unwrap_or(0.0)
            }
        }
    }

    /// Find the floor index (largest index with time <= given time).
    ///
    /// Times before the first sample clamp to index 0.
    pub fn floor_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        match &self.sampling_type {
            TimeSamplingType::Identity => (0, 0.0),
            TimeSamplingType::Uniform { time_per_cycle, start_time } => {
                if time <= *start_time || *time_per_cycle <= 0.0 {
                    return (0, *start_time);
                }
                let idx = ((time - start_time) / time_per_cycle).floor() as usize;
                let mut idx = idx.min(num_samples - 1);
                // (t - start) / dt can come out as n - 1e-16 for t exactly on sample n
                if idx + 1 < num_samples && self.sample_time(idx + 1) <= time + CHRONO_EPSILON {
                    idx += 1;
                }
                (idx, self.sample_time(idx))
            }
            TimeSamplingType::Cyclic { .. } | TimeSamplingType::Acyclic { .. } => {
                // Binary search for floor
                let mut lo = 0;
                let mut hi = num_samples;
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    if self.sample_time(mid) <= time {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                let idx = if lo > 0 { lo - 1 } else { 0 };
                (idx, self.sample_time(idx))
            }
        }
    }

    /// Find the ceiling index (smallest index with time >= given time).
    ///
    /// Times after the last sample clamp to the last index.
    pub fn ceil_index(&self, time: Chrono, num_samples: usize) -> (usize, Chrono) {
        if num_samples == 0 {
            return (0, 0.0);
        }

        let (floor_idx, floor_time) = self.floor_index(time, num_samples);
        if floor_time >= time {
            return (floor_idx, floor_time);
        }

        let ceil_idx = (floor_idx + 1).min(num_samples - 1);
        (ceil_idx, self.sample_time(ceil_idx))
    }
}

/// The sample times of one animated node schema: a [`TimeSampling`] plus the
/// number of samples actually stored.
///
/// A timeline is never empty. Archives reporting zero samples get a
/// single-sample timeline so that bracketing always has something to return.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleTimeline {
    sampling: TimeSampling,
    num_samples: usize,
}

impl SampleTimeline {
    /// Create a timeline; a zero sample count is treated as one.
    pub fn new(sampling: TimeSampling, num_samples: usize) -> Self {
        Self {
            sampling,
            num_samples: num_samples.max(1),
        }
    }

    /// A static, single-sample timeline.
    pub fn single() -> Self {
        Self::new(TimeSampling::IDENTITY, 1)
    }

    /// The underlying sampling description.
    pub fn sampling(&self) -> &TimeSampling {
        &self.sampling
    }

    /// Number of samples (always >= 1).
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// True when there is nothing to interpolate.
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.num_samples <= 1
    }

    /// Time of sample `index`.
    pub fn sample_time(&self, index: usize) -> Chrono {
        self.sampling.sample_time(index.min(self.num_samples - 1))
    }

    /// Time of the first sample.
    pub fn first_time(&self) -> Chrono {
        self.sample_time(0)
    }

    /// Time of the last sample.
    pub fn last_time(&self) -> Chrono {
        self.sample_time(self.num_samples - 1)
    }

    /// Iterate over every sample time.
    pub fn times(&self) -> impl Iterator<Item = Chrono> + '_ {
        (0..self.num_samples).map(move |i| self.sampling.sample_time(i))
    }

    /// Floor sample of `time`.
    pub fn floor_index(&self, time: Chrono) -> (usize, Chrono) {
        self.sampling.floor_index(time, self.num_samples)
    }

    /// Resolve which two samples bracket `time` and the blend weight between
    /// them.
    ///
    /// The result collapses to a single sample (weight 0) when the timeline
    /// has one sample, when `time` is within [`COINCIDENT_EPSILON`] of the
    /// floor sample, or when `time` lies outside the sampled range.
    pub fn bracket(&self, time: Chrono) -> SampleInterp {
        if self.num_samples == 1 {
            return SampleInterp::exact(0);
        }

        let (floor_idx, floor_time) = self.sampling.floor_index(time, self.num_samples);
        if (time - floor_time).abs() < COINCIDENT_EPSILON {
            return SampleInterp::exact(floor_idx);
        }

        let (ceil_idx, ceil_time) = self.sampling.ceil_index(time, self.num_samples);
        if floor_idx == ceil_idx || ceil_time <= floor_time {
            return SampleInterp::exact(floor_idx);
        }

        SampleInterp::lerp(
            floor_idx,
            ceil_idx,
            (time - floor_time) / (ceil_time - floor_time),
        )
    }
}

impl Default for SampleTimeline {
    fn default() -> Self {
        Self::single()
    }
}
