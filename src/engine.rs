//! The point iteration engine fans every pixel of the grid out to a
//! fixed pool of workers and fans the results back in to a single
//! consumer, which owns the destination.
//!
//! Both handoffs are bounded channels, so a slow consumer stalls the
//! workers, and the workers stall the producer, instead of results
//! piling up in memory.  Workers share nothing but the read-only
//! mapping and escape function.  Results arrive in no particular
//! order; sinks address them by pixel.
//!
//! `run` does not return until the producer has queued every pixel,
//! every worker has drained the queue and exited, and the consumer
//! has seen the result channel close.

use crossbeam::channel;
use error::FractalError;
use escape::{EscapeFunction, EscapeResult};
use planes::{PlaneMapper, PlanePoint};

/// The number of workers used when the caller has no opinion.
pub const DEFAULT_WORKERS: usize = 5;

/// How many items each channel holds per worker before senders block.
const QUEUE_DEPTH_PER_WORKER: usize = 64;

/// Receives results as they come off the workers.  Only one thread
/// ever calls `plot` on a sink, so sinks need no locking of their own.
pub trait PlotSink {
    /// Accepts one result.  Called exactly once per pixel, in no
    /// particular order.
    fn plot(&mut self, result: &EscapeResult);
}

impl PlotSink for Vec<EscapeResult> {
    fn plot(&mut self, result: &EscapeResult) {
        self.push(*result);
    }
}

/// Drives a whole grid through an escape function.
#[derive(Debug)]
pub struct PointEngine {
    mapper: PlaneMapper,
    workers: usize,
    queue_depth: usize,
}

impl PointEngine {
    /// Requires the mapping for the render and the size of the worker
    /// pool, which must be at least one.
    pub fn new(mapper: PlaneMapper, workers: usize) -> Result<PointEngine, FractalError> {
        if workers == 0 {
            return Err(FractalError::InvalidConfig(
                "at least one worker is needed".to_string(),
            ));
        }
        Ok(PointEngine {
            mapper,
            workers,
            queue_depth: workers * QUEUE_DEPTH_PER_WORKER,
        })
    }

    /// Overrides the channel capacity.  Zero makes every handoff a
    /// rendezvous.
    pub fn with_queue_depth(mut self, queue_depth: usize) -> PointEngine {
        self.queue_depth = queue_depth;
        self
    }

    /// The mapping in use.
    pub fn mapper(&self) -> &PlaneMapper {
        &self.mapper
    }

    /// The size of the worker pool.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The multi-threaded render.  Every pixel is mapped, escaped and
    /// handed to `sink` exactly once.  Returns the number of results
    /// delivered.
    pub fn run<E, S>(&self, escape: &E, sink: &mut S) -> Result<usize, FractalError>
    where
        E: EscapeFunction,
        S: PlotSink + Send,
    {
        let mapper = &self.mapper;
        debug!(
            "dispatching {} points to {} workers",
            mapper.len(),
            self.workers
        );

        let delivered = crossbeam::scope(|spawner| {
            let (points_tx, points_rx) = channel::bounded::<PlanePoint>(self.queue_depth);
            let (plotted_tx, plotted_rx) = channel::bounded::<EscapeResult>(self.queue_depth);

            for _ in 0..self.workers {
                let points_rx = points_rx.clone();
                let plotted_tx = plotted_tx.clone();
                spawner.spawn(move |_| {
                    for point in points_rx.iter() {
                        let result = escape.escape(point.point).at(point.pixel);
                        if plotted_tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            }
            // The workers hold the only remaining ends, so the result
            // channel closes when the last of them exits.
            drop(points_rx);
            drop(plotted_tx);

            let consumer = spawner.spawn(move |_| {
                let mut delivered = 0;
                for result in plotted_rx.iter() {
                    sink.plot(&result);
                    delivered += 1;
                }
                delivered
            });

            for pixel in mapper.pixels() {
                if points_tx.send(mapper.point_at(pixel)).is_err() {
                    warn!("every worker has gone; abandoning the render");
                    break;
                }
            }
            drop(points_tx);

            consumer.join()
        });

        match delivered {
            Ok(Ok(delivered)) => Ok(delivered),
            _ => Err(FractalError::WorkerPanicked),
        }
    }

    /// The single-threaded render, in row-major order.  Produces the
    /// same results as `run`.
    pub fn run_single<E, S>(&self, escape: &E, sink: &mut S) -> usize
    where
        E: EscapeFunction,
        S: PlotSink,
    {
        let mut delivered = 0;
        for pixel in self.mapper.pixels() {
            let point = self.mapper.point_at(pixel);
            sink.plot(&escape.escape(point.point).at(pixel));
            delivered += 1;
        }
        delivered
    }
}
