use crossbeam::channel;
use tracing::{debug, trace};

use mandelfill_core::{FillMode, RenderConfig};

use crate::buffer::{PixelGrid, Rgba8, CHANNELS};

/// A way of calling `pixel(px, py)` once for every cell of a grid and
/// storing the result in that cell.
///
/// Implementations only differ in how the work is spread over threads. Each
/// one partitions the grid into disjoint `&mut` slices before handing them
/// out, so no cell is ever reachable from two tasks and no lock is taken.
/// Every strategy returns only after all of its tasks have finished.
pub trait FillStrategy {
    fn fill<F>(&self, grid: &mut PixelGrid, config: &RenderConfig, pixel: &F)
    where
        F: Fn(u32, u32) -> Rgba8 + Sync;
}

/// Single thread, rows then columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

/// One rayon task per cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerPixel;

/// One rayon task per row; each task fills its row sequentially.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerRow;

/// `config.worker_count` threads draining a bounded queue of cell jobs.
///
/// The producer blocks while the queue holds `config.queue_capacity` jobs;
/// a capacity of `0` makes every send a rendezvous with a worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool;

#[inline]
fn fill_row<F>(row: &mut [u8], py: u32, pixel: &F)
where
    F: Fn(u32, u32) -> Rgba8,
{
    for (px, cell) in row.chunks_exact_mut(CHANNELS).enumerate() {
        cell.copy_from_slice(&pixel(px as u32, py));
    }
}

impl FillStrategy for Sequential {
    fn fill<F>(&self, grid: &mut PixelGrid, _config: &RenderConfig, pixel: &F)
    where
        F: Fn(u32, u32) -> Rgba8 + Sync,
    {
        for (py, row) in grid.rows_mut().enumerate() {
            fill_row(row, py as u32, pixel);
        }
    }
}

impl FillStrategy for PerPixel {
    fn fill<F>(&self, grid: &mut PixelGrid, _config: &RenderConfig, pixel: &F)
    where
        F: Fn(u32, u32) -> Rgba8 + Sync,
    {
        let width = grid.width() as usize;
        debug!(tasks = grid.len(), "Dispatching one task per pixel");
        rayon::scope(|s| {
            for (idx, cell) in grid.cells_mut().enumerate() {
                s.spawn(move |_| {
                    let (px, py) = ((idx % width) as u32, (idx / width) as u32);
                    cell.copy_from_slice(&pixel(px, py));
                });
            }
        });
    }
}

impl FillStrategy for PerRow {
    fn fill<F>(&self, grid: &mut PixelGrid, _config: &RenderConfig, pixel: &F)
    where
        F: Fn(u32, u32) -> Rgba8 + Sync,
    {
        debug!(tasks = grid.height(), "Dispatching one task per row");
        rayon::scope(|s| {
            for (py, row) in grid.rows_mut().enumerate() {
                s.spawn(move |_| fill_row(row, py as u32, pixel));
            }
        });
    }
}

/// A queued unit of work: one cell and where it sits in the raster.
struct CellJob<'a> {
    px: u32,
    py: u32,
    cell: &'a mut [u8],
}

impl FillStrategy for WorkerPool {
    fn fill<F>(&self, grid: &mut PixelGrid, config: &RenderConfig, pixel: &F)
    where
        F: Fn(u32, u32) -> Rgba8 + Sync,
    {
        let workers = config.worker_count.max(1);
        let width = grid.width() as usize;
        debug!(
            workers,
            queue_capacity = config.queue_capacity,
            jobs = grid.len(),
            "Dispatching to worker pool"
        );

        let (tx, rx) = channel::bounded::<CellJob<'_>>(config.queue_capacity);

        let outcome = crossbeam::thread::scope(|s| {
            for worker in 0..workers {
                let rx = rx.clone();
                s.spawn(move |_| {
                    let mut done = 0usize;
                    for job in rx.iter() {
                        job.cell.copy_from_slice(&pixel(job.px, job.py));
                        done += 1;
                    }
                    trace!(worker, cells = done, "Worker drained");
                });
            }
            drop(rx);

            for (idx, cell) in grid.cells_mut().enumerate() {
                let job = CellJob {
                    px: (idx % width) as u32,
                    py: (idx / width) as u32,
                    cell,
                };
                // Only fails if every worker is gone, i.e. one panicked;
                // the scope re-raises that below.
                if tx.send(job).is_err() {
                    break;
                }
            }
            // Closing the queue lets the workers' `iter()` end.
            drop(tx);
        });

        if let Err(panic) = outcome {
            std::panic::resume_unwind(panic);
        }
    }
}

/// Run the strategy `mode` selects.
pub fn fill_grid<F>(mode: FillMode, grid: &mut PixelGrid, config: &RenderConfig, pixel: &F)
where
    F: Fn(u32, u32) -> Rgba8 + Sync,
{
    match mode {
        FillMode::Sequential => Sequential.fill(grid, config, pixel),
        FillMode::PerPixel => PerPixel.fill(grid, config, pixel),
        FillMode::PerRow => PerRow.fill(grid, config, pixel),
        FillMode::WorkerPool => WorkerPool.fill(grid, config, pixel),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn coords_pixel(px: u32, py: u32) -> Rgba8 {
        [px as u8, py as u8, (px ^ py) as u8, 255]
    }

    fn config_for(width: u32, height: u32) -> RenderConfig {
        RenderConfig {
            width,
            height,
            ..RenderConfig::default()
        }
    }

    #[test]
    fn every_strategy_writes_each_cell_with_its_own_coordinates() {
        let config = config_for(37, 23);
        for mode in FillMode::ALL {
            let mut grid = PixelGrid::new(37, 23);
            fill_grid(mode, &mut grid, &config, &coords_pixel);
            assert!(grid.is_fully_written(), "{mode} left cells unwritten");
            for py in 0..23 {
                for px in 0..37 {
                    assert_eq!(
                        grid.pixel(px, py),
                        coords_pixel(px, py),
                        "{mode} at ({px}, {py})"
                    );
                }
            }
        }
    }

    #[test]
    fn every_strategy_calls_the_pixel_fn_once_per_cell() {
        let config = RenderConfig {
            worker_count: 3,
            queue_capacity: 5,
            ..config_for(19, 11)
        };
        for mode in FillMode::ALL {
            let calls = AtomicUsize::new(0);
            let counting = |px: u32, py: u32| {
                calls.fetch_add(1, Ordering::Relaxed);
                coords_pixel(px, py)
            };
            let mut grid = PixelGrid::new(19, 11);
            fill_grid(mode, &mut grid, &config, &counting);
            assert_eq!(calls.load(Ordering::Relaxed), 19 * 11, "{mode}");
        }
    }

    #[test]
    fn worker_pool_with_rendezvous_queue() {
        let config = RenderConfig {
            worker_count: 2,
            queue_capacity: 0,
            ..config_for(16, 16)
        };
        let mut grid = PixelGrid::new(16, 16);
        WorkerPool.fill(&mut grid, &config, &coords_pixel);
        assert!(grid.is_fully_written());
    }

    #[test]
    fn single_row_and_single_column_grids() {
        for (w, h) in [(1, 1), (1, 9), (9, 1)] {
            let config = config_for(w, h);
            for mode in FillMode::ALL {
                let mut grid = PixelGrid::new(w, h);
                fill_grid(mode, &mut grid, &config, &coords_pixel);
                assert!(grid.is_fully_written(), "{mode} on {w}×{h}");
            }
        }
    }
}
